use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use oneiro_analytics::DreamRecord;
use oneiro_db::models::{DeleteDream, DreamRow, NewDream};
use oneiro_db::search::DreamFilter;
use oneiro_types::api::{
    Claims, CreateDreamRequest, CreateDreamResponse, DreamResponse, SearchResponse,
};
use oneiro_types::tags::parse_tag_input;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::ensure_own_scope;

const MAX_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct UserScopeQuery {
    pub user_id: Option<Uuid>,
}

pub async fn list_dreams(
    State(state): State<AppState>,
    Query(query): Query<UserScopeQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_own_scope(&claims, query.user_id)?;

    let db = state.clone();
    let user_id = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.dreams_for_user(&user_id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let dreams: Vec<DreamResponse> = rows.into_iter().map(dream_response).collect();
    Ok(Json(dreams))
}

pub async fn create_dream(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateDreamRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_own_scope(&claims, req.user_id)?;

    if req.content.is_empty() {
        return Err(ApiError::Validation("content is required".into()));
    }
    if let Some(mood) = req.mood_score
        && !(1..=10).contains(&mood)
    {
        return Err(ApiError::Validation(
            "mood_score must be between 1 and 10".into(),
        ));
    }
    if let Some(quality) = req.sleep_quality
        && !(1..=10).contains(&quality)
    {
        return Err(ApiError::Validation(
            "sleep_quality must be between 1 and 10".into(),
        ));
    }

    // Each submitted entry goes through the tag tokenizer, so a client that
    // sends "flying, water" as one entry still yields two symbols.
    let symbols: Vec<String> = req
        .symbols
        .iter()
        .flat_map(|entry| parse_tag_input(entry))
        .collect();

    let dream_id = Uuid::new_v4();
    let dream = NewDream {
        id: dream_id.to_string(),
        user_id: claims.sub.to_string(),
        summary: req.summary,
        content: req.content,
        dream_date: req.dream_date.to_string(),
        is_lucid: req.is_lucid,
        mood_score: req.mood_score,
        sleep_duration: req.sleep_duration,
        sleep_quality: req.sleep_quality,
        bedtime: req.bedtime,
        sleep_disruptions: req.sleep_disruptions,
        symbols,
    };

    let db = state.clone();
    tokio::task::spawn_blocking(move || db.db.insert_dream(&dream))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok((
        StatusCode::CREATED,
        Json(CreateDreamResponse {
            message: "Dream and symbols saved".to_string(),
            dream_id,
        }),
    ))
}

pub async fn delete_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Query(query): Query<UserScopeQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_own_scope(&claims, query.user_id)?;

    let db = state.clone();
    let did = dream_id.to_string();
    let user_id = claims.sub.to_string();
    let outcome = tokio::task::spawn_blocking(move || db.db.delete_dream(&did, &user_id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    match outcome {
        DeleteDream::NotFound => Err(ApiError::NotFound("Dream not found".into())),
        DeleteDream::NotOwner => Err(ApiError::Forbidden(
            "Not authorized to delete this dream".into(),
        )),
        DeleteDream::Deleted => Ok(Json(
            serde_json::json!({ "message": "Dream deleted successfully" }),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub user_id: Option<Uuid>,
    pub query: Option<String>,
    /// Symbol names, comma/space/`#` separated.
    pub symbols: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub is_lucid: Option<bool>,
    pub mood_min: Option<i64>,
    pub mood_max: Option<i64>,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_search_limit() -> i64 {
    50
}

pub async fn search_dreams(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_own_scope(&claims, query.user_id)?;

    if query.limit < 0 || query.offset < 0 {
        return Err(ApiError::Validation("Invalid pagination parameters".into()));
    }

    let mut filter = DreamFilter::for_user(claims.sub.to_string());
    filter.query = query.query;
    filter.symbols = query
        .symbols
        .as_deref()
        .map(parse_tag_input)
        .unwrap_or_default();
    filter.date_from = query.date_from.map(|d| d.to_string());
    filter.date_to = query.date_to.map(|d| d.to_string());
    filter.is_lucid = query.is_lucid;
    filter.mood_min = query.mood_min;
    filter.mood_max = query.mood_max;
    filter.limit = query.limit.min(MAX_PAGE_SIZE);
    filter.offset = query.offset;

    let db = state.clone();
    let offset = filter.offset;
    let (rows, total) = tokio::task::spawn_blocking(move || db.db.search_dreams(&filter))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let dreams: Vec<DreamResponse> = rows.into_iter().map(dream_response).collect();
    let has_more = offset + (dreams.len() as i64) < total;

    Ok(Json(SearchResponse {
        dreams,
        total,
        has_more,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub user_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Full analytics report over the caller's dream history, optionally
/// restricted to a date window. The engine is pure; this endpoint just
/// feeds it the matching records.
pub async fn analyze_dreams(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_own_scope(&claims, query.user_id)?;

    let mut filter = DreamFilter::for_user(claims.sub.to_string());
    filter.date_from = query.date_from.map(|d| d.to_string());
    filter.date_to = query.date_to.map(|d| d.to_string());
    // SQLite treats a negative LIMIT as unbounded.
    filter.limit = -1;

    let db = state.clone();
    let (rows, _total) = tokio::task::spawn_blocking(move || db.db.search_dreams(&filter))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let records: Vec<DreamRecord> = rows.iter().map(record_from_row).collect();
    Ok(Json(oneiro_analytics::analyze(&records)))
}

// -- Row conversions --

pub(crate) fn dream_response(row: DreamRow) -> DreamResponse {
    DreamResponse {
        id: parse_uuid(&row.id, "dream id"),
        user_id: parse_uuid(&row.user_id, "user id"),
        title: row.summary,
        content: row.content,
        dream_date: parse_date(&row.dream_date, &row.id),
        is_lucid: row.is_lucid,
        mood_score: row.mood_score,
        sleep_duration: row.sleep_duration,
        sleep_quality: row.sleep_quality,
        bedtime: row.bedtime,
        sleep_disruptions: row.sleep_disruptions,
        created_at: parse_timestamp(&row.created_at, &row.id),
        symbols: row.symbols,
        username: row.username,
    }
}

pub(crate) fn record_from_row(row: &DreamRow) -> DreamRecord {
    DreamRecord {
        dream_date: parse_date(&row.dream_date, &row.id),
        is_lucid: row.is_lucid,
        mood_score: row.mood_score,
        sleep_duration: row.sleep_duration,
        sleep_quality: row.sleep_quality,
        bedtime: row.bedtime.clone(),
        sleep_disruptions: row.sleep_disruptions.clone(),
        symbols: row.symbols.clone(),
    }
}

fn parse_uuid(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

fn parse_date(raw: &str, dream_id: &str) -> NaiveDate {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt dream_date '{}' on dream '{}': {}", raw, dream_id, e);
        NaiveDate::default()
    })
}

fn parse_timestamp(raw: &str, dream_id: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on dream '{}': {}", raw, dream_id, e);
            chrono::DateTime::default()
        })
}
