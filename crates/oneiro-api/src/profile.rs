use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use oneiro_types::api::{
    Claims, MonthlyCount, ProfileResponse, ProfileStatistics, SymbolFrequency, TimelineEntry,
    UserInfo,
};

use crate::auth::AppState;
use crate::dreams::dream_response;
use crate::error::{ApiError, ApiResult};

/// Profile page: user info plus aggregate dream statistics. Any
/// authenticated user may view any profile, mirroring the public feed.
pub async fn user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let uid = user_id.to_string();

    let (user, stats, top, monthly, recent) = tokio::task::spawn_blocking(move || {
        let user = db.db.get_user_by_id(&uid)?;
        let stats = db.db.profile_stats(&uid)?;
        let top = db.db.top_symbols_for_user(&uid, 10)?;
        let monthly = db.db.monthly_dream_counts(&uid)?;
        let recent = db.db.recent_dreams(&uid, 5)?;
        Ok::<_, anyhow::Error>((user, stats, top, monthly, recent))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let user = user.ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        user: UserInfo {
            id: user_id,
            username: user.username,
            email: user.email,
        },
        statistics: ProfileStatistics {
            total_dreams: stats.total_dreams,
            lucid_dreams: stats.lucid_dreams,
            avg_mood: stats.avg_mood,
            first_dream_date: stats.first_dream_date.as_deref().map(parse_date),
            last_dream_date: stats.last_dream_date.as_deref().map(parse_date),
        },
        top_symbols: top
            .into_iter()
            .map(|(name, frequency)| SymbolFrequency { name, frequency })
            .collect(),
        dream_frequency: monthly
            .into_iter()
            .map(|(month, dream_count)| MonthlyCount { month, dream_count })
            .collect(),
        recent_dreams: recent.into_iter().map(dream_response).collect(),
    }))
}

pub async fn symbol_timeline(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let uid = user_id.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.symbol_timeline(&uid))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let timeline: Vec<TimelineEntry> = rows
        .into_iter()
        .map(|(symbol, month, usage_count)| TimelineEntry {
            symbol,
            month,
            usage_count,
        })
        .collect();

    Ok(Json(timeline))
}

fn parse_date(raw: &str) -> NaiveDate {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt dream_date '{}': {}", raw, e);
        NaiveDate::default()
    })
}
