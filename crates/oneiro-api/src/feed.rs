use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use oneiro_types::api::DreamResponse;

use crate::auth::AppState;
use crate::dreams::dream_response;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub symbol: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Community feed: everyone's dreams, newest first, owner's username
/// attached. No auth — the feed is public by design.
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let limit = query.limit.clamp(0, 100);
    let offset = query.offset.max(0);
    let rows = tokio::task::spawn_blocking(move || {
        db.db.feed(query.symbol.as_deref(), limit, offset)
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let dreams: Vec<DreamResponse> = rows.into_iter().map(dream_response).collect();
    Ok(Json(dreams))
}
