use axum::{Json, extract::State, response::IntoResponse};
use tracing::warn;

use oneiro_types::api::PopularSymbol;
use oneiro_types::models::Symbol;

use crate::auth::AppState;
use crate::error::ApiResult;

pub async fn all_symbols(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.all_symbols())
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let symbols: Vec<Symbol> = rows
        .into_iter()
        .map(|row| Symbol {
            id: row.id.parse().unwrap_or_else(|e| {
                warn!("Corrupt symbol id '{}': {}", row.id, e);
                uuid::Uuid::default()
            }),
            name: row.name,
        })
        .collect();

    Ok(Json(symbols))
}

pub async fn popular_symbols(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.popular_symbols())
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let symbols: Vec<PopularSymbol> = rows
        .into_iter()
        .map(|(name, dream_count)| PopularSymbol { name, dream_count })
        .collect();

    Ok(Json(symbols))
}
