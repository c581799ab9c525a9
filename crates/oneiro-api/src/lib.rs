pub mod auth;
pub mod dreams;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod profile;
pub mod symbols;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};

use auth::AppState;

/// Assemble the full route tree. Public routes serve registration, login,
/// and the community surface; everything touching a single user's journal
/// sits behind the bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/symbols", get(symbols::all_symbols))
        .route("/symbols/popular", get(symbols::popular_symbols))
        .route("/feed", get(feed::feed))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/dreams", get(dreams::list_dreams).post(dreams::create_dream))
        .route("/dreams/search", get(dreams::search_dreams))
        .route("/dreams/analysis", get(dreams::analyze_dreams))
        .route("/dreams/{id}", delete(dreams::delete_dream))
        .route("/users/{id}/profile", get(profile::user_profile))
        .route("/users/{id}/symbol-timeline", get(profile::symbol_timeline))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> &'static str {
    "Oneiro API is running"
}
