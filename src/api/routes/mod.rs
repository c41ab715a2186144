pub mod health;
pub mod party;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::middleware::auth_middleware;
use crate::api::AppState;

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/party", create_party_router(state.clone()))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Create party router. Every party operation requires an
/// authenticated identity.
fn create_party_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(party::create_party).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/",
            get(party::list_parties).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:name/join",
            post(party::join_party).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:name/leave",
            post(party::leave_party).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
}
