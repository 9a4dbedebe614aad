use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::infra::{app_state::AppState, middleware::require_session};

pub mod v1 {
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const SESSION: &str = "/api/v1/auth/session";
    pub const HEALTH: &str = "/health";
}

pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(v1::SESSION, get(handlers::auth::current_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route(v1::LOGIN, post(handlers::auth::login))
        .route(v1::HEALTH, get(handlers::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
