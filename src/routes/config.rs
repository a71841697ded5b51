use axum::{Router, routing::get, middleware};
use crate::handlers::config::{get_config, update_config};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/config", get(get_config).put(update_config))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
