use axum::{middleware, routing::get, Router};
use crate::handlers::production::{create_production, delete_production, get_production, get_productions};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/productions", get(get_productions).post(create_production))
        .route("/productions/{id}", get(get_production).delete(delete_production))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
