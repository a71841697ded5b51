use axum::{middleware, routing::get, Router};
use crate::handlers::print::{create_print, delete_print, get_print, get_prints, update_print};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/prints", get(get_prints).post(create_print))
        .route("/prints/{id}", get(get_print).put(update_print).delete(delete_print))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
