use axum::{middleware, routing::get, Router};
use crate::handlers::order::{create_order, delete_order, get_order, get_orders, replace_order};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(get_orders).post(create_order))
        .route("/orders/{id}", get(get_order).put(replace_order).delete(delete_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
