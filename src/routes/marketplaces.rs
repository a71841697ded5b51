use axum::{middleware, routing::get, Router};
use crate::handlers::marketplace::{
    create_marketplace, delete_marketplace, get_marketplace, get_marketplaces, update_marketplace,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/marketplaces", get(get_marketplaces).post(create_marketplace))
        .route("/marketplaces/{id}", get(get_marketplace).put(update_marketplace).delete(delete_marketplace))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
