use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use crate::handlers::filament::{
    create_filament, delete_filament, get_filament, get_filaments, get_low_stock_filaments, purchase_rolls,
    update_filament,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/filaments", get(get_filaments).post(create_filament))
        .route("/filaments/low-stock", get(get_low_stock_filaments))
        .route("/filaments/{id}", get(get_filament).put(update_filament).delete(delete_filament))
        .route("/filaments/{id}/purchase", post(purchase_rolls))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
