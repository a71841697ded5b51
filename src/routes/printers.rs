use axum::{middleware, routing::get, Router};
use crate::handlers::printer::{create_printer, delete_printer, get_printer, get_printers, update_printer};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/printers", get(get_printers).post(create_printer))
        .route("/printers/{id}", get(get_printer).put(update_printer).delete(delete_printer))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
