use axum::{middleware, routing::get, Router};
use crate::handlers::report::{export_prints_csv, export_prints_pdf};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/reports/prints.pdf", get(export_prints_pdf))
        .route("/reports/prints.csv", get(export_prints_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
