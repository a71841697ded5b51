use axum::{middleware, routing::post, Router};
use crate::handlers::quote::{create_quote, create_quote_pdf};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/quotes", post(create_quote))
        .route("/quotes/pdf", post(create_quote_pdf))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
