pub mod config;
pub mod dashboard;
pub mod filaments;
pub mod marketplaces;
pub mod orders;
pub mod printers;
pub mod prints;
pub mod productions;
pub mod products;
pub mod quotes;
pub mod reports;
pub mod users;

use axum::Router;
use crate::state::AppState;

/// Every API route. Only `/auth/register` and `/auth/login` skip the bearer check.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(users::routes(state))
        .merge(config::routes(state))
        .merge(filaments::routes(state))
        .merge(marketplaces::routes(state))
        .merge(printers::routes(state))
        .merge(products::routes(state))
        .merge(prints::routes(state))
        .merge(quotes::routes(state))
        .merge(productions::routes(state))
        .merge(orders::routes(state))
        .merge(dashboard::routes(state))
        .merge(reports::routes(state))
}
