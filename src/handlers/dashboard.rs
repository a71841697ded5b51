// src/handlers/dashboard.rs
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::instrument;

use super::filament::fetch_filaments;
use super::marketplace::fetch_marketplaces;
use super::print::fetch_prints;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::reports::dashboard::{build_dashboard, Dashboard};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
}

// GET /dashboard?year=
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let (prints, filaments, marketplaces) = tokio::try_join!(
        fetch_prints(&state.db_pool, auth.user_id, None),
        fetch_filaments(&state.db_pool, auth.user_id),
        fetch_marketplaces(&state.db_pool, auth.user_id),
    )?;

    Ok(Json(build_dashboard(&prints, &filaments, &marketplaces, year)))
}
