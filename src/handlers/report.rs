// src/handlers/report.rs
use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};
use chrono::Utc;
use tracing::{info, instrument};

use super::lookup;
use super::marketplace::fetch_marketplaces;
use super::print::fetch_prints;
use super::quote::attachment;
use crate::dtos::print::PrintListQuery;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::reports::csv_export::history_csv;
use crate::reports::pdf::render_history_pdf;
use crate::reports::{history_rows, HistoryRow};
use crate::state::AppState;

async fn load_history(state: &AppState, auth: &AuthContext, search: Option<&str>) -> Result<Vec<HistoryRow>, AppError> {
    let (prints, marketplaces) = tokio::try_join!(
        fetch_prints(&state.db_pool, auth.user_id, search),
        fetch_marketplaces(&state.db_pool, auth.user_id),
    )?;
    Ok(history_rows(&prints, &marketplaces))
}

// GET /reports/prints.pdf?search=
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn export_prints_pdf(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PrintListQuery>,
) -> Result<Response, AppError> {
    let rows = load_history(&state, &auth, query.search.as_deref()).await?;

    let mut conn = state.db_pool.acquire().await?;
    let brand = lookup::brand_name(&mut conn, auth.user_id).await?;
    let currency = lookup::ensure_config(&mut conn, auth.user_id).await?.currency;
    drop(conn);

    let today = Utc::now().date_naive();
    let pdf = tokio::task::spawn_blocking(move || render_history_pdf(&brand, &rows, today, &currency))
        .await
        .map_err(|e| AppError::internal(format!("PDF task failed: {e}")))??;

    info!(bytes = pdf.len(), "Print history PDF rendered");
    Ok(attachment(pdf, "application/pdf", "print-history.pdf"))
}

// GET /reports/prints.csv?search=
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn export_prints_csv(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PrintListQuery>,
) -> Result<Response, AppError> {
    let rows = load_history(&state, &auth, query.search.as_deref()).await?;
    let csv = history_csv(&rows)?;

    info!(rows = rows.len(), "Print history CSV exported");
    Ok(attachment(csv, "text/csv; charset=utf-8", "print-history.csv"))
}
