// src/handlers/quote.rs
use std::collections::HashMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use http::header;
use sqlx::PgConnection;
use tracing::{info, instrument};
use uuid::Uuid;

use super::lookup;
use crate::costing::{calculate_quote, MachineRates, QuoteBreakdown, QuoteInput};
use crate::dtos::print::{QuoteRequest, QuoteResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::filament::Filament;
use crate::models::marketplace::Marketplace;
use crate::reports::pdf::{render_quote_pdf, QuoteSheet};
use crate::state::AppState;

/// A job priced against the caller's own rows.
pub(crate) struct PricedJob {
    pub breakdown: QuoteBreakdown,
    pub machine: MachineRates,
    pub marketplace: Option<Marketplace>,
    pub filaments: HashMap<Uuid, Filament>,
    pub currency: String,
}

pub(crate) fn filament_ids<I>(ids: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = Option<Uuid>>,
{
    let mut ids: Vec<Uuid> = ids.into_iter().flatten().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Load settings, marketplace, printer and filaments, then run the calculator.
/// Pass `for_update` inside a transaction that will consume stock.
pub(crate) async fn price_job(
    conn: &mut PgConnection,
    user_id: Uuid,
    job: &QuoteRequest,
    for_update: bool,
) -> Result<PricedJob, AppError> {
    let config = lookup::ensure_config(conn, user_id).await?;
    let defaults = config.shop_defaults();

    let marketplace = lookup::marketplace(conn, user_id, job.marketplace_id).await?;
    let printer = lookup::printer(conn, user_id, job.printer_id).await?;

    let usage = job.usage_lines();
    let ids = filament_ids(usage.iter().map(|l| l.filament_id));
    let filaments = lookup::filaments_by_id(conn, user_id, &ids, for_update).await?;

    let machine = MachineRates::resolve(printer.as_ref().map(|p| p.rates()).as_ref(), &defaults);
    let input = QuoteInput {
        usage,
        duration: job.duration(),
        machine,
        additional_cost: job.cost_additional,
        fee: marketplace.as_ref().map(Marketplace::fee_schedule),
        margin_percent: job.margin_or(defaults.margin_percent),
    };
    let breakdown = calculate_quote(&input, &filaments);

    Ok(PricedJob {
        breakdown,
        machine,
        marketplace,
        filaments,
        currency: config.currency,
    })
}

// POST /quotes
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let priced = price_job(&mut conn, auth.user_id, &payload, false).await?;

    Ok(Json(QuoteResponse {
        breakdown: priced.breakdown,
        machine: priced.machine,
        marketplace_name: priced.marketplace.map(|m| m.name),
        currency: priced.currency,
    }))
}

// POST /quotes/pdf
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_quote_pdf(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Response, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let priced = price_job(&mut conn, auth.user_id, &payload, false).await?;
    let brand = lookup::brand_name(&mut conn, auth.user_id).await?;
    drop(conn);

    let QuoteRequest { name, description, .. } = payload;
    let today = Utc::now().date_naive();
    let pdf = tokio::task::spawn_blocking(move || {
        render_quote_pdf(&QuoteSheet {
            brand: &brand,
            name: &name,
            description: description.as_deref(),
            date: today,
            currency: &priced.currency,
            breakdown: &priced.breakdown,
        })
    })
    .await
    .map_err(|e| AppError::internal(format!("PDF task failed: {e}")))??;

    info!(bytes = pdf.len(), "Quote sheet rendered");
    Ok(attachment(pdf, "application/pdf", "technical-sheet.pdf"))
}

/// A download response with the given media type and file name.
pub(crate) fn attachment(body: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filament_ids_are_unique_and_skip_blanks() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = filament_ids([Some(a), None, Some(b), Some(a)]);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));
    }

    #[test]
    fn attachment_sets_download_headers() {
        let response = attachment(b"a,b\n".to_vec(), "text/csv; charset=utf-8", "prints.csv");
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=\"prints.csv\"");
    }
}
