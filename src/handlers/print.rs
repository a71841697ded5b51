// src/handlers/print.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sqlx::types::Json as DbJson;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::lookup::{require_name, require_non_negative};
use super::quote::price_job;
use crate::costing::quote::margin_percent;
use crate::costing::stock::weight_by_filament;
use crate::costing::PricedUsage;
use crate::dtos::print::{CreatePrintRequest, PrintListQuery, PrintResponse, UpdatePrintRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::filament::Filament;
use crate::models::print::{Print, PRINT_COLUMNS};
use crate::state::AppState;

/// Newest first, optionally filtered by a case-insensitive substring of the name.
pub(crate) async fn fetch_prints(pool: &PgPool, user_id: Uuid, search: Option<&str>) -> Result<Vec<Print>, AppError> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let sql = format!(
        "SELECT {PRINT_COLUMNS} FROM prints
         WHERE user_id = $1 AND ($2::TEXT IS NULL OR strpos(lower(name), lower($2)) > 0)
         ORDER BY print_date DESC, created_at DESC"
    );
    sqlx::query_as::<_, Print>(&sql)
        .bind(user_id)
        .bind(search)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(?e, "Failed to fetch prints");
            e.into()
        })
}

/// Take each filament's consumed weight off its tracked stock.
pub(crate) async fn consume_filaments(
    conn: &mut PgConnection,
    user_id: Uuid,
    usage: &[PricedUsage],
    filaments: &std::collections::HashMap<Uuid, Filament>,
) -> Result<(), AppError> {
    for (filament_id, used_g) in weight_by_filament(usage) {
        let Some(stock) = filaments
            .get(&filament_id)
            .and_then(|f| f.stock().after_consumption(used_g))
        else {
            continue;
        };

        sqlx::query("UPDATE filaments SET current_weight_g = $1, rolls = $2 WHERE id = $3 AND user_id = $4")
            .bind(stock.current_weight_g)
            .bind(stock.rolls)
            .bind(filament_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

// GET /prints?search=
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_prints(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PrintListQuery>,
) -> Result<Json<Vec<PrintResponse>>, AppError> {
    let prints = fetch_prints(&state.db_pool, auth.user_id, query.search.as_deref()).await?;
    Ok(Json(prints.into_iter().map(PrintResponse::from).collect()))
}

// GET /prints/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_print(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PrintResponse>, AppError> {
    let sql = format!("SELECT {PRINT_COLUMNS} FROM prints WHERE id = $1 AND user_id = $2");
    let print = sqlx::query_as::<_, Print>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Print not found"))?;

    Ok(Json(PrintResponse::from(print)))
}

// POST /prints
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_print(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreatePrintRequest>,
) -> Result<(StatusCode, Json<PrintResponse>), AppError> {
    require_name(&payload.job.name, "Print")?;

    let mut tx = state.db_pool.begin().await?;
    let priced = price_job(&mut tx, auth.user_id, &payload.job, true).await?;
    let b = &priced.breakdown;

    let sql = format!(
        "INSERT INTO prints (user_id, name, description, image_url, print_date, filaments_used,
                             print_time_minutes, energy_rate, printer_power_w, cost_filament, cost_energy,
                             cost_depreciation, cost_additional, marketplace_id, marketplace_fee,
                             sale_price, total_cost, profit, real_margin)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
         RETURNING {PRINT_COLUMNS}"
    );
    let print = sqlx::query_as::<_, Print>(&sql)
        .bind(auth.user_id)
        .bind(payload.job.name.trim())
        .bind(&payload.job.description)
        .bind(&payload.image_url)
        .bind(payload.print_date.unwrap_or_else(Utc::now))
        .bind(DbJson(b.priced_usage()))
        .bind(b.print_time_minutes)
        .bind(priced.machine.energy_rate)
        .bind(priced.machine.power_w)
        .bind(b.cost_filament)
        .bind(b.cost_energy)
        .bind(b.cost_depreciation)
        .bind(b.cost_additional)
        .bind(priced.marketplace.as_ref().map(|m| m.id))
        .bind(b.marketplace_fee)
        .bind(b.sale_price)
        .bind(b.total_cost)
        .bind(b.profit)
        .bind(b.real_margin)
        .fetch_one(&mut *tx)
        .await?;

    consume_filaments(&mut tx, auth.user_id, b.priced_usage(), &priced.filaments).await?;

    tx.commit().await?;

    info!(print_id = %print.id, sale_price = b.sale_price, "Print recorded");
    Ok((StatusCode::CREATED, Json(PrintResponse::from(print))))
}

// PUT /prints/{id}
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_print(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdatePrintRequest>,
) -> Result<Json<PrintResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_name(name, "Print")?;
    }
    if let Some(price) = payload.sale_price {
        require_non_negative(price, "sale_price")?;
    }

    let mut tx = state.db_pool.begin().await?;

    let sql = format!("SELECT {PRINT_COLUMNS} FROM prints WHERE id = $1 AND user_id = $2 FOR UPDATE");
    let existing = sqlx::query_as::<_, Print>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Print not found"))?;

    // A new sale price moves profit and margin; the stored cost stays.
    let (sale_price, profit, real_margin) = match payload.sale_price {
        Some(sale) => {
            let profit = sale - existing.total_cost.unwrap_or(0.0);
            (Some(sale), Some(profit), Some(margin_percent(profit, sale)))
        }
        None => (existing.sale_price, existing.profit, existing.real_margin),
    };

    let sql = format!(
        "UPDATE prints SET
         name = COALESCE($1, name),
         description = COALESCE($2, description),
         image_url = COALESCE($3, image_url),
         print_date = COALESCE($4, print_date),
         sale_price = $5,
         profit = $6,
         real_margin = $7
         WHERE id = $8 AND user_id = $9 RETURNING {PRINT_COLUMNS}"
    );
    let print = sqlx::query_as::<_, Print>(&sql)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.description)
        .bind(payload.image_url)
        .bind(payload.print_date)
        .bind(sale_price)
        .bind(profit)
        .bind(real_margin)
        .bind(id)
        .bind(auth.user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(PrintResponse::from(print)))
}

// DELETE /prints/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_print(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM prints WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Print not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
