// src/handlers/production.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sqlx::types::Json as DbJson;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::lookup;
use super::print::consume_filaments;
use super::product::PRODUCT_COLUMNS;
use super::quote::filament_ids;
use crate::costing::{blended_average_cost, calculate_production, MachineRates, ProductionInput};
use crate::dtos::production::{CreateProductionRequest, ProductionResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::product::Product;
use crate::models::production::{Production, PRODUCTION_COLUMNS};
use crate::state::AppState;

// GET /productions
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_productions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ProductionResponse>>, AppError> {
    let sql = format!(
        "SELECT {PRODUCTION_COLUMNS} FROM productions WHERE user_id = $1
         ORDER BY print_date DESC, created_at DESC"
    );
    match sqlx::query_as::<_, Production>(&sql)
        .bind(auth.user_id)
        .fetch_all(&state.db_pool)
        .await
    {
        Ok(rows) => Ok(Json(rows.into_iter().map(ProductionResponse::from).collect())),
        Err(e) => {
            error!(?e, "Failed to fetch productions");
            Err(e.into())
        }
    }
}

// GET /productions/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_production(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProductionResponse>, AppError> {
    let sql = format!("SELECT {PRODUCTION_COLUMNS} FROM productions WHERE id = $1 AND user_id = $2");
    let production = sqlx::query_as::<_, Production>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Production not found"))?;

    Ok(Json(ProductionResponse::from(production)))
}

// POST /productions
//
// Records a batch run: consumes filament and moves the product's stock and
// average cost, all in one transaction.
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_production(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProductionRequest>,
) -> Result<(StatusCode, Json<ProductionResponse>), AppError> {
    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::validation("Product required"))?;
    if payload.quantity_produced <= 0 {
        return Err(AppError::validation("quantity_produced must be positive"));
    }

    let mut tx = state.db_pool.begin().await?;

    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2 FOR UPDATE");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .bind(auth.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let config = lookup::ensure_config(&mut tx, auth.user_id).await?;
    let printer = lookup::printer(&mut tx, auth.user_id, payload.printer_id).await?;

    let usage = payload.usage_lines();
    let ids = filament_ids(usage.iter().map(|l| l.filament_id));
    let filaments = lookup::filaments_by_id(&mut tx, auth.user_id, &ids, true).await?;

    let machine = MachineRates::resolve(printer.as_ref().map(|p| p.rates()).as_ref(), &config.shop_defaults());
    let cost = calculate_production(
        &ProductionInput {
            usage,
            duration: payload.duration(),
            machine,
            additional_cost: payload.cost_additional,
            quantity: payload.quantity_produced,
        },
        &filaments,
    );

    let sql = format!(
        "INSERT INTO productions (user_id, product_id, printer_id, print_date, print_time_minutes,
                                  quantity_produced, filaments_used, cost_filament_total, cost_energy,
                                  cost_depreciation, cost_additional, unit_cost_final, energy_rate,
                                  printer_power_w)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         RETURNING {PRODUCTION_COLUMNS}"
    );
    let production = sqlx::query_as::<_, Production>(&sql)
        .bind(auth.user_id)
        .bind(product.id)
        .bind(printer.as_ref().map(|p| p.id))
        .bind(payload.print_date.unwrap_or_else(Utc::now))
        .bind(cost.print_time_minutes)
        .bind(cost.quantity)
        .bind(DbJson(&cost.filaments_used))
        .bind(cost.cost_filament_total)
        .bind(cost.cost_energy)
        .bind(cost.cost_depreciation)
        .bind(cost.cost_additional)
        .bind(cost.unit_cost)
        .bind(cost.energy_rate)
        .bind(cost.printer_power_w)
        .fetch_one(&mut *tx)
        .await?;

    let average_cost = blended_average_cost(product.stock_quantity, product.average_cost, cost.quantity, cost.unit_cost);
    sqlx::query("UPDATE products SET stock_quantity = stock_quantity + $1, average_cost = $2 WHERE id = $3 AND user_id = $4")
        .bind(cost.quantity)
        .bind(average_cost)
        .bind(product.id)
        .bind(auth.user_id)
        .execute(&mut *tx)
        .await?;

    consume_filaments(&mut tx, auth.user_id, &cost.filaments_used, &filaments).await?;

    tx.commit().await?;

    info!(
        production_id = %production.id,
        product_id = %product.id,
        quantity = cost.quantity,
        unit_cost = cost.unit_cost,
        "Production recorded"
    );
    Ok((StatusCode::CREATED, Json(ProductionResponse::from(production))))
}

// DELETE /productions/{id}
//
// Removes the record only; product and filament stock are left as they are.
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_production(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM productions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Production not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
