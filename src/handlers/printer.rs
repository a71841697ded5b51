// src/handlers/printer.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::lookup::{require_name, require_non_negative};
use crate::dtos::printer::{CreatePrinterRequest, PrinterResponse, UpdatePrinterRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::printer::Printer;
use crate::state::AppState;

const PRINTER_COLUMNS: &str = "id, user_id, name, model, power_watts, purchase_price, lifespan_hours, created_at";

fn validate_rates(values: [(Option<f64>, &str); 3]) -> Result<(), AppError> {
    for (value, field) in values {
        if let Some(v) = value {
            require_non_negative(v, field)?;
        }
    }
    Ok(())
}

// GET /printers
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_printers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<PrinterResponse>>, AppError> {
    let sql = format!("SELECT {PRINTER_COLUMNS} FROM printers WHERE user_id = $1 ORDER BY name");
    match sqlx::query_as::<_, Printer>(&sql)
        .bind(auth.user_id)
        .fetch_all(&state.db_pool)
        .await
    {
        Ok(printers) => Ok(Json(printers.into_iter().map(PrinterResponse::from).collect())),
        Err(e) => {
            error!(?e, "Failed to fetch printers");
            Err(e.into())
        }
    }
}

// GET /printers/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_printer(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PrinterResponse>, AppError> {
    let sql = format!("SELECT {PRINTER_COLUMNS} FROM printers WHERE id = $1 AND user_id = $2");
    let printer = sqlx::query_as::<_, Printer>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Printer not found"))?;

    Ok(Json(PrinterResponse::from(printer)))
}

// POST /printers
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_printer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreatePrinterRequest>,
) -> Result<(StatusCode, Json<PrinterResponse>), AppError> {
    require_name(&payload.name, "Printer")?;
    validate_rates([
        (Some(payload.power_watts), "power_watts"),
        (Some(payload.purchase_price), "purchase_price"),
        (Some(payload.lifespan_hours), "lifespan_hours"),
    ])?;

    let sql = format!(
        "INSERT INTO printers (user_id, name, model, power_watts, purchase_price, lifespan_hours)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRINTER_COLUMNS}"
    );
    let printer = sqlx::query_as::<_, Printer>(&sql)
        .bind(auth.user_id)
        .bind(payload.name.trim())
        .bind(&payload.model)
        .bind(payload.power_watts)
        .bind(payload.purchase_price)
        .bind(payload.lifespan_hours)
        .fetch_one(&state.db_pool)
        .await?;

    Ok((StatusCode::CREATED, Json(PrinterResponse::from(printer))))
}

// PUT /printers/{id}
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_printer(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdatePrinterRequest>,
) -> Result<Json<PrinterResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_name(name, "Printer")?;
    }
    validate_rates([
        (payload.power_watts, "power_watts"),
        (payload.purchase_price, "purchase_price"),
        (payload.lifespan_hours, "lifespan_hours"),
    ])?;

    let sql = format!(
        "UPDATE printers SET
         name = COALESCE($1, name),
         model = COALESCE($2, model),
         power_watts = COALESCE($3, power_watts),
         purchase_price = COALESCE($4, purchase_price),
         lifespan_hours = COALESCE($5, lifespan_hours)
         WHERE id = $6 AND user_id = $7 RETURNING {PRINTER_COLUMNS}"
    );
    let printer = sqlx::query_as::<_, Printer>(&sql)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.model)
        .bind(payload.power_watts)
        .bind(payload.purchase_price)
        .bind(payload.lifespan_hours)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Printer not found"))?;

    Ok(Json(PrinterResponse::from(printer)))
}

// DELETE /printers/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_printer(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM printers WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Printer not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
