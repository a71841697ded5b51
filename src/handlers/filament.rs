// src/handlers/filament.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::lookup::{require_name, require_non_negative};
use crate::costing::stock::{rolls_for_weight, DEFAULT_REORDER_THRESHOLD_G};
use crate::dtos::filament::{CreateFilamentRequest, FilamentResponse, PurchaseRollsRequest, UpdateFilamentRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::filament::{Filament, FILAMENT_COLUMNS};
use crate::state::AppState;

pub(crate) async fn fetch_filaments(pool: &PgPool, user_id: Uuid) -> Result<Vec<Filament>, AppError> {
    let sql = format!("SELECT {FILAMENT_COLUMNS} FROM filaments WHERE user_id = $1 ORDER BY name");
    sqlx::query_as::<_, Filament>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(?e, "Failed to fetch filaments");
            e.into()
        })
}

// GET /filaments
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_filaments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<FilamentResponse>>, AppError> {
    let filaments = fetch_filaments(&state.db_pool, auth.user_id).await?;
    Ok(Json(filaments.into_iter().map(FilamentResponse::from).collect()))
}

// GET /filaments/low-stock
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_low_stock_filaments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<FilamentResponse>>, AppError> {
    let filaments = fetch_filaments(&state.db_pool, auth.user_id).await?;
    let low = filaments
        .into_iter()
        .filter(Filament::is_low_stock)
        .map(FilamentResponse::from)
        .collect();
    Ok(Json(low))
}

// GET /filaments/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_filament(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<FilamentResponse>, AppError> {
    let sql = format!("SELECT {FILAMENT_COLUMNS} FROM filaments WHERE id = $1 AND user_id = $2");
    let filament = sqlx::query_as::<_, Filament>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Filament not found"))?;

    Ok(Json(FilamentResponse::from(filament)))
}

// POST /filaments
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_filament(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateFilamentRequest>,
) -> Result<(StatusCode, Json<FilamentResponse>), AppError> {
    require_name(&payload.name, "Filament")?;
    if payload.filament_type.trim().is_empty() {
        return Err(AppError::validation("Filament type required"));
    }
    require_non_negative(payload.roll_price, "roll_price")?;
    if payload.roll_weight_g <= 0.0 {
        return Err(AppError::validation("roll_weight_g must be positive"));
    }
    if let Some(w) = payload.current_weight_g {
        require_non_negative(w, "current_weight_g")?;
    }

    let grams_per_roll = payload
        .grams_per_roll
        .filter(|g| *g > 0.0)
        .unwrap_or(payload.roll_weight_g);
    let min_stock_alert_g = payload
        .min_stock_alert_g
        .filter(|t| *t > 0.0)
        .unwrap_or(DEFAULT_REORDER_THRESHOLD_G);
    let rolls = match payload.current_weight_g {
        Some(w) if payload.rolls == 0 => rolls_for_weight(w, grams_per_roll),
        _ => payload.rolls.max(0),
    };

    let sql = format!(
        "INSERT INTO filaments (user_id, name, filament_type, color, brand, roll_weight_g, roll_price,
                                min_stock_alert_g, current_weight_g, rolls, grams_per_roll)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {FILAMENT_COLUMNS}"
    );
    let filament = sqlx::query_as::<_, Filament>(&sql)
        .bind(auth.user_id)
        .bind(payload.name.trim())
        .bind(payload.filament_type.trim())
        .bind(&payload.color)
        .bind(&payload.brand)
        .bind(payload.roll_weight_g)
        .bind(payload.roll_price)
        .bind(min_stock_alert_g)
        .bind(payload.current_weight_g)
        .bind(rolls)
        .bind(grams_per_roll)
        .fetch_one(&state.db_pool)
        .await?;

    info!(filament_id = %filament.id, "Filament created");
    Ok((StatusCode::CREATED, Json(FilamentResponse::from(filament))))
}

// PUT /filaments/{id}
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_filament(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateFilamentRequest>,
) -> Result<Json<FilamentResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_name(name, "Filament")?;
    }
    if matches!(payload.roll_weight_g, Some(w) if w <= 0.0) {
        return Err(AppError::validation("roll_weight_g must be positive"));
    }
    for (value, field) in [
        (payload.roll_price, "roll_price"),
        (payload.current_weight_g, "current_weight_g"),
        (payload.min_stock_alert_g, "min_stock_alert_g"),
    ] {
        if let Some(v) = value {
            require_non_negative(v, field)?;
        }
    }

    let sql = format!(
        "UPDATE filaments SET
         name = COALESCE($1, name),
         filament_type = COALESCE($2, filament_type),
         color = COALESCE($3, color),
         brand = COALESCE($4, brand),
         roll_weight_g = COALESCE($5, roll_weight_g),
         roll_price = COALESCE($6, roll_price),
         min_stock_alert_g = COALESCE($7, min_stock_alert_g),
         current_weight_g = COALESCE($8, current_weight_g),
         rolls = COALESCE($9, rolls),
         grams_per_roll = COALESCE($10, grams_per_roll)
         WHERE id = $11 AND user_id = $12
         RETURNING {FILAMENT_COLUMNS}"
    );
    let filament = sqlx::query_as::<_, Filament>(&sql)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.filament_type.as_deref().map(str::trim))
        .bind(payload.color)
        .bind(payload.brand)
        .bind(payload.roll_weight_g)
        .bind(payload.roll_price)
        .bind(payload.min_stock_alert_g)
        .bind(payload.current_weight_g)
        .bind(payload.rolls.map(|r| r.max(0)))
        .bind(payload.grams_per_roll.filter(|g| *g > 0.0))
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Filament not found"))?;

    Ok(Json(FilamentResponse::from(filament)))
}

// POST /filaments/{id}/purchase
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn purchase_rolls(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<PurchaseRollsRequest>,
) -> Result<Json<FilamentResponse>, AppError> {
    if payload.rolls <= 0 {
        return Err(AppError::validation("rolls must be positive"));
    }

    let mut tx = state.db_pool.begin().await?;

    let sql = format!("SELECT {FILAMENT_COLUMNS} FROM filaments WHERE id = $1 AND user_id = $2 FOR UPDATE");
    let filament = sqlx::query_as::<_, Filament>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Filament not found"))?;

    let stock = filament
        .stock()
        .after_purchase(payload.rolls)
        .ok_or_else(|| AppError::validation("rolls exceeds the maximum stock count"))?;

    let sql = format!(
        "UPDATE filaments SET current_weight_g = $1, rolls = $2
         WHERE id = $3 AND user_id = $4 RETURNING {FILAMENT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Filament>(&sql)
        .bind(stock.current_weight_g)
        .bind(stock.rolls)
        .bind(id)
        .bind(auth.user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(filament_id = %id, rolls = payload.rolls, "Filament rolls purchased");
    Ok(Json(FilamentResponse::from(updated)))
}

// DELETE /filaments/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_filament(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM filaments WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Filament not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
