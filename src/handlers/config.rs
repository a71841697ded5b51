// src/handlers/config.rs
use axum::{extract::State, Extension, Json};
use tracing::instrument;

use super::lookup::{self, require_non_negative, CONFIG_COLUMNS};
use crate::dtos::config::{ConfigResponse, UpdateConfigRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::user_config::UserConfig;
use crate::state::AppState;

// GET /config
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_config(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ConfigResponse>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let config = lookup::ensure_config(&mut conn, auth.user_id).await?;
    Ok(Json(ConfigResponse::from(config)))
}

// PUT /config
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_config(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateConfigRequest>,
) -> Result<Json<ConfigResponse>, AppError> {
    for (value, field) in [
        (payload.energy_rate, "energy_rate"),
        (payload.hourly_cost, "hourly_cost"),
        (payload.printer_power_w, "printer_power_w"),
    ] {
        if let Some(v) = value {
            require_non_negative(v, field)?;
        }
    }
    let currency = match payload.currency.as_deref().map(str::trim) {
        Some("") => return Err(AppError::validation("Currency cannot be empty")),
        Some(code) => Some(code.to_uppercase()),
        None => None,
    };

    let mut conn = state.db_pool.acquire().await?;
    lookup::ensure_config(&mut conn, auth.user_id).await?;

    let sql = format!(
        "UPDATE user_configs SET
         energy_rate = COALESCE($1, energy_rate),
         hourly_cost = COALESCE($2, hourly_cost),
         printer_power_w = COALESCE($3, printer_power_w),
         default_margin = COALESCE($4, default_margin),
         currency = COALESCE($5, currency)
         WHERE user_id = $6 RETURNING {CONFIG_COLUMNS}"
    );
    let config = sqlx::query_as::<_, UserConfig>(&sql)
        .bind(payload.energy_rate)
        .bind(payload.hourly_cost)
        .bind(payload.printer_power_w)
        .bind(payload.default_margin)
        .bind(currency)
        .bind(auth.user_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Json(ConfigResponse::from(config)))
}
