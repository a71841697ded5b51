// src/handlers/lookup.rs
//
// Row loaders shared by the job, quote and report handlers. Every query is
// scoped to the calling user; a row owned by someone else is "not found".
use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::filament::{Filament, FILAMENT_COLUMNS};
use crate::models::marketplace::Marketplace;
use crate::models::printer::Printer;
use crate::models::user_config::UserConfig;

pub(crate) const CONFIG_COLUMNS: &str =
    "id, user_id, energy_rate, hourly_cost, printer_power_w, default_margin, currency, created_at";

/// The user's settings row, created with defaults on first access.
pub(crate) async fn ensure_config(conn: &mut PgConnection, user_id: Uuid) -> Result<UserConfig, AppError> {
    let sql = format!(
        "INSERT INTO user_configs (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING {CONFIG_COLUMNS}"
    );
    let config = sqlx::query_as::<_, UserConfig>(&sql)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(config)
}

pub(crate) async fn marketplace(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Option<Uuid>,
) -> Result<Option<Marketplace>, AppError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let marketplace = sqlx::query_as::<_, Marketplace>(
        "SELECT id, user_id, name, fee_percent, fee_fixed, notes, created_at
         FROM marketplaces WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Marketplace not found"))?;
    Ok(Some(marketplace))
}

pub(crate) async fn printer(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Option<Uuid>,
) -> Result<Option<Printer>, AppError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let printer = sqlx::query_as::<_, Printer>(
        "SELECT id, user_id, name, model, power_watts, purchase_price, lifespan_hours, created_at
         FROM printers WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Printer not found"))?;
    Ok(Some(printer))
}

/// Load the referenced filaments keyed by id. Unknown ids are simply absent.
/// With `for_update` the rows stay locked until the surrounding transaction ends.
pub(crate) async fn filaments_by_id(
    conn: &mut PgConnection,
    user_id: Uuid,
    ids: &[Uuid],
    for_update: bool,
) -> Result<HashMap<Uuid, Filament>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let sql = format!("SELECT {FILAMENT_COLUMNS} FROM filaments WHERE user_id = $1 AND id = ANY($2){lock}");
    let rows = sqlx::query_as::<_, Filament>(&sql)
        .bind(user_id)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(|f| (f.id, f)).collect())
}

/// Name shown on exported documents: brand, then full name, then a fallback.
pub(crate) async fn brand_name(conn: &mut PgConnection, user_id: Uuid) -> Result<String, AppError> {
    let row: Option<(Option<String>, Option<String>)> =
        sqlx::query_as("SELECT brand_name, full_name FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

    let name = row
        .and_then(|(brand, full)| {
            brand
                .filter(|b| !b.trim().is_empty())
                .or(full.filter(|f| !f.trim().is_empty()))
        })
        .unwrap_or_else(|| "Custo3D".to_string());
    Ok(name)
}

pub(crate) fn require_name(name: &str, what: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation(format!("{what} name required")));
    }
    Ok(())
}

pub(crate) fn require_non_negative(value: f64, field: &str) -> Result<(), AppError> {
    if value < 0.0 {
        return Err(AppError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}
