// src/handlers/marketplace.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;
use tracing::{error, instrument};
use uuid::Uuid;

use super::lookup::{require_name, require_non_negative};
use crate::dtos::marketplace::{CreateMarketplaceRequest, MarketplaceResponse, UpdateMarketplaceRequest};
use crate::error::{map_unique_violation, AppError};
use crate::middleware::auth::AuthContext;
use crate::models::marketplace::Marketplace;
use crate::state::AppState;

const MARKETPLACE_COLUMNS: &str = "id, user_id, name, fee_percent, fee_fixed, notes, created_at";

pub(crate) async fn fetch_marketplaces(pool: &PgPool, user_id: Uuid) -> Result<Vec<Marketplace>, AppError> {
    let sql = format!("SELECT {MARKETPLACE_COLUMNS} FROM marketplaces WHERE user_id = $1 ORDER BY name");
    sqlx::query_as::<_, Marketplace>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(?e, "Failed to fetch marketplaces");
            e.into()
        })
}

fn validate_fees(percent: Option<f64>, fixed: Option<f64>) -> Result<(), AppError> {
    if let Some(p) = percent {
        require_non_negative(p, "fee_percent")?;
        if p > 100.0 {
            return Err(AppError::validation("fee_percent cannot exceed 100"));
        }
    }
    if let Some(f) = fixed {
        require_non_negative(f, "fee_fixed")?;
    }
    Ok(())
}

// GET /marketplaces
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_marketplaces(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<MarketplaceResponse>>, AppError> {
    let marketplaces = fetch_marketplaces(&state.db_pool, auth.user_id).await?;
    Ok(Json(marketplaces.into_iter().map(MarketplaceResponse::from).collect()))
}

// GET /marketplaces/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_marketplace(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MarketplaceResponse>, AppError> {
    let sql = format!("SELECT {MARKETPLACE_COLUMNS} FROM marketplaces WHERE id = $1 AND user_id = $2");
    let marketplace = sqlx::query_as::<_, Marketplace>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Marketplace not found"))?;

    Ok(Json(MarketplaceResponse::from(marketplace)))
}

// POST /marketplaces
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_marketplace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateMarketplaceRequest>,
) -> Result<(StatusCode, Json<MarketplaceResponse>), AppError> {
    require_name(&payload.name, "Marketplace")?;
    validate_fees(Some(payload.fee_percent), Some(payload.fee_fixed))?;

    let sql = format!(
        "INSERT INTO marketplaces (user_id, name, fee_percent, fee_fixed, notes)
         VALUES ($1, $2, $3, $4, $5) RETURNING {MARKETPLACE_COLUMNS}"
    );
    let marketplace = sqlx::query_as::<_, Marketplace>(&sql)
        .bind(auth.user_id)
        .bind(payload.name.trim())
        .bind(payload.fee_percent)
        .bind(payload.fee_fixed)
        .bind(&payload.notes)
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| map_unique_violation(e, "Marketplace name already exists"))?;

    Ok((StatusCode::CREATED, Json(MarketplaceResponse::from(marketplace))))
}

// PUT /marketplaces/{id}
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_marketplace(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateMarketplaceRequest>,
) -> Result<Json<MarketplaceResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_name(name, "Marketplace")?;
    }
    validate_fees(payload.fee_percent, payload.fee_fixed)?;

    let sql = format!(
        "UPDATE marketplaces SET
         name = COALESCE($1, name),
         fee_percent = COALESCE($2, fee_percent),
         fee_fixed = COALESCE($3, fee_fixed),
         notes = COALESCE($4, notes)
         WHERE id = $5 AND user_id = $6 RETURNING {MARKETPLACE_COLUMNS}"
    );
    let marketplace = sqlx::query_as::<_, Marketplace>(&sql)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.fee_percent)
        .bind(payload.fee_fixed)
        .bind(payload.notes)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await
        .map_err(|e| map_unique_violation(e, "Marketplace name already exists"))?
        .ok_or_else(|| AppError::not_found("Marketplace not found"))?;

    Ok(Json(MarketplaceResponse::from(marketplace)))
}

// DELETE /marketplaces/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_marketplace(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM marketplaces WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Marketplace not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
