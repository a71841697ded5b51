// src/handlers/product.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::lookup::{require_name, require_non_negative};
use crate::dtos::product::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::error::{map_unique_violation, AppError};
use crate::middleware::auth::AuthContext;
use crate::models::product::Product;
use crate::state::AppState;

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, user_id, name, description, suggested_price, average_cost, stock_quantity, created_at";

// GET /products
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 ORDER BY name");
    match sqlx::query_as::<_, Product>(&sql)
        .bind(auth.user_id)
        .fetch_all(&state.db_pool)
        .await
    {
        Ok(products) => Ok(Json(products.into_iter().map(ProductResponse::from).collect())),
        Err(e) => {
            error!(?e, "Failed to fetch products");
            Err(e.into())
        }
    }
}

// GET /products/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProductResponse>, AppError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// POST /products
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    require_name(&payload.name, "Product")?;
    require_non_negative(payload.suggested_price, "suggested_price")?;

    let sql = format!(
        "INSERT INTO products (user_id, name, description, suggested_price)
         VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(auth.user_id)
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(payload.suggested_price)
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| map_unique_violation(e, "Product name already exists"))?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

// PUT /products/{id}
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_name(name, "Product")?;
    }
    if let Some(price) = payload.suggested_price {
        require_non_negative(price, "suggested_price")?;
    }
    if matches!(payload.stock_quantity, Some(q) if q < 0) {
        return Err(AppError::validation("stock_quantity cannot be negative"));
    }

    let sql = format!(
        "UPDATE products SET
         name = COALESCE($1, name),
         description = COALESCE($2, description),
         suggested_price = COALESCE($3, suggested_price),
         stock_quantity = COALESCE($4, stock_quantity)
         WHERE id = $5 AND user_id = $6 RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.description)
        .bind(payload.suggested_price)
        .bind(payload.stock_quantity)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await
        .map_err(|e| map_unique_violation(e, "Product name already exists"))?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// DELETE /products/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
                AppError::conflict("Product is referenced by orders")
            }
            other => other.into(),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
