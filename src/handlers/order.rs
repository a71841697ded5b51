// src/handlers/order.rs
use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sqlx::PgConnection;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::lookup;
use super::product::PRODUCT_COLUMNS;
use crate::costing::{order_totals, OrderLine, OrderTotals};
use crate::dtos::order::{OrderResponse, OrderStatus, SaveOrderRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::{Order, OrderItem};
use crate::models::product::Product;
use crate::state::AppState;

const ORDER_COLUMNS: &str = "id, user_id, customer_name, marketplace_id, marketplace_order_id, total_price, \
     marketplace_fee, net_profit, status, order_date, created_at";

const ITEM_SELECT: &str = "SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name, oi.quantity, \
     oi.unit_price, oi.unit_cost_at_sale
     FROM order_items oi JOIN products p ON p.id = oi.product_id
     WHERE oi.order_id = ANY($1)
     ORDER BY p.name";

fn validate_order(payload: &SaveOrderRequest) -> Result<(), AppError> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::validation("Customer name required"));
    }
    if payload.items.is_empty() {
        return Err(AppError::validation("An order needs at least one item"));
    }
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::validation("Item quantity must be positive"));
        }
        if matches!(item.unit_price, Some(p) if p < 0.0) {
            return Err(AppError::validation("Item price cannot be negative"));
        }
    }
    Ok(())
}

async fn fetch_items(conn: &mut PgConnection, order_ids: &[Uuid]) -> Result<Vec<OrderItem>, AppError> {
    let items = sqlx::query_as::<_, OrderItem>(ITEM_SELECT)
        .bind(order_ids)
        .fetch_all(&mut *conn)
        .await?;
    Ok(items)
}

/// A priced order: each line snapshots the product's price and average cost.
struct PricedOrder {
    lines: Vec<(Uuid, OrderLine)>,
    totals: OrderTotals,
    marketplace_id: Option<Uuid>,
}

async fn price_order(
    conn: &mut PgConnection,
    user_id: Uuid,
    payload: &SaveOrderRequest,
) -> Result<PricedOrder, AppError> {
    let marketplace = lookup::marketplace(conn, user_id, payload.marketplace_id).await?;

    let ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 AND id = ANY($2)");
    let products: HashMap<Uuid, Product> = sqlx::query_as::<_, Product>(&sql)
        .bind(user_id)
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let product = products
            .get(&item.product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", item.product_id)))?;
        lines.push((
            product.id,
            OrderLine {
                quantity: item.quantity,
                unit_price: item.unit_price.unwrap_or(product.suggested_price),
                unit_cost: product.average_cost,
            },
        ));
    }

    let order_lines: Vec<OrderLine> = lines.iter().map(|(_, l)| *l).collect();
    let totals = order_totals(&order_lines, marketplace.as_ref().map(|m| m.fee_schedule()));

    Ok(PricedOrder {
        lines,
        totals,
        marketplace_id: marketplace.map(|m| m.id),
    })
}

async fn insert_items(conn: &mut PgConnection, order_id: Uuid, lines: &[(Uuid, OrderLine)]) -> Result<(), AppError> {
    for (product_id, line) in lines {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, unit_cost_at_sale)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id)
        .bind(*product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.unit_cost)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// GET /orders
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;

    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY order_date DESC, created_at DESC");
    let orders = match sqlx::query_as::<_, Order>(&sql)
        .bind(auth.user_id)
        .fetch_all(&mut *conn)
        .await
    {
        Ok(orders) => orders,
        Err(e) => {
            error!(?e, "Failed to fetch orders");
            return Err(e.into());
        }
    };

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in fetch_items(&mut conn, &ids).await? {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let response = orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderResponse::new(order, items)
        })
        .collect();
    Ok(Json(response))
}

// GET /orders/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<OrderResponse>, AppError> {
    let mut conn = state.db_pool.acquire().await?;

    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let items = fetch_items(&mut conn, &[order.id]).await?;
    Ok(Json(OrderResponse::new(order, items)))
}

// POST /orders
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SaveOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    validate_order(&payload)?;

    let mut tx = state.db_pool.begin().await?;
    let priced = price_order(&mut tx, auth.user_id, &payload).await?;

    let sql = format!(
        "INSERT INTO orders (user_id, customer_name, marketplace_id, marketplace_order_id, total_price,
                             marketplace_fee, net_profit, status, order_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(auth.user_id)
        .bind(payload.customer_name.trim())
        .bind(priced.marketplace_id)
        .bind(&payload.marketplace_order_id)
        .bind(priced.totals.total_price)
        .bind(priced.totals.marketplace_fee)
        .bind(priced.totals.net_profit)
        .bind(payload.status.unwrap_or(OrderStatus::Draft).as_str())
        .bind(payload.order_date.unwrap_or_else(Utc::now))
        .fetch_one(&mut *tx)
        .await?;

    insert_items(&mut tx, order.id, &priced.lines).await?;
    let items = fetch_items(&mut tx, &[order.id]).await?;

    tx.commit().await?;

    info!(order_id = %order.id, total = order.total_price, "Order created");
    Ok((StatusCode::CREATED, Json(OrderResponse::new(order, items))))
}

// PUT /orders/{id}
//
// Replaces the order header and its whole item list.
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn replace_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SaveOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    validate_order(&payload)?;

    let mut tx = state.db_pool.begin().await?;
    let priced = price_order(&mut tx, auth.user_id, &payload).await?;

    let sql = format!(
        "UPDATE orders SET
         customer_name = $1,
         marketplace_id = $2,
         marketplace_order_id = $3,
         total_price = $4,
         marketplace_fee = $5,
         net_profit = $6,
         status = COALESCE($7, status),
         order_date = COALESCE($8, order_date)
         WHERE id = $9 AND user_id = $10 RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(payload.customer_name.trim())
        .bind(priced.marketplace_id)
        .bind(&payload.marketplace_order_id)
        .bind(priced.totals.total_price)
        .bind(priced.totals.marketplace_fee)
        .bind(priced.totals.net_profit)
        .bind(payload.status.map(|s| s.as_str()))
        .bind(payload.order_date)
        .bind(id)
        .bind(auth.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(order.id)
        .execute(&mut *tx)
        .await?;
    insert_items(&mut tx, order.id, &priced.lines).await?;
    let items = fetch_items(&mut tx, &[order.id]).await?;

    tx.commit().await?;

    Ok(Json(OrderResponse::new(order, items)))
}

// DELETE /orders/{id}
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Order not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::order::OrderItemRequest;

    fn request(customer: &str, items: Vec<OrderItemRequest>) -> SaveOrderRequest {
        SaveOrderRequest {
            customer_name: customer.to_string(),
            marketplace_id: None,
            marketplace_order_id: None,
            status: None,
            order_date: None,
            items,
        }
    }

    fn item(quantity: i32, unit_price: Option<f64>) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn orders_need_a_customer_and_items() {
        assert!(validate_order(&request("Ana", vec![item(2, None)])).is_ok());
        assert!(validate_order(&request("  ", vec![item(2, None)])).is_err());
        assert!(validate_order(&request("Ana", vec![])).is_err());
    }

    #[test]
    fn item_quantities_and_prices_are_checked() {
        assert!(validate_order(&request("Ana", vec![item(0, None)])).is_err());
        assert!(validate_order(&request("Ana", vec![item(1, Some(-3.0))])).is_err());
        assert!(validate_order(&request("Ana", vec![item(1, Some(0.0))])).is_ok());
    }
}
