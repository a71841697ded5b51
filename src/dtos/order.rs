use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use crate::models::order::{Order, OrderItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[serde(default, deserialize_with = "coerce::whole_number")]
    pub quantity: i32,
    /// Falls back to the product's suggested price.
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub unit_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SaveOrderRequest {
    pub customer_name: String,
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub marketplace_id: Option<Uuid>,
    pub marketplace_order_id: Option<String>,
    pub status: Option<OrderStatus>,
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub unit_cost_at_sale: f64,
    pub line_total: f64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            quantity: i.quantity,
            unit_price: i.unit_price,
            unit_cost_at_sale: i.unit_cost_at_sale,
            line_total: f64::from(i.quantity) * i.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_name: String,
    pub marketplace_id: Option<Uuid>,
    pub marketplace_order_id: Option<String>,
    pub total_price: f64,
    pub marketplace_fee: f64,
    pub net_profit: f64,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            marketplace_id: order.marketplace_id,
            marketplace_order_id: order.marketplace_order_id,
            total_price: order.total_price,
            marketplace_fee: order.marketplace_fee,
            net_profit: order.net_profit,
            status: order.status,
            order_date: order.order_date,
            created_at: order.created_at,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}
