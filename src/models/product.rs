use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub suggested_price: f64,
    pub average_cost: f64,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}
