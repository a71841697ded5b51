use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use crate::models::product::Product;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub suggested_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub suggested_price: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_whole_number")]
    pub stock_quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub suggested_price: f64,
    pub average_cost: f64,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}

// Convert from Model to Response DTO
impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            suggested_price: product.suggested_price,
            average_cost: product.average_cost,
            stock_quantity: product.stock_quantity,
            created_at: product.created_at,
        }
    }
}
