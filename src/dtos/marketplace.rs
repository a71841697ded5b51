use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use crate::models::marketplace::Marketplace;

#[derive(Debug, Deserialize)]
pub struct CreateMarketplaceRequest {
    pub name: String,
    #[serde(default, deserialize_with = "coerce::number")]
    pub fee_percent: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub fee_fixed: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMarketplaceRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub fee_percent: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub fee_fixed: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketplaceResponse {
    pub id: Uuid,
    pub name: String,
    pub fee_percent: f64,
    pub fee_fixed: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Marketplace> for MarketplaceResponse {
    fn from(m: Marketplace) -> Self {
        Self {
            id: m.id,
            name: m.name,
            fee_percent: m.fee_percent,
            fee_fixed: m.fee_fixed,
            notes: m.notes,
            created_at: m.created_at,
        }
    }
}
