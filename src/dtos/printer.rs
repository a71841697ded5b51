use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use crate::models::printer::Printer;

#[derive(Debug, Deserialize)]
pub struct CreatePrinterRequest {
    pub name: String,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub power_watts: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub purchase_price: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub lifespan_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePrinterRequest {
    pub name: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub power_watts: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub purchase_price: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub lifespan_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PrinterResponse {
    pub id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub power_watts: f64,
    pub purchase_price: f64,
    pub lifespan_hours: f64,
    pub depreciation_per_hour: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Printer> for PrinterResponse {
    fn from(p: Printer) -> Self {
        let depreciation_per_hour = p.rates().depreciation_per_hour();
        Self {
            id: p.id,
            name: p.name,
            model: p.model,
            power_watts: p.power_watts,
            purchase_price: p.purchase_price,
            lifespan_hours: p.lifespan_hours,
            depreciation_per_hour,
            created_at: p.created_at,
        }
    }
}
