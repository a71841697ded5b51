use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::costing::PrinterRates;

#[derive(Debug, Clone, FromRow)]
pub struct Printer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub power_watts: f64,
    pub purchase_price: f64,
    pub lifespan_hours: f64,
    pub created_at: DateTime<Utc>,
}

impl Printer {
    pub fn rates(&self) -> PrinterRates {
        PrinterRates {
            power_w: self.power_watts,
            purchase_price: self.purchase_price,
            lifespan_hours: self.lifespan_hours,
        }
    }
}
