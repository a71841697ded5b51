use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::costing::ShopDefaults;

#[derive(Debug, Clone, FromRow)]
pub struct UserConfig {
    pub id: Uuid,
    pub user_id: Uuid,
    pub energy_rate: f64,
    pub hourly_cost: f64,
    pub printer_power_w: f64,
    pub default_margin: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl UserConfig {
    pub fn shop_defaults(&self) -> ShopDefaults {
        ShopDefaults {
            energy_rate: self.energy_rate,
            hourly_cost: self.hourly_cost,
            power_w: self.printer_power_w,
            margin_percent: self.default_margin,
        }
    }
}
