use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coerce;
use crate::models::user_config::UserConfig;

#[derive(Debug, Deserialize)]
pub struct UpdateConfigRequest {
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub energy_rate: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub hourly_cost: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub printer_power_w: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub default_margin: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub energy_rate: f64,
    pub hourly_cost: f64,
    pub printer_power_w: f64,
    pub default_margin: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserConfig> for ConfigResponse {
    fn from(c: UserConfig) -> Self {
        Self {
            energy_rate: c.energy_rate,
            hourly_cost: c.hourly_cost,
            printer_power_w: c.printer_power_w,
            default_margin: c.default_margin,
            currency: c.currency,
            created_at: c.created_at,
        }
    }
}
