use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use crate::models::filament::Filament;

#[derive(Debug, Deserialize)]
pub struct CreateFilamentRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub filament_type: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub roll_weight_g: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub roll_price: f64,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub min_stock_alert_g: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub current_weight_g: Option<f64>,
    #[serde(default, deserialize_with = "coerce::whole_number")]
    pub rolls: i32,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub grams_per_roll: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFilamentRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub filament_type: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub roll_weight_g: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub roll_price: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub min_stock_alert_g: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub current_weight_g: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_whole_number")]
    pub rolls: Option<i32>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub grams_per_roll: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRollsRequest {
    #[serde(default, deserialize_with = "coerce::whole_number")]
    pub rolls: i32,
}

#[derive(Debug, Serialize)]
pub struct FilamentResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub filament_type: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub roll_weight_g: f64,
    pub roll_price: f64,
    pub price_per_gram: f64,
    pub min_stock_alert_g: f64,
    pub current_weight_g: Option<f64>,
    pub rolls: i32,
    pub grams_per_roll: f64,
    pub low_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Filament> for FilamentResponse {
    fn from(f: Filament) -> Self {
        let price_per_gram = f.pricing().price_per_gram();
        let low_stock = f.is_low_stock();
        Self {
            id: f.id,
            name: f.name,
            filament_type: f.filament_type,
            color: f.color,
            brand: f.brand,
            roll_weight_g: f.roll_weight_g,
            roll_price: f.roll_price,
            price_per_gram,
            min_stock_alert_g: f.min_stock_alert_g,
            current_weight_g: f.current_weight_g,
            rolls: f.rolls,
            grams_per_roll: f.grams_per_roll,
            low_stock,
            created_at: f.created_at,
        }
    }
}
