use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::costing::PricedUsage;

#[derive(Debug, Clone, FromRow)]
pub struct Print {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub print_date: DateTime<Utc>,
    pub filaments_used: Json<Vec<PricedUsage>>,
    pub print_time_minutes: i32,
    pub energy_rate: Option<f64>,
    pub printer_power_w: Option<f64>,
    pub cost_filament: Option<f64>,
    pub cost_energy: Option<f64>,
    pub cost_depreciation: Option<f64>,
    pub cost_additional: Option<f64>,
    pub marketplace_id: Option<Uuid>,
    pub marketplace_fee: Option<f64>,
    pub sale_price: Option<f64>,
    pub total_cost: Option<f64>,
    pub profit: Option<f64>,
    pub real_margin: Option<f64>,
    pub created_at: DateTime<Utc>,
}

pub const PRINT_COLUMNS: &str = "id, user_id, name, description, image_url, print_date, filaments_used, \
     print_time_minutes, energy_rate, printer_power_w, cost_filament, cost_energy, cost_depreciation, \
     cost_additional, marketplace_id, marketplace_fee, sale_price, total_cost, profit, real_margin, created_at";
