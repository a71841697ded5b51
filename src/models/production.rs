use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::costing::PricedUsage;

#[derive(Debug, Clone, FromRow)]
pub struct Production {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub printer_id: Option<Uuid>,
    pub print_date: DateTime<Utc>,
    pub print_time_minutes: i32,
    pub quantity_produced: i32,
    pub filaments_used: Json<Vec<PricedUsage>>,
    pub cost_filament_total: f64,
    pub cost_energy: f64,
    pub cost_depreciation: f64,
    pub cost_additional: f64,
    pub unit_cost_final: f64,
    pub status: String,
    pub energy_rate: f64,
    pub printer_power_w: f64,
    pub created_at: DateTime<Utc>,
}

pub const PRODUCTION_COLUMNS: &str = "id, user_id, product_id, printer_id, print_date, print_time_minutes, \
     quantity_produced, filaments_used, cost_filament_total, cost_energy, cost_depreciation, cost_additional, \
     unit_cost_final, status, energy_rate, printer_power_w, created_at";
