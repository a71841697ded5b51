use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use super::print::FilamentUsageRequest;
use crate::costing::{PricedUsage, PrintDuration, UsageLine};
use crate::models::production::Production;

#[derive(Debug, Deserialize)]
pub struct CreateProductionRequest {
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub product_id: Option<Uuid>,
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub printer_id: Option<Uuid>,
    #[serde(default)]
    pub filaments_used: Vec<FilamentUsageRequest>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub print_time_hours: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub print_time_minutes: f64,
    #[serde(default, deserialize_with = "coerce::whole_number")]
    pub quantity_produced: i32,
    #[serde(default, deserialize_with = "coerce::number")]
    pub cost_additional: f64,
    pub print_date: Option<DateTime<Utc>>,
}

impl CreateProductionRequest {
    pub fn usage_lines(&self) -> Vec<UsageLine> {
        self.filaments_used.iter().map(UsageLine::from).collect()
    }

    pub fn duration(&self) -> PrintDuration {
        PrintDuration::new(self.print_time_hours, self.print_time_minutes)
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub printer_id: Option<Uuid>,
    pub print_date: DateTime<Utc>,
    pub print_time_minutes: i32,
    pub quantity_produced: i32,
    pub filaments_used: Vec<PricedUsage>,
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

impl From<Production> for ProductionResponse {
    fn from(p: Production) -> Self {
        Self {
            id: p.id,
            product_id: p.product_id,
            printer_id: p.printer_id,
            print_date: p.print_date,
            print_time_minutes: p.print_time_minutes,
            quantity_produced: p.quantity_produced,
            filaments_used: p.filaments_used.0,
            cost_filament_total: p.cost_filament_total,
            cost_energy: p.cost_energy,
            cost_depreciation: p.cost_depreciation,
            cost_additional: p.cost_additional,
            unit_cost_final: p.unit_cost_final,
            status: p.status,
            energy_rate: p.energy_rate,
            printer_power_w: p.printer_power_w,
            created_at: p.created_at,
        }
    }
}
