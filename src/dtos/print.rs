use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coerce;
use crate::costing::{MachineRates, PricedUsage, PrintDuration, QuoteBreakdown, UsageLine};
use crate::models::print::Print;

#[derive(Debug, Clone, Deserialize)]
pub struct FilamentUsageRequest {
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub filament_id: Option<Uuid>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub material_weight_g: f64,
}

impl From<&FilamentUsageRequest> for UsageLine {
    fn from(r: &FilamentUsageRequest) -> Self {
        UsageLine {
            filament_id: r.filament_id,
            weight_g: r.material_weight_g,
        }
    }
}

/// Inputs of the cost form, shared by quotes and saved prints.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub filaments_used: Vec<FilamentUsageRequest>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub print_time_hours: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub print_time_minutes: f64,
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub marketplace_id: Option<Uuid>,
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub printer_id: Option<Uuid>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub cost_additional: f64,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub desired_margin: Option<f64>,
}

impl QuoteRequest {
    pub fn usage_lines(&self) -> Vec<UsageLine> {
        self.filaments_used.iter().map(UsageLine::from).collect()
    }

    pub fn duration(&self) -> PrintDuration {
        PrintDuration::new(self.print_time_hours, self.print_time_minutes)
    }

    /// A missing, null or blank margin falls back to the user's default.
    /// An explicit 0 is kept and prices at cost.
    pub fn margin_or(&self, default_margin: f64) -> f64 {
        self.desired_margin.unwrap_or(default_margin)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePrintRequest {
    #[serde(flatten)]
    pub job: QuoteRequest,
    pub image_url: Option<String>,
    pub print_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePrintRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub print_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub sale_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrintListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub breakdown: QuoteBreakdown,
    pub machine: MachineRates,
    pub marketplace_name: Option<String>,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub print_date: DateTime<Utc>,
    pub filaments_used: Vec<PricedUsage>,
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

impl From<Print> for PrintResponse {
    fn from(p: Print) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            image_url: p.image_url,
            print_date: p.print_date,
            filaments_used: p.filaments_used.0,
            print_time_minutes: p.print_time_minutes,
            energy_rate: p.energy_rate,
            printer_power_w: p.printer_power_w,
            cost_filament: p.cost_filament,
            cost_energy: p.cost_energy,
            cost_depreciation: p.cost_depreciation,
            cost_additional: p.cost_additional,
            marketplace_id: p.marketplace_id,
            marketplace_fee: p.marketplace_fee,
            sale_price: p.sale_price,
            total_cost: p.total_cost,
            profit: p.profit,
            real_margin: p.real_margin,
            created_at: p.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_payload_with_strings_parses() {
        let req: CreatePrintRequest = serde_json::from_value(json!({
            "name": "Vase",
            "filaments_used": [
                { "filament_id": "", "material_weight_g": "0" },
                { "filament_id": "8c2d3b1e-5f6a-4b7c-9d8e-0f1a2b3c4d5e", "material_weight_g": "42.5" }
            ],
            "print_time_hours": "3",
            "print_time_minutes": "",
            "marketplace_id": "",
            "cost_additional": "abc",
            "desired_margin": "40"
        }))
        .unwrap();

        assert_eq!(req.job.name, "Vase");
        assert_eq!(req.job.filaments_used.len(), 2);
        assert_eq!(req.job.filaments_used[0].filament_id, None);
        assert_eq!(req.job.filaments_used[1].material_weight_g, 42.5);
        assert_eq!(req.job.duration().total_minutes(), 180);
        assert_eq!(req.job.marketplace_id, None);
        assert_eq!(req.job.cost_additional, 0.0);
        assert_eq!(req.job.margin_or(30.0), 40.0);
    }

    #[test]
    fn missing_margin_uses_default() {
        let req: QuoteRequest = serde_json::from_value(json!({ "desired_margin": "" })).unwrap();
        assert_eq!(req.margin_or(30.0), 30.0);
        let req: QuoteRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.margin_or(25.0), 25.0);
        let req: QuoteRequest = serde_json::from_value(json!({ "desired_margin": null })).unwrap();
        assert_eq!(req.margin_or(25.0), 25.0);
    }

    #[test]
    fn zero_margin_is_kept() {
        let req: QuoteRequest = serde_json::from_value(json!({ "desired_margin": 0 })).unwrap();
        assert_eq!(req.margin_or(30.0), 0.0);
        let req: QuoteRequest = serde_json::from_value(json!({ "desired_margin": "0" })).unwrap();
        assert_eq!(req.margin_or(30.0), 0.0);
    }
}
