//! Quote pipeline: material + energy + depreciation + extras, marked up by
//! the desired margin, then loaded with the marketplace fee.

use serde::Serialize;

use super::{finite_or_zero, price_usage, FeeSchedule, FilamentCatalog, MachineRates, PricedUsage, PrintDuration, UsageLine};

#[derive(Debug, Clone)]
pub struct QuoteInput {
    pub usage: Vec<UsageLine>,
    pub duration: PrintDuration,
    pub machine: MachineRates,
    pub additional_cost: f64,
    pub fee: Option<FeeSchedule>,
    pub margin_percent: f64,
}

/// Full cost/price/profit breakdown of one print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteBreakdown {
    pub cost_filament: f64,
    pub total_weight_g: f64,
    pub cost_energy: f64,
    pub cost_depreciation: f64,
    pub cost_additional: f64,
    pub base_cost: f64,
    pub margin_percent: f64,
    pub price_with_margin: f64,
    pub marketplace_fee: f64,
    pub sale_price: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub real_margin: f64,
    pub print_time_minutes: i32,
    pub filaments_used: Vec<PricedUsage>,
}

impl QuoteBreakdown {
    /// Usage entries worth persisting on the job row.
    pub fn priced_usage(&self) -> &[PricedUsage] {
        &self.filaments_used
    }
}

/// Profit margin in percent of the sale price; zero when nothing is sold.
pub fn margin_percent(profit: f64, sale_price: f64) -> f64 {
    if sale_price > 0.0 {
        profit / sale_price * 100.0
    } else {
        0.0
    }
}

pub fn calculate_quote<C: FilamentCatalog + ?Sized>(input: &QuoteInput, catalog: &C) -> QuoteBreakdown {
    let material = price_usage(&input.usage, catalog);
    let hours = input.duration.total_hours();

    let cost_energy = input.machine.energy_cost(hours);
    let cost_depreciation = input.machine.depreciation_cost(hours);
    let cost_additional = finite_or_zero(input.additional_cost);
    let base_cost = material.cost + cost_energy + cost_depreciation + cost_additional;

    let margin = finite_or_zero(input.margin_percent);
    let price_with_margin = base_cost * (1.0 + margin / 100.0);

    let marketplace_fee = input
        .fee
        .map(|fee| fee.fee_on(price_with_margin))
        .unwrap_or(0.0);

    let sale_price = price_with_margin + marketplace_fee;
    let total_cost = base_cost + marketplace_fee;
    let profit = sale_price - total_cost;

    QuoteBreakdown {
        cost_filament: material.cost,
        total_weight_g: material.weight_g,
        cost_energy,
        cost_depreciation,
        cost_additional,
        base_cost,
        margin_percent: margin,
        price_with_margin,
        marketplace_fee,
        sale_price,
        total_cost,
        profit,
        real_margin: margin_percent(profit, sale_price),
        print_time_minutes: input.duration.total_minutes(),
        filaments_used: material.usage,
    }
}
