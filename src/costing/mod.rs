//! Cost arithmetic for print jobs, production runs and orders.
//!
//! Everything in here is pure: handlers load rows from the database, build
//! the inputs below, and persist whatever comes out. Keeping the formulas
//! free of I/O is what lets the quote endpoint and the job endpoints agree
//! to the cent.

pub mod order;
pub mod production;
pub mod quote;
pub mod stock;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use order::{order_totals, OrderLine, OrderTotals};
pub use production::{blended_average_cost, calculate_production, ProductionCost, ProductionInput};
pub use quote::{calculate_quote, QuoteBreakdown, QuoteInput};

/// Energy tariff used when a user has no stored configuration.
pub const DEFAULT_ENERGY_RATE: f64 = 0.75;
/// Printer depreciation per hour used when no printer is selected.
pub const DEFAULT_HOURLY_COST: f64 = 3.0;
/// Printer power draw in watts used when nothing better is known.
pub const DEFAULT_POWER_W: f64 = 250.0;
/// Desired margin in percent applied to quotes by default.
pub const DEFAULT_MARGIN_PERCENT: f64 = 30.0;

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Fee schedule of a sales channel: a percentage of the price plus a fixed amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub percent: f64,
    pub fixed: f64,
}

impl FeeSchedule {
    pub fn new(percent: f64, fixed: f64) -> Self {
        Self {
            percent: finite_or_zero(percent),
            fixed: finite_or_zero(fixed),
        }
    }

    /// Fee charged by the channel on a sale of `amount`.
    pub fn fee_on(&self, amount: f64) -> f64 {
        finite_or_zero(amount) * self.percent / 100.0 + self.fixed
    }
}

/// Wall-clock duration of a print as entered on the form.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrintDuration {
    pub hours: f64,
    pub minutes: f64,
}

impl PrintDuration {
    pub fn new(hours: f64, minutes: f64) -> Self {
        Self {
            hours: finite_or_zero(hours),
            minutes: finite_or_zero(minutes),
        }
    }

    pub fn from_minutes(minutes: i32) -> Self {
        Self::new(0.0, f64::from(minutes))
    }

    pub fn total_hours(&self) -> f64 {
        self.hours + self.minutes / 60.0
    }

    /// Duration in whole minutes, as stored on job rows.
    pub fn total_minutes(&self) -> i32 {
        (self.hours * 60.0 + self.minutes).round() as i32
    }
}

/// Price of a filament roll, from which the per-gram cost is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollPricing {
    pub roll_price: f64,
    pub roll_weight_g: f64,
}

impl RollPricing {
    /// Zero when the roll weight is not positive.
    pub fn price_per_gram(&self) -> f64 {
        if self.roll_weight_g > 0.0 {
            finite_or_zero(self.roll_price / self.roll_weight_g)
        } else {
            0.0
        }
    }
}

/// Lookup of roll pricing by filament id.
pub trait FilamentCatalog {
    fn pricing(&self, filament_id: &Uuid) -> Option<RollPricing>;
}

impl FilamentCatalog for HashMap<Uuid, RollPricing> {
    fn pricing(&self, filament_id: &Uuid) -> Option<RollPricing> {
        self.get(filament_id).copied()
    }
}

/// One row of the "filaments used" list before pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageLine {
    pub filament_id: Option<Uuid>,
    pub weight_g: f64,
}

/// A usage entry as persisted on a job: only referenced filaments with a
/// positive weight survive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricedUsage {
    pub filament_id: Uuid,
    pub material_weight_g: f64,
    pub cost: f64,
}

/// Result of pricing a usage list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialCost {
    pub cost: f64,
    pub weight_g: f64,
    pub usage: Vec<PricedUsage>,
}

/// Price every line against the catalog.
///
/// A line whose filament is unknown contributes nothing to the cost but is
/// still kept for persistence when it has a reference and a positive weight.
pub fn price_usage<C: FilamentCatalog + ?Sized>(lines: &[UsageLine], catalog: &C) -> MaterialCost {
    let mut out = MaterialCost::default();

    for line in lines {
        let weight = finite_or_zero(line.weight_g);
        let Some(filament_id) = line.filament_id else {
            continue;
        };
        if weight <= 0.0 {
            continue;
        }

        let cost = match catalog.pricing(&filament_id) {
            Some(pricing) => {
                out.weight_g += weight;
                weight * pricing.price_per_gram()
            }
            None => 0.0,
        };
        out.cost += cost;
        out.usage.push(PricedUsage {
            filament_id,
            material_weight_g: weight,
            cost,
        });
    }

    out
}

/// Per-user defaults from the settings page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopDefaults {
    pub energy_rate: f64,
    pub hourly_cost: f64,
    pub power_w: f64,
    pub margin_percent: f64,
}

impl Default for ShopDefaults {
    fn default() -> Self {
        Self {
            energy_rate: DEFAULT_ENERGY_RATE,
            hourly_cost: DEFAULT_HOURLY_COST,
            power_w: DEFAULT_POWER_W,
            margin_percent: DEFAULT_MARGIN_PERCENT,
        }
    }
}

/// What a specific printer contributes to the machine rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrinterRates {
    pub power_w: f64,
    pub purchase_price: f64,
    pub lifespan_hours: f64,
}

impl PrinterRates {
    pub fn depreciation_per_hour(&self) -> f64 {
        if self.lifespan_hours > 0.0 {
            finite_or_zero(self.purchase_price / self.lifespan_hours)
        } else {
            0.0
        }
    }
}

/// Rates that turn print time into energy and depreciation cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MachineRates {
    pub power_w: f64,
    pub energy_rate: f64,
    pub depreciation_per_hour: f64,
}

impl MachineRates {
    /// Printer values win when a printer is selected; the user's defaults
    /// fill in the rest.
    pub fn resolve(printer: Option<&PrinterRates>, defaults: &ShopDefaults) -> Self {
        let power_w = match printer {
            Some(p) if p.power_w > 0.0 => p.power_w,
            _ => defaults.power_w,
        };
        let depreciation_per_hour = printer
            .map(PrinterRates::depreciation_per_hour)
            .unwrap_or(defaults.hourly_cost);

        Self {
            power_w: finite_or_zero(power_w),
            energy_rate: finite_or_zero(defaults.energy_rate),
            depreciation_per_hour: finite_or_zero(depreciation_per_hour),
        }
    }

    pub fn energy_cost(&self, hours: f64) -> f64 {
        (self.power_w * hours / 1000.0) * self.energy_rate
    }

    pub fn depreciation_cost(&self, hours: f64) -> f64 {
        hours * self.depreciation_per_hour
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn catalog(entries: &[(Uuid, f64, f64)]) -> HashMap<Uuid, RollPricing> {
        entries
            .iter()
            .map(|(id, price, weight)| {
                (
                    *id,
                    RollPricing {
                        roll_price: *price,
                        roll_weight_g: *weight,
                    },
                )
            })
            .collect()
    }

    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn fee_is_percent_plus_fixed() {
        let fee = FeeSchedule::new(12.0, 5.0);
        assert_close(fee.fee_on(100.0), 17.0);
        assert_close(fee.fee_on(0.0), 5.0);
    }

    #[test]
    fn duration_combines_hours_and_minutes() {
        let d = PrintDuration::new(2.0, 30.0);
        assert_close(d.total_hours(), 2.5);
        assert_eq!(d.total_minutes(), 150);
        assert_eq!(PrintDuration::from_minutes(95).total_minutes(), 95);
    }

    #[test]
    fn zero_roll_weight_prices_at_zero() {
        let p = RollPricing {
            roll_price: 100.0,
            roll_weight_g: 0.0,
        };
        assert_eq!(p.price_per_gram(), 0.0);
    }

    #[test]
    fn unknown_filament_costs_nothing_but_is_kept() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let cat = catalog(&[(known, 120.0, 1000.0)]);

        let priced = price_usage(
            &[
                UsageLine { filament_id: Some(known), weight_g: 50.0 },
                UsageLine { filament_id: Some(unknown), weight_g: 30.0 },
                UsageLine { filament_id: None, weight_g: 10.0 },
                UsageLine { filament_id: Some(known), weight_g: 0.0 },
            ],
            &cat,
        );

        assert_close(priced.cost, 6.0);
        assert_close(priced.weight_g, 50.0);
        assert_eq!(priced.usage.len(), 2);
        assert_eq!(priced.usage[1].filament_id, unknown);
        assert_eq!(priced.usage[1].cost, 0.0);
    }

    #[test]
    fn printer_overrides_defaults() {
        let defaults = ShopDefaults::default();
        let printer = PrinterRates {
            power_w: 120.0,
            purchase_price: 3000.0,
            lifespan_hours: 6000.0,
        };

        let rates = MachineRates::resolve(Some(&printer), &defaults);
        assert_close(rates.power_w, 120.0);
        assert_close(rates.depreciation_per_hour, 0.5);
        assert_close(rates.energy_rate, DEFAULT_ENERGY_RATE);

        let fallback = MachineRates::resolve(None, &defaults);
        assert_close(fallback.power_w, DEFAULT_POWER_W);
        assert_close(fallback.depreciation_per_hour, DEFAULT_HOURLY_COST);
    }

    #[test]
    fn printer_without_power_uses_default_power() {
        let printer = PrinterRates {
            power_w: 0.0,
            purchase_price: 1000.0,
            lifespan_hours: 0.0,
        };
        let rates = MachineRates::resolve(Some(&printer), &ShopDefaults::default());
        assert_close(rates.power_w, DEFAULT_POWER_W);
        assert_eq!(rates.depreciation_per_hour, 0.0);
    }
}
