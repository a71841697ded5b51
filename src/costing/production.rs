//! Batch cost of a production run and its effect on product unit cost.

use serde::Serialize;

use super::{finite_or_zero, price_usage, FilamentCatalog, MachineRates, PricedUsage, PrintDuration, UsageLine};

#[derive(Debug, Clone)]
pub struct ProductionInput {
    pub usage: Vec<UsageLine>,
    pub duration: PrintDuration,
    pub machine: MachineRates,
    pub additional_cost: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionCost {
    pub cost_filament_total: f64,
    pub cost_energy: f64,
    pub cost_depreciation: f64,
    pub cost_additional: f64,
    pub total_batch_cost: f64,
    pub quantity: i32,
    pub unit_cost: f64,
    pub print_time_minutes: i32,
    pub energy_rate: f64,
    pub printer_power_w: f64,
    pub filaments_used: Vec<PricedUsage>,
}

pub fn calculate_production<C: FilamentCatalog + ?Sized>(input: &ProductionInput, catalog: &C) -> ProductionCost {
    let material = price_usage(&input.usage, catalog);
    let hours = input.duration.total_hours();

    let cost_energy = input.machine.energy_cost(hours);
    let cost_depreciation = input.machine.depreciation_cost(hours);
    let cost_additional = finite_or_zero(input.additional_cost);
    let total_batch_cost = material.cost + cost_energy + cost_depreciation + cost_additional;

    // A batch always yields at least one unit.
    let quantity = input.quantity.max(1);

    ProductionCost {
        cost_filament_total: material.cost,
        cost_energy,
        cost_depreciation,
        cost_additional,
        total_batch_cost,
        quantity,
        unit_cost: total_batch_cost / f64::from(quantity),
        print_time_minutes: input.duration.total_minutes(),
        energy_rate: input.machine.energy_rate,
        printer_power_w: input.machine.power_w,
        filaments_used: material.usage,
    }
}

/// Stock-weighted average of the current unit cost and a new batch.
pub fn blended_average_cost(stock_quantity: i32, average_cost: f64, added_quantity: i32, unit_cost: f64) -> f64 {
    let on_hand = stock_quantity.max(0);
    let added = added_quantity.max(0);
    let total = on_hand + added;

    if total == 0 {
        return finite_or_zero(average_cost);
    }
    if on_hand == 0 {
        return finite_or_zero(unit_cost);
    }

    (f64::from(on_hand) * finite_or_zero(average_cost) + f64::from(added) * finite_or_zero(unit_cost))
        / f64::from(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::test_support::{assert_close, catalog};
    use crate::costing::{PrinterRates, ShopDefaults};
    use uuid::Uuid;

    #[test]
    fn batch_cost_is_split_across_units() {
        let id = Uuid::new_v4();
        let cat = catalog(&[(id, 90.0, 1000.0)]);
        let printer = PrinterRates {
            power_w: 200.0,
            purchase_price: 4000.0,
            lifespan_hours: 4000.0,
        };

        let cost = calculate_production(
            &ProductionInput {
                usage: vec![UsageLine { filament_id: Some(id), weight_g: 200.0 }],
                duration: PrintDuration::new(5.0, 0.0),
                machine: MachineRates::resolve(Some(&printer), &ShopDefaults::default()),
                additional_cost: 2.0,
                quantity: 4,
            },
            &cat,
        );

        // 18 filament + 0.75 energy + 5 depreciation + 2 extra
        assert_close(cost.cost_filament_total, 18.0);
        assert_close(cost.cost_energy, 0.75);
        assert_close(cost.cost_depreciation, 5.0);
        assert_close(cost.total_batch_cost, 25.75);
        assert_close(cost.unit_cost, 25.75 / 4.0);
        assert_eq!(cost.print_time_minutes, 300);
        assert_close(cost.printer_power_w, 200.0);
    }

    #[test]
    fn zero_quantity_counts_as_one() {
        let cost = calculate_production(
            &ProductionInput {
                usage: vec![],
                duration: PrintDuration::new(1.0, 0.0),
                machine: MachineRates::resolve(None, &ShopDefaults::default()),
                additional_cost: 0.0,
                quantity: 0,
            },
            &catalog(&[]),
        );
        assert_eq!(cost.quantity, 1);
        assert_close(cost.unit_cost, cost.total_batch_cost);
    }

    #[test]
    fn average_cost_blends_by_stock() {
        assert_close(blended_average_cost(10, 2.0, 10, 4.0), 3.0);
        assert_close(blended_average_cost(0, 9.0, 5, 4.0), 4.0);
        assert_close(blended_average_cost(-3, 9.0, 5, 4.0), 4.0);
        assert_close(blended_average_cost(0, 9.0, 0, 4.0), 9.0);
    }
}
