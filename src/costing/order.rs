//! Totals of a customer order.

use serde::Serialize;

use super::{finite_or_zero, FeeSchedule};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLine {
    pub quantity: i32,
    pub unit_price: f64,
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OrderTotals {
    pub total_price: f64,
    pub marketplace_fee: f64,
    pub total_cost: f64,
    pub net_profit: f64,
}

pub fn order_totals(lines: &[OrderLine], fee: Option<FeeSchedule>) -> OrderTotals {
    let (total_price, total_cost) = lines.iter().fold((0.0, 0.0), |(revenue, cost), line| {
        let qty = f64::from(line.quantity.max(0));
        (
            revenue + finite_or_zero(line.unit_price) * qty,
            cost + finite_or_zero(line.unit_cost) * qty,
        )
    });

    let marketplace_fee = fee.map(|f| f.fee_on(total_price)).unwrap_or(0.0);

    OrderTotals {
        total_price,
        marketplace_fee,
        total_cost,
        net_profit: total_price - marketplace_fee - total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::test_support::assert_close;

    #[test]
    fn totals_with_marketplace() {
        let totals = order_totals(
            &[
                OrderLine { quantity: 2, unit_price: 30.0, unit_cost: 8.0 },
                OrderLine { quantity: 1, unit_price: 15.0, unit_cost: 5.5 },
            ],
            Some(FeeSchedule::new(10.0, 3.0)),
        );
        assert_close(totals.total_price, 75.0);
        assert_close(totals.marketplace_fee, 10.5);
        assert_close(totals.total_cost, 21.5);
        assert_close(totals.net_profit, 43.0);
    }

    #[test]
    fn direct_sale_has_no_fee() {
        let totals = order_totals(&[OrderLine { quantity: 3, unit_price: 10.0, unit_cost: 4.0 }], None);
        assert_eq!(totals.marketplace_fee, 0.0);
        assert_close(totals.net_profit, 18.0);
    }
}
