//! Filament stock arithmetic. Weights are grams; stock never goes negative.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::{finite_or_zero, PricedUsage};

/// Reorder threshold applied when a filament has none set.
pub const DEFAULT_REORDER_THRESHOLD_G: f64 = 100.0;

pub fn consume(current_weight_g: f64, used_g: f64) -> f64 {
    (finite_or_zero(current_weight_g) - finite_or_zero(used_g).max(0.0)).max(0.0)
}

/// Whole rolls left for a weight; zero when the roll size is unknown.
pub fn rolls_for_weight(weight_g: f64, grams_per_roll: f64) -> i32 {
    if grams_per_roll > 0.0 && weight_g > 0.0 {
        (weight_g / grams_per_roll).floor() as i32
    } else {
        0
    }
}

pub fn is_low_stock(current_weight_g: Option<f64>, min_stock_alert_g: f64) -> bool {
    let threshold = if min_stock_alert_g > 0.0 {
        min_stock_alert_g
    } else {
        DEFAULT_REORDER_THRESHOLD_G
    };
    matches!(current_weight_g, Some(w) if w < threshold)
}

/// Stock fields of a filament row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpoolStock {
    /// `None` means the spool is not tracked.
    pub current_weight_g: Option<f64>,
    pub rolls: i32,
    pub grams_per_roll: f64,
}

impl SpoolStock {
    /// Stock after a job used `used_g`; `None` when the spool is untracked.
    pub fn after_consumption(&self, used_g: f64) -> Option<SpoolStock> {
        let current = self.current_weight_g?;
        let weight = consume(current, used_g);
        Some(SpoolStock {
            current_weight_g: Some(weight),
            rolls: rolls_for_weight(weight, self.grams_per_roll),
            grams_per_roll: self.grams_per_roll,
        })
    }

    /// Stock after buying `rolls_added` rolls; `None` when the roll count
    /// would no longer fit the column.
    pub fn after_purchase(&self, rolls_added: i32) -> Option<SpoolStock> {
        let added = rolls_added.max(0);
        let rolls = self.rolls.max(0).checked_add(added)?;
        let weight = self.current_weight_g.unwrap_or(0.0) + f64::from(added) * self.grams_per_roll.max(0.0);
        Some(SpoolStock {
            current_weight_g: Some(weight),
            rolls,
            grams_per_roll: self.grams_per_roll,
        })
    }
}

/// Total grams per filament across a usage list.
pub fn weight_by_filament(usage: &[PricedUsage]) -> BTreeMap<Uuid, f64> {
    let mut totals = BTreeMap::new();
    for entry in usage {
        *totals.entry(entry.filament_id).or_insert(0.0) += entry.material_weight_g;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spool(weight: Option<f64>) -> SpoolStock {
        SpoolStock {
            current_weight_g: weight,
            rolls: 2,
            grams_per_roll: 1000.0,
        }
    }

    #[test]
    fn consumption_is_clamped_at_zero() {
        assert_eq!(consume(100.0, 250.0), 0.0);
        assert_eq!(consume(100.0, 40.0), 60.0);
        assert_eq!(consume(100.0, -40.0), 100.0);
        assert_eq!(consume(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn stock_never_negative_after_any_job() {
        for current in [0.0, 1.0, 99.5, 1500.0] {
            for used in [0.0, 0.5, 100.0, 5000.0] {
                let after = spool(Some(current)).after_consumption(used).unwrap();
                assert!(after.current_weight_g.unwrap() >= 0.0);
                assert!(after.rolls >= 0);
            }
        }
    }

    #[test]
    fn rolls_follow_remaining_weight() {
        let after = spool(Some(2000.0)).after_consumption(1200.0).unwrap();
        assert_eq!(after.current_weight_g, Some(800.0));
        assert_eq!(after.rolls, 0);
        assert_eq!(rolls_for_weight(2500.0, 1000.0), 2);
        assert_eq!(rolls_for_weight(2500.0, 0.0), 0);
    }

    #[test]
    fn untracked_spools_are_left_alone() {
        assert!(spool(None).after_consumption(10.0).is_none());
    }

    #[test]
    fn purchase_adds_rolls_and_grams() {
        let after = spool(None).after_purchase(3).unwrap();
        assert_eq!(after.current_weight_g, Some(3000.0));
        assert_eq!(after.rolls, 5);
    }

    #[test]
    fn purchase_past_the_roll_limit_is_refused() {
        assert!(spool(None).after_purchase(i32::MAX).is_none());

        let full = SpoolStock { current_weight_g: Some(0.0), rolls: i32::MAX - 1, grams_per_roll: 1000.0 };
        assert_eq!(full.after_purchase(1).unwrap().rolls, i32::MAX);
        assert!(full.after_purchase(2).is_none());
    }

    #[test]
    fn low_stock_uses_default_threshold() {
        assert!(is_low_stock(Some(50.0), 0.0));
        assert!(!is_low_stock(Some(150.0), 0.0));
        assert!(is_low_stock(Some(150.0), 200.0));
        assert!(!is_low_stock(None, 200.0));
    }

    #[test]
    fn weights_are_summed_per_filament() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let usage = [
            PricedUsage { filament_id: a, material_weight_g: 10.0, cost: 1.0 },
            PricedUsage { filament_id: b, material_weight_g: 5.0, cost: 1.0 },
            PricedUsage { filament_id: a, material_weight_g: 2.5, cost: 0.2 },
        ];
        let totals = weight_by_filament(&usage);
        assert_eq!(totals[&a], 12.5);
        assert_eq!(totals[&b], 5.0);
    }
}
