//! Dashboard aggregation over a user's prints, filaments and marketplaces.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::Datelike;
use serde::Serialize;
use uuid::Uuid;

use crate::models::filament::Filament;
use crate::models::marketplace::Marketplace;
use crate::models::print::Print;

pub const DIRECT_SALE: &str = "Direct sale";
pub const UNKNOWN_MARKETPLACE: &str = "Unknown";
pub const UNTITLED: &str = "Untitled";
const TOP_PARTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub revenue: f64,
    pub profit: f64,
    pub cost: f64,
    pub print_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockFilament {
    pub id: Uuid,
    pub name: String,
    pub current_weight_g: f64,
    pub min_stock_alert_g: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProfit {
    pub month: u32,
    pub label: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub year: i32,
    pub totals: Totals,
    pub low_stock: Vec<LowStockFilament>,
    pub cost_distribution: Vec<NamedValue>,
    pub revenue_by_marketplace: Vec<NamedValue>,
    pub top_parts: Vec<NamedValue>,
    pub monthly_profit: Vec<MonthlyProfit>,
}

fn amount(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn by_value_desc(a: &NamedValue, b: &NamedValue) -> Ordering {
    b.value
        .partial_cmp(&a.value)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

pub fn totals(prints: &[Print]) -> Totals {
    Totals {
        revenue: prints.iter().map(|p| amount(p.sale_price)).sum(),
        profit: prints.iter().map(|p| amount(p.profit)).sum(),
        cost: prints.iter().map(|p| amount(p.total_cost)).sum(),
        print_count: prints.len(),
    }
}

pub fn low_stock(filaments: &[Filament]) -> Vec<LowStockFilament> {
    filaments
        .iter()
        .filter(|f| f.is_low_stock())
        .map(|f| LowStockFilament {
            id: f.id,
            name: f.name.clone(),
            current_weight_g: f.current_weight_g.unwrap_or(0.0),
            min_stock_alert_g: f.min_stock_alert_g,
        })
        .collect()
}

pub fn cost_distribution(prints: &[Print]) -> Vec<NamedValue> {
    let sum = |field: fn(&Print) -> Option<f64>| prints.iter().map(|p| amount(field(p))).sum::<f64>();

    [
        ("Filament", sum(|p| p.cost_filament)),
        ("Energy", sum(|p| p.cost_energy)),
        ("Depreciation", sum(|p| p.cost_depreciation)),
        ("Fees", sum(|p| p.marketplace_fee)),
        ("Other", sum(|p| p.cost_additional)),
    ]
    .into_iter()
    .filter(|(_, value)| *value > 0.0)
    .map(|(name, value)| NamedValue {
        name: name.to_string(),
        value,
    })
    .collect()
}

pub fn revenue_by_marketplace(prints: &[Print], marketplaces: &[Marketplace]) -> Vec<NamedValue> {
    let names: HashMap<Uuid, &str> = marketplaces.iter().map(|m| (m.id, m.name.as_str())).collect();
    let mut revenue: HashMap<&str, f64> = HashMap::new();

    for print in prints {
        let price = amount(print.sale_price);
        if price <= 0.0 {
            continue;
        }
        let channel = match print.marketplace_id {
            Some(id) => names.get(&id).copied().unwrap_or(UNKNOWN_MARKETPLACE),
            None => DIRECT_SALE,
        };
        *revenue.entry(channel).or_insert(0.0) += price;
    }

    let mut out: Vec<NamedValue> = revenue
        .into_iter()
        .map(|(name, value)| NamedValue {
            name: name.to_string(),
            value,
        })
        .collect();
    out.sort_by(by_value_desc);
    out
}

pub fn top_parts(prints: &[Print]) -> Vec<NamedValue> {
    let mut revenue: HashMap<&str, f64> = HashMap::new();
    for print in prints {
        let price = amount(print.sale_price);
        if price > 0.0 {
            let name = if print.name.trim().is_empty() { UNTITLED } else { print.name.as_str() };
            *revenue.entry(name).or_insert(0.0) += price;
        }
    }

    let mut out: Vec<NamedValue> = revenue
        .into_iter()
        .map(|(name, value)| NamedValue {
            name: name.to_string(),
            value,
        })
        .collect();
    out.sort_by(by_value_desc);
    out.truncate(TOP_PARTS);
    out
}

/// Profit per calendar month of `year`; only sold prints count.
pub fn monthly_profit(prints: &[Print], year: i32) -> Vec<MonthlyProfit> {
    let mut months = [0.0_f64; 12];

    for print in prints {
        let sale_price = amount(print.sale_price);
        if sale_price <= 0.0 || print.print_date.year() != year {
            continue;
        }
        let idx = print.print_date.month0() as usize;
        months[idx] += sale_price - amount(print.total_cost);
    }

    months
        .iter()
        .enumerate()
        .map(|(i, profit)| MonthlyProfit {
            month: i as u32 + 1,
            label: format!("{year}-{:02}", i + 1),
            profit: round_cents(*profit),
        })
        .collect()
}

pub fn build_dashboard(prints: &[Print], filaments: &[Filament], marketplaces: &[Marketplace], year: i32) -> Dashboard {
    Dashboard {
        year,
        totals: totals(prints),
        low_stock: low_stock(filaments),
        cost_distribution: cost_distribution(prints),
        revenue_by_marketplace: revenue_by_marketplace(prints, marketplaces),
        top_parts: top_parts(prints),
        monthly_profit: monthly_profit(prints, year),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;

    use super::*;

    pub fn print(name: &str, sale: f64, cost: f64, marketplace_id: Option<Uuid>, ymd: (i32, u32, u32)) -> Print {
        let date = Utc.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 12, 0, 0).unwrap();
        Print {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            image_url: None,
            print_date: date,
            filaments_used: Json(vec![]),
            print_time_minutes: 60,
            energy_rate: Some(0.75),
            printer_power_w: Some(250.0),
            cost_filament: Some(cost * 0.5),
            cost_energy: Some(cost * 0.1),
            cost_depreciation: Some(cost * 0.2),
            cost_additional: Some(0.0),
            marketplace_id,
            marketplace_fee: Some(cost * 0.2),
            sale_price: Some(sale),
            total_cost: Some(cost),
            profit: Some(sale - cost),
            real_margin: Some(if sale > 0.0 { (sale - cost) / sale * 100.0 } else { 0.0 }),
            created_at: date,
        }
    }

    pub fn marketplace(name: &str) -> Marketplace {
        Marketplace {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            fee_percent: 12.0,
            fee_fixed: 5.0,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn filament(name: &str, current: Option<f64>, threshold: f64) -> Filament {
        Filament {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            filament_type: "PLA".to_string(),
            color: None,
            brand: None,
            roll_weight_g: 1000.0,
            roll_price: 100.0,
            min_stock_alert_g: threshold,
            current_weight_g: current,
            rolls: 0,
            grams_per_roll: 1000.0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn totals_sum_all_prints() {
        let prints = vec![
            print("A", 50.0, 30.0, None, (2025, 1, 10)),
            print("B", 20.0, 12.0, None, (2025, 2, 10)),
        ];
        let t = totals(&prints);
        assert_eq!(t.revenue, 70.0);
        assert_eq!(t.cost, 42.0);
        assert_eq!(t.profit, 28.0);
        assert_eq!(t.print_count, 2);
    }

    #[test]
    fn revenue_is_grouped_by_channel() {
        let shop = marketplace("Shopee");
        let prints = vec![
            print("A", 50.0, 30.0, Some(shop.id), (2025, 1, 10)),
            print("B", 20.0, 12.0, None, (2025, 2, 10)),
            print("C", 90.0, 12.0, Some(Uuid::new_v4()), (2025, 2, 10)),
            print("D", 0.0, 12.0, Some(shop.id), (2025, 2, 10)),
        ];

        let rows = revenue_by_marketplace(&prints, &[shop]);
        assert_eq!(
            rows,
            vec![
                NamedValue { name: UNKNOWN_MARKETPLACE.into(), value: 90.0 },
                NamedValue { name: "Shopee".into(), value: 50.0 },
                NamedValue { name: DIRECT_SALE.into(), value: 20.0 },
            ]
        );
    }

    #[test]
    fn top_parts_keeps_five_best() {
        let prints: Vec<Print> = (0..7)
            .map(|i| print(&format!("Part {i}"), 10.0 * (i + 1) as f64, 1.0, None, (2025, 3, 1)))
            .chain(std::iter::once(print("Part 0", 100.0, 1.0, None, (2025, 3, 2))))
            .collect();

        let top = top_parts(&prints);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].name, "Part 0");
        assert_eq!(top[0].value, 110.0);
        assert_eq!(top[1].name, "Part 6");
    }

    #[test]
    fn monthly_profit_covers_the_year() {
        let prints = vec![
            print("A", 50.0, 30.0, None, (2025, 1, 10)),
            print("B", 20.0, 12.5, None, (2025, 1, 20)),
            print("C", 40.0, 10.0, None, (2025, 12, 31)),
            print("D", 40.0, 10.0, None, (2024, 12, 31)),
            print("E", 0.0, 10.0, None, (2025, 6, 1)),
        ];
        let months = monthly_profit(&prints, 2025);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].profit, 27.5);
        assert_eq!(months[0].label, "2025-01");
        assert_eq!(months[5].profit, 0.0);
        assert_eq!(months[11].profit, 30.0);
    }

    #[test]
    fn zero_cost_buckets_are_dropped() {
        let prints = vec![print("A", 50.0, 10.0, None, (2025, 1, 10))];
        let names: Vec<String> = cost_distribution(&prints).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Filament", "Energy", "Depreciation", "Fees"]);
    }

    #[test]
    fn low_stock_lists_tracked_spools_under_threshold() {
        let filaments = vec![
            filament("Low", Some(40.0), 0.0),
            filament("Fine", Some(400.0), 250.0),
            filament("Untracked", None, 250.0),
            filament("Custom", Some(200.0), 250.0),
        ];
        let names: Vec<String> = low_stock(&filaments).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Low", "Custom"]);
    }
}
