//! Read-side outputs: dashboard figures and downloadable exports.

pub mod csv_export;
pub mod dashboard;
pub mod pdf;

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::marketplace::Marketplace;
use crate::models::print::Print;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("typst compilation failed: {0}")]
    Compile(String),
    #[error("pdf rendering failed: {0}")]
    Render(String),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv export failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::internal(err.to_string())
    }
}

pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "BRL" => "R$".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "" => String::new(),
        other => other.to_string(),
    }
}

pub fn format_money(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let symbol = currency_symbol(currency);
    if symbol.is_empty() {
        format!("{amount:.2}")
    } else {
        format!("{symbol} {amount:.2}")
    }
}

/// One line of the print history export.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub name: String,
    pub marketplace: Option<String>,
    pub total_cost: f64,
    pub sale_price: f64,
    pub profit: f64,
    pub real_margin: f64,
}

impl HistoryRow {
    pub fn from_print(print: &Print, marketplace: Option<&str>) -> Self {
        Self {
            date: print.print_date.date_naive(),
            name: print.name.clone(),
            marketplace: marketplace.map(str::to_string),
            total_cost: print.total_cost.unwrap_or(0.0),
            sale_price: print.sale_price.unwrap_or(0.0),
            profit: print.profit.unwrap_or(0.0),
            real_margin: print.real_margin.unwrap_or(0.0),
        }
    }
}

pub fn history_rows(prints: &[Print], marketplaces: &[Marketplace]) -> Vec<HistoryRow> {
    let names: HashMap<Uuid, &str> = marketplaces.iter().map(|m| (m.id, m.name.as_str())).collect();
    prints
        .iter()
        .map(|p| HistoryRow::from_print(p, p.marketplace_id.and_then(|id| names.get(&id).copied())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::dashboard::fixtures::{marketplace, print};
    use super::*;

    #[test]
    fn money_uses_currency_symbol() {
        assert_eq!(format_money(12.346, "BRL"), "R$ 12.35");
        assert_eq!(format_money(3.0, "usd"), "$ 3.00");
        assert_eq!(format_money(1.5, "JPY"), "JPY 1.50");
        assert_eq!(format_money(f64::NAN, ""), "0.00");
    }

    #[test]
    fn rows_resolve_marketplace_names() {
        let shop = marketplace("Etsy");
        let prints = vec![
            print("A", 10.0, 4.0, Some(shop.id), (2025, 4, 1)),
            print("B", 10.0, 4.0, None, (2025, 4, 2)),
        ];
        let rows = history_rows(&prints, &[shop]);
        assert_eq!(rows[0].marketplace.as_deref(), Some("Etsy"));
        assert_eq!(rows[1].marketplace, None);
        assert_eq!(rows[0].profit, 6.0);
    }
}
