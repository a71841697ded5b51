//! CSV download of the print history.

use super::{HistoryRow, ReportError};

const HEADER: [&str; 7] = ["date", "name", "marketplace", "total_cost", "sale_price", "profit", "real_margin"];

pub fn history_csv(rows: &[HistoryRow]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for row in rows {
        writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.name.clone(),
            row.marketplace.clone().unwrap_or_default(),
            format!("{:.2}", row.total_cost),
            format!("{:.2}", row.sale_price),
            format!("{:.2}", row.profit),
            format!("{:.2}", row.real_margin),
        ])?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ReportError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rows_are_written_after_header() {
        let rows = vec![HistoryRow {
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            name: "Gear, large".into(),
            marketplace: Some("Shopee".into()),
            total_cost: 10.0,
            sale_price: 25.5,
            profit: 15.5,
            real_margin: 60.784,
        }];

        let out = String::from_utf8(history_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "date,name,marketplace,total_cost,sale_price,profit,real_margin");
        assert_eq!(lines[1], "2025-05-06,\"Gear, large\",Shopee,10.00,25.50,15.50,60.78");
    }

    #[test]
    fn empty_history_has_only_header() {
        let out = String::from_utf8(history_csv(&[]).unwrap()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}
