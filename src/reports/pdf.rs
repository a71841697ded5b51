//! # PDF export
//!
//! Quote technical sheets and print-history reports rendered with Typst.
//!
//! - Templates are embedded string constants
//! - User text is injected as Typst string literals, so it is never parsed
//!   as markup
//! - Output is raw PDF bytes (`Vec<u8>`)

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use super::{format_money, HistoryRow, ReportError};
use crate::costing::QuoteBreakdown;

// Font parsing is slow; do it once per process.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
        .collect()
});

/// A single-file Typst world backed by the bundled fonts.
struct ReportWorld {
    main: Source,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
}

impl ReportWorld {
    fn new(source: String) -> Self {
        ReportWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

const QUOTE_TEMPLATE: &str = r##"
#set page(paper: "a4", margin: (x: 2cm, y: 2cm))
#set text(size: 10pt)

#grid(
  columns: (1fr, 1fr),
  align(left + horizon)[#text(size: 14pt, weight: "bold")[{{BRAND}}]],
  align(right + horizon)[#text(size: 24pt, fill: rgb("#1e88e5"))[Technical Sheet]],
)
#v(6pt)
#line(length: 100%, stroke: 0.5pt + luma(200))
#v(12pt)

#text(size: 14pt)[Part: {{NAME}} ]
#v(4pt)
#text(fill: luma(100))[Date: {{DATE}} ]
#linebreak()
#text(fill: luma(100))[Description: {{DESCRIPTION}} ]

#v(12pt)
#block(width: 100%, fill: luma(245), inset: 14pt, radius: 4pt)[
  #text(size: 12pt, weight: "bold")[Cost breakdown]
  #v(6pt)
  #table(
    columns: (1fr, auto),
    stroke: none,
    align: (left, right),
    [Filament (total)], [{{COST_FILAMENT}} ],
    [Energy], [{{COST_ENERGY}} ],
    [Depreciation], [{{COST_DEPRECIATION}} ],
    [Extra costs], [{{COST_ADDITIONAL}} ],
    [Marketplace fees], [{{MARKETPLACE_FEE}} ],
  )
  #line(length: 100%, stroke: 0.5pt + luma(200))
  #v(6pt)
  #grid(
    columns: (1fr, auto),
    row-gutter: 10pt,
    text(size: 14pt, fill: rgb("#1e88e5"))[Total cost],
    text(size: 14pt, fill: rgb("#1e88e5"))[{{TOTAL_COST}} ],
    text(size: 14pt, fill: rgb("#00c853"))[Suggested price],
    text(size: 14pt, fill: rgb("#00c853"))[{{SALE_PRICE}} ],
  )
]

#v(1fr)
#align(center)[#text(size: 8pt, fill: luma(150))[Generated on {{DATE}} ]]
"##;

const HISTORY_TEMPLATE: &str = r##"
#set page(paper: "a4", margin: (x: 1.5cm, y: 2cm))
#set text(size: 9pt)

#grid(
  columns: (1fr, 1fr),
  align(left + horizon)[#text(size: 12pt, weight: "bold")[{{BRAND}}]],
  align(right + horizon)[
    #text(size: 18pt, fill: rgb("#1e88e5"))[Print Report]
    #linebreak()
    #text(fill: luma(100))[Generated on {{DATE}} ]
  ],
)
#v(10pt)

#table(
  columns: (auto, 1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt + luma(200),
  align: (left, left, right, right, right),
  fill: (_, row) => if row == 0 { rgb("#1e88e5") } else if calc.even(row) { luma(245) } else { white },
  table.header(
    text(fill: white, weight: "bold")[Date],
    text(fill: white, weight: "bold")[Name],
    text(fill: white, weight: "bold")[Cost],
    text(fill: white, weight: "bold")[Sale],
    text(fill: white, weight: "bold")[Profit],
  ),
{{ROWS}}
)

#v(8pt)
#align(right)[*Totals:* cost {{TOTAL_COST}} , sale {{TOTAL_SALE}} , profit {{TOTAL_PROFIT}} ]
"##;

/// Render text as an embedded Typst string expression (`#"..."`).
fn typst_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("#\"");
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Replace every `{{KEY}}` of the template in a single scan. Inserted values
/// are never scanned again, so user text that looks like a placeholder stays
/// literal. Unknown keys are left in place.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn compile(source: String) -> Result<Vec<u8>, ReportError> {
    let world = ReportWorld::new(source);

    let warned = typst::compile(&world);
    let document = warned.output.map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        ReportError::Compile(msgs.join("; "))
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        ReportError::Render(msgs.join("; "))
    })
}

/// Header and cost data of a technical sheet.
pub struct QuoteSheet<'a> {
    pub brand: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub date: NaiveDate,
    pub currency: &'a str,
    pub breakdown: &'a QuoteBreakdown,
}

pub fn render_quote_pdf(sheet: &QuoteSheet<'_>) -> Result<Vec<u8>, ReportError> {
    let money = |v: f64| typst_text(&format_money(v, sheet.currency));
    let b = sheet.breakdown;
    let name = if sheet.name.trim().is_empty() { "-" } else { sheet.name };
    let description = sheet.description.filter(|d| !d.trim().is_empty()).unwrap_or("-");

    let date = typst_text(&sheet.date.format("%d/%m/%Y").to_string());
    let source = fill_template(
        QUOTE_TEMPLATE,
        &[
            ("BRAND", typst_text(sheet.brand)),
            ("NAME", typst_text(name)),
            ("DESCRIPTION", typst_text(description)),
            ("DATE", date),
            ("COST_FILAMENT", money(b.cost_filament)),
            ("COST_ENERGY", money(b.cost_energy)),
            ("COST_DEPRECIATION", money(b.cost_depreciation)),
            ("COST_ADDITIONAL", money(b.cost_additional)),
            ("MARKETPLACE_FEE", money(b.marketplace_fee)),
            ("TOTAL_COST", money(b.total_cost)),
            ("SALE_PRICE", money(b.sale_price)),
        ],
    );

    compile(source)
}

pub fn render_history_pdf(
    brand: &str,
    rows: &[HistoryRow],
    generated: NaiveDate,
    currency: &str,
) -> Result<Vec<u8>, ReportError> {
    let money = |v: f64| typst_text(&format_money(v, currency));

    let table_rows: String = rows
        .iter()
        .map(|r| {
            format!(
                "  [{} ], [{} ], [{} ], [{} ], [{} ],\n",
                typst_text(&r.date.format("%d/%m/%Y").to_string()),
                typst_text(&r.name),
                money(r.total_cost),
                money(r.sale_price),
                money(r.profit),
            )
        })
        .collect();

    let source = fill_template(
        HISTORY_TEMPLATE,
        &[
            ("BRAND", typst_text(brand)),
            ("DATE", typst_text(&generated.format("%d/%m/%Y").to_string())),
            ("ROWS", table_rows),
            ("TOTAL_COST", money(rows.iter().map(|r| r.total_cost).sum())),
            ("TOTAL_SALE", money(rows.iter().map(|r| r.sale_price).sum())),
            ("TOTAL_PROFIT", money(rows.iter().map(|r| r.profit).sum())),
        ],
    );

    compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::{calculate_quote, MachineRates, PrintDuration, QuoteInput, RollPricing, ShopDefaults};
    use std::collections::HashMap;

    #[test]
    fn user_text_is_quoted() {
        assert_eq!(typst_text("Vase #2 \"big\""), "#\"Vase #2 \\\"big\\\"\"");
        assert_eq!(typst_text("a\\b\nc"), "#\"a\\\\b\\nc\"");
    }

    #[test]
    fn placeholders_are_filled_once() {
        let filled = fill_template(
            "[{{NAME}}] [{{DESCRIPTION}}] {{OTHER}}",
            &[("NAME", "{{DESCRIPTION}}".to_string()), ("DESCRIPTION", "]".to_string())],
        );
        assert_eq!(filled, "[{{DESCRIPTION}}] []] {{OTHER}}");
    }

    #[test]
    fn placeholder_like_user_text_still_renders() {
        let breakdown = calculate_quote(
            &QuoteInput {
                usage: vec![],
                duration: PrintDuration::new(1.0, 0.0),
                machine: MachineRates::resolve(None, &ShopDefaults::default()),
                additional_cost: 0.0,
                fee: None,
                margin_percent: 30.0,
            },
            &HashMap::<uuid::Uuid, RollPricing>::new(),
        );

        let pdf = render_quote_pdf(&QuoteSheet {
            brand: "{{NAME}}",
            name: "{{DESCRIPTION}}",
            description: Some("]"),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            currency: "BRL",
            breakdown: &breakdown,
        });
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let rows = vec![HistoryRow {
            date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            name: "{{ROWS}} ]".into(),
            marketplace: None,
            total_cost: 1.0,
            sale_price: 2.0,
            profit: 1.0,
            real_margin: 50.0,
        }];
        let pdf = render_history_pdf("{{TOTAL_COST}}", &rows, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), "BRL");
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
    }

    #[test]
    fn quote_sheet_renders() {
        let breakdown = calculate_quote(
            &QuoteInput {
                usage: vec![],
                duration: PrintDuration::new(3.0, 15.0),
                machine: MachineRates::resolve(None, &ShopDefaults::default()),
                additional_cost: 4.5,
                fee: None,
                margin_percent: 30.0,
            },
            &HashMap::<uuid::Uuid, RollPricing>::new(),
        );

        let pdf = render_quote_pdf(&QuoteSheet {
            brand: "Maker's *Lab* // #1",
            name: "Dragon $pecial [v2]",
            description: Some("http://example.com _draft_"),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            currency: "BRL",
            breakdown: &breakdown,
        });

        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
        let bytes = pdf.unwrap();
        assert!(bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
    }

    #[test]
    fn history_report_renders() {
        let rows = vec![
            HistoryRow {
                date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                name: "Keychain".into(),
                marketplace: None,
                total_cost: 3.2,
                sale_price: 9.9,
                profit: 6.7,
                real_margin: 67.67,
            },
            HistoryRow {
                date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                name: "Lamp \"Moon\"".into(),
                marketplace: Some("Etsy".into()),
                total_cost: 41.0,
                sale_price: 80.0,
                profit: 39.0,
                real_margin: 48.75,
            },
        ];

        let pdf = render_history_pdf("Shop", &rows, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), "USD").unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_history_still_renders() {
        let pdf = render_history_pdf("Shop", &[], NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), "EUR").unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
