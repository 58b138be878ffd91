//! Flattening sale results into the output row layout.
//!
//! One output row per matched lot, carrying the sale-level fields next to
//! that lot's consumption record. Dates become text here; everything else
//! stays a loose cell so renderers can choose their own number formatting.

use chrono::NaiveDateTime;
use serde_json::{Map, Number, Value};

use crate::config::CalcConfig;
use crate::matcher::SaleResult;
use crate::table::ColumnMapping;

/// Literal rendered where a value has no known origin.
pub const UNKNOWN: &str = "Unknown";
/// Literal rendered where a sale date failed to parse.
pub const INVALID_DATE: &str = "Invalid Date";

/// Base output columns, in order. `Currency` follows only when a currency
/// column was mapped; configured extra columns come last.
const BASE_COLUMNS: [&str; 8] = [
    "Identifier",
    "Buy Date",
    "Buy Price",
    "Sell Date",
    "Sell Price",
    "Sell Qty",
    "Used Qty",
    "Gain/Loss",
];

/// The flattened calculation output.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows as name-to-value maps, for JSON-style consumers. Keys keep the
    /// column order.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Build the report for a finished run. Row order follows the sale order and
/// each sale's matched-lot order; a sale with no matched lots contributes no
/// rows.
pub fn build_report(sales: &[SaleResult], mapping: &ColumnMapping, config: &CalcConfig) -> Report {
    let include_currency = mapping.currency.is_some();

    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    if include_currency {
        columns.push("Currency".to_string());
    }
    columns.extend(mapping.extra.iter().cloned());

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for sale in sales {
        for lot in &sale.lots {
            let mut row: Vec<Value> = Vec::with_capacity(columns.len());
            row.push(Value::String(sale.identifier.clone()));
            row.push(render_date(
                lot.acquisition_date,
                &config.output_date_format,
                UNKNOWN,
            ));
            row.push(lot.cost_basis.map_or_else(unknown_cell, number_cell));
            row.push(render_date(
                sale.date,
                &config.output_date_format,
                INVALID_DATE,
            ));
            row.push(number_cell(sale.sale_price));
            row.push(number_cell(sale.sale_quantity));
            row.push(number_cell(lot.used_quantity));
            row.push(lot.gain.map_or_else(unknown_cell, number_cell));
            if include_currency {
                row.push(Value::String(sale.currency.clone()));
            }
            row.extend(sale.extra.iter().map(|(_, value)| value.clone()));
            rows.push(row);
        }
    }

    Report { columns, rows }
}

fn render_date(date: Option<NaiveDateTime>, fmt: &str, absent: &str) -> Value {
    match date {
        Some(d) => Value::String(d.format(fmt).to_string()),
        None => Value::String(absent.to_string()),
    }
}

fn number_cell(value: f64) -> Value {
    // Non-finite values have no JSON number form; they render as null.
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn unknown_cell() -> Value {
    Value::String(UNKNOWN.to_string())
}
