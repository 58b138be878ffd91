//! Raw table model, column mapping, and transaction extraction.
//!
//! The table is the loose input the engine works from: ordered column names
//! plus rows of `serde_json::Value` cells. A caller-supplied mapping names
//! which columns play which role; resolution against the header is the
//! schema check, and extraction turns surviving rows into transactions while
//! collecting skipped-row diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::CalcConfig;
use crate::normalize::{cell_text, is_missing, parse_amount, parse_date};
use crate::transaction::{Transaction, UNSPECIFIED_CURRENCY};

/// Minimum column count a usable input table carries (date, type, quantity,
/// price at the very least).
pub const MIN_COLUMNS: usize = 4;

/// Jaro-Winkler score a header name must reach to be offered as a
/// did-you-mean suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Structural problems with the input table. Fatal before any computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Input table has no data rows")]
    EmptyTable,
    #[error("Input table must have at least {MIN_COLUMNS} columns, found {found}")]
    TooFewColumns { found: usize },
    #[error("Column '{column}' not found in input header{}", suggestion_text(.suggestion))]
    ColumnNotFound {
        column: String,
        suggestion: Option<String>,
    },
}

fn suggestion_text(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

/// An input table: ordered column names plus rows of loose cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding it to the header width. Rows never arrive wide;
    /// loading rejects records with more fields than the header.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        if row.len() < self.columns.len() {
            row.resize(self.columns.len(), Value::Null);
        }
        self.rows.push(row);
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve one mapped name to its index, or fail with the closest header
    /// name as a suggestion.
    fn resolve_column(&self, name: &str) -> Result<usize, SchemaError> {
        match self.column_index(name) {
            Some(idx) => Ok(idx),
            None => Err(SchemaError::ColumnNotFound {
                column: name.to_string(),
                suggestion: nearest_column(name, &self.columns),
            }),
        }
    }
}

fn nearest_column(name: &str, columns: &[String]) -> Option<String> {
    let wanted = name.to_lowercase();
    let mut best: Option<(f64, &String)> = None;

    for col in columns {
        let score = strsim::jaro_winkler(&wanted, &col.to_lowercase());
        if score >= SUGGESTION_THRESHOLD {
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, col)),
            }
        }
    }

    best.map(|(_, col)| col.clone())
}

/// Caller-supplied mapping from header names to canonical roles.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: String,
    pub price: String,
    pub identifier: String,
    /// Optional; unmapped currency records as the "N/A" sentinel.
    #[serde(default)]
    pub currency: Option<String>,
    /// Extra identification columns carried through to output, in order.
    #[serde(default)]
    pub extra: Vec<String>,
}

impl ColumnMapping {
    /// Resolve every mapped name against the table header. This is the
    /// schema check: too-narrow or empty tables and unknown names abort the
    /// run here.
    pub fn resolve(&self, table: &RawTable) -> Result<ColumnPlan, SchemaError> {
        if table.columns.len() < MIN_COLUMNS {
            return Err(SchemaError::TooFewColumns {
                found: table.columns.len(),
            });
        }
        if table.rows.is_empty() {
            return Err(SchemaError::EmptyTable);
        }

        let currency = match &self.currency {
            Some(name) => Some(table.resolve_column(name)?),
            None => None,
        };
        let mut extra = Vec::with_capacity(self.extra.len());
        for name in &self.extra {
            extra.push((name.clone(), table.resolve_column(name)?));
        }

        Ok(ColumnPlan {
            date: table.resolve_column(&self.date)?,
            kind: table.resolve_column(&self.kind)?,
            quantity: table.resolve_column(&self.quantity)?,
            price: table.resolve_column(&self.price)?,
            identifier: table.resolve_column(&self.identifier)?,
            currency,
            extra,
        })
    }
}

/// Column indices after resolving a mapping against a table header.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    date: usize,
    kind: usize,
    quantity: usize,
    price: usize,
    identifier: usize,
    currency: Option<usize>,
    extra: Vec<(String, usize)>,
}

impl ColumnPlan {
    /// Mapped indices whose cells must be present for a row to survive, in
    /// reporting order.
    fn required(&self) -> Vec<usize> {
        let mut indices = vec![
            self.identifier,
            self.date,
            self.kind,
            self.quantity,
            self.price,
        ];
        if let Some(idx) = self.currency {
            indices.push(idx);
        }
        indices.extend(self.extra.iter().map(|(_, idx)| *idx));
        indices
    }
}

/// Why a row was dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// A mapped column had no value on this row.
    MissingValue { column: String },
    /// Quantity or price text did not convert to a number.
    BadNumber { column: String, raw: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { column } => write!(f, "no value in column '{}'", column),
            Self::BadNumber { column, raw } => {
                write!(f, "cannot read '{}' in column '{}' as a number", raw, column)
            }
        }
    }
}

/// One dropped row: 1-based data row number plus the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

static NULL_CELL: Value = Value::Null;

/// Row cell by index; rows built without `push_row` may be short, and a
/// short row reads as null there.
fn cell<'a>(cells: &'a [Value], idx: usize) -> &'a Value {
    cells.get(idx).unwrap_or(&NULL_CELL)
}

/// Turn table rows into transactions.
///
/// Rows missing any mapped value are dropped and counted; rows whose
/// quantity or price fails numeric conversion are dropped with the raw text
/// recorded. Date failures never drop a row. Row order is preserved.
pub fn extract_transactions(
    table: &RawTable,
    plan: &ColumnPlan,
    config: &CalcConfig,
) -> (Vec<Transaction>, Vec<SkippedRow>) {
    let mut transactions: Vec<Transaction> = Vec::with_capacity(table.rows.len());
    let mut skipped: Vec<SkippedRow> = Vec::new();
    let required = plan.required();

    'rows: for (i, cells) in table.rows.iter().enumerate() {
        let row = i + 1;

        for &idx in &required {
            if is_missing(cell(cells, idx)) {
                let reason = SkipReason::MissingValue {
                    column: table.columns[idx].clone(),
                };
                warn!("skipping row {}: {}", row, reason);
                skipped.push(SkippedRow { row, reason });
                continue 'rows;
            }
        }

        let quantity = match parse_amount(cell(cells, plan.quantity)) {
            Some(value) => value.abs(),
            None => {
                drop_bad_number(&mut skipped, table, row, plan.quantity, cells);
                continue;
            }
        };
        let price = match parse_amount(cell(cells, plan.price)) {
            Some(value) => value,
            None => {
                drop_bad_number(&mut skipped, table, row, plan.price, cells);
                continue;
            }
        };

        let extra = plan
            .extra
            .iter()
            .map(|(name, idx)| (name.clone(), cell(cells, *idx).clone()))
            .collect();

        transactions.push(Transaction {
            row,
            date: parse_date(cell(cells, plan.date), config.input_date_format.as_deref()),
            kind: config.classify(&cell_text(cell(cells, plan.kind))),
            quantity,
            price,
            identifier: cell_text(cell(cells, plan.identifier)),
            currency: match plan.currency {
                Some(idx) => cell_text(cell(cells, idx)),
                None => UNSPECIFIED_CURRENCY.to_string(),
            },
            extra,
        });
    }

    (transactions, skipped)
}

fn drop_bad_number(
    skipped: &mut Vec<SkippedRow>,
    table: &RawTable,
    row: usize,
    idx: usize,
    cells: &[Value],
) {
    let reason = SkipReason::BadNumber {
        column: table.columns[idx].clone(),
        raw: cell_text(cell(cells, idx)),
    };
    warn!("skipping row {}: {}", row, reason);
    skipped.push(SkippedRow { row, reason });
}
