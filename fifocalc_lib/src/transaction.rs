//! Normalized input transaction model.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Currency recorded when no currency column is mapped.
pub const UNSPECIFIED_CURRENCY: &str = "N/A";

/// How a row's raw type value classified against the configured value sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxKind {
    Buy,
    Sell,
    /// Matched neither value set; flows through the matcher as a no-op.
    Other,
}

/// One normalized input record. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// 1-based data row this record came from (header excluded).
    pub row: usize,
    /// `None` when the raw date failed to parse; sorts after all valid dates
    /// and renders as invalid in output.
    pub date: Option<NaiveDateTime>,
    pub kind: TxKind,
    /// Absolute quantity. Direction comes from `kind`, never from sign.
    pub quantity: f64,
    /// Unit price as given; sign is preserved.
    pub price: f64,
    pub identifier: String,
    pub currency: String,
    /// Pass-through identification columns, in configured order.
    pub extra: Vec<(String, Value)>,
}
