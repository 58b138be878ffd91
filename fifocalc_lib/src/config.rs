//! Calculation options and their validation.

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::is_valid_date_format;
use crate::transaction::TxKind;

/// Configuration problems. Fatal before any computation runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No transaction type values classify a buy")]
    NoBuyValues,
    #[error("No transaction type values classify a sell")]
    NoSellValues,
    #[error("'{0}' is not a valid date format pattern")]
    InvalidDateFormat(String),
}

/// Options for one calculation run.
///
/// `Default` gives the usual toggles but empty classification sets, which
/// `validate` rejects; callers always supply their own buy and sell values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// Round each per-lot gain to 2 decimals before accumulation.
    pub round_gains: bool,
    /// Explicit date parse pattern; auto-detection when absent.
    pub input_date_format: Option<String>,
    /// Pattern applied when rendering dates in output rows.
    pub output_date_format: String,
    /// Raw type-column values that classify a transaction as a buy.
    pub buy_values: Vec<String>,
    /// Raw type-column values that classify a transaction as a sell.
    pub sell_values: Vec<String>,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            round_gains: true,
            input_date_format: None,
            output_date_format: "%Y-%m-%d".to_string(),
            buy_values: Vec::new(),
            sell_values: Vec::new(),
        }
    }
}

impl CalcConfig {
    /// Classify a raw type value against the configured value sets. A value
    /// in both sets counts as a buy; a value in neither is inert.
    pub fn classify(&self, raw: &str) -> TxKind {
        if self.buy_values.iter().any(|v| v == raw) {
            TxKind::Buy
        } else if self.sell_values.iter().any(|v| v == raw) {
            TxKind::Sell
        } else {
            TxKind::Other
        }
    }

    /// Reject empty classification sets and malformed date patterns up
    /// front, before any row is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buy_values.is_empty() {
            return Err(ConfigError::NoBuyValues);
        }
        if self.sell_values.is_empty() {
            return Err(ConfigError::NoSellValues);
        }
        if let Some(fmt) = &self.input_date_format {
            if !is_valid_date_format(fmt) {
                return Err(ConfigError::InvalidDateFormat(fmt.clone()));
            }
        }
        if !is_valid_date_format(&self.output_date_format) {
            return Err(ConfigError::InvalidDateFormat(
                self.output_date_format.clone(),
            ));
        }
        Ok(())
    }
}
