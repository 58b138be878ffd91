//! Broker format profiles.
//!
//! A profile file persists one broker export's column mapping and options as
//! TOML, so a format is described once and reused across runs.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::CalcConfig;
use crate::table::ColumnMapping;

/// Problems loading a profile file.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Cannot read profile '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid profile: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk profile: a `[columns]` table naming the mapping and an optional
/// `[settings]` table with calculation options.
///
/// ```toml
/// [columns]
/// date = "Trade Date"
/// type = "Action"
/// quantity = "Shares"
/// price = "Price per Share"
/// identifier = "Symbol"
/// currency = "Currency"
/// extra = ["Description"]
///
/// [settings]
/// buy_values = ["BUY", "REINVEST"]
/// sell_values = ["SELL"]
/// input_date_format = "%m/%d/%Y"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub columns: ColumnMapping,
    #[serde(default)]
    pub settings: CalcConfig,
}

impl Profile {
    pub fn from_path(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(text)?)
    }
}
