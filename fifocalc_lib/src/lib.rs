//! FIFO realized gain/loss calculator.
//!
//! Matches sell transactions against earlier buys of the same instrument and
//! currency, first-in-first-out, and reports per-lot gains. Input arrives as
//! a loose table (CSV or built in memory) plus a column mapping; output is a
//! flat report with one row per matched lot.

pub mod config;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod ingest;
pub mod matcher;
pub mod normalize;
pub mod profile;
pub mod report;
pub mod table;
pub mod transaction;

pub use config::{CalcConfig, ConfigError};
pub use engine::{compute, CalcOutcome};
pub use error::CalcError;
pub use ingest::{read_csv, read_csv_path, FileLoadError};
pub use matcher::{MatchedLot, OpenLot, SaleResult};
pub use profile::{Profile, ProfileError};
pub use report::{Report, INVALID_DATE, UNKNOWN};
pub use table::{ColumnMapping, RawTable, SchemaError, SkipReason, SkippedRow};
pub use transaction::{Transaction, TxKind, UNSPECIFIED_CURRENCY};
