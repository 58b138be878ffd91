//! Library-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ingest::FileLoadError;
use crate::profile::ProfileError;
use crate::table::SchemaError;

/// Any fatal calculator error, wrapping the module-level kinds.
///
/// Row-level problems are not errors here: the pipeline recovers from them
/// locally and returns them as skipped-row diagnostics beside the results.
#[derive(Debug, Error)]
pub enum CalcError {
    /// The source file could not be read or parsed.
    #[error("Input error: {0}")]
    FileLoad(#[from] FileLoadError),
    /// The table is structurally unusable or a mapped column is missing.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    /// The calculation options reject the run before it starts.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A settings profile could not be loaded.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}
