//! CLI subcommand implementations.

pub mod calc;
pub mod columns;
