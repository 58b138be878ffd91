//! The calculation pipeline.

use tracing::debug;

use crate::config::CalcConfig;
use crate::error::CalcError;
use crate::grouping::{partition_groups, sort_by_date};
use crate::matcher::{match_group, SaleResult};
use crate::report::{build_report, Report};
use crate::table::{extract_transactions, ColumnMapping, RawTable, SkippedRow};

/// Everything one finished run produces.
#[derive(Debug, Clone)]
pub struct CalcOutcome {
    /// Per-sale results with their matched-lot breakdowns.
    pub sales: Vec<SaleResult>,
    /// The flattened output rows.
    pub report: Report,
    /// Rows dropped during extraction, with reasons.
    pub skipped: Vec<SkippedRow>,
}

/// Run the whole pipeline over one input table.
///
/// Strictly forward and single pass per group: resolve the mapping, validate
/// the options, extract rows, sort by date, partition by (identifier,
/// currency), match each group, flatten. Pure in the sense that nothing
/// survives the call; running it twice on the same input gives identical
/// outcomes.
pub fn compute(
    table: &RawTable,
    mapping: &ColumnMapping,
    config: &CalcConfig,
) -> Result<CalcOutcome, CalcError> {
    let plan = mapping.resolve(table)?;
    config.validate()?;

    let (mut transactions, skipped) = extract_transactions(table, &plan, config);
    if !skipped.is_empty() {
        debug!(
            "dropped {} of {} row(s) during extraction",
            skipped.len(),
            table.rows.len()
        );
    }

    sort_by_date(&mut transactions);
    let groups = partition_groups(transactions);
    debug!("matching {} group(s)", groups.len());

    let mut sales: Vec<SaleResult> = Vec::new();
    for group in &groups {
        sales.extend(match_group(&group.transactions, config.round_gains));
    }

    let report = build_report(&sales, mapping, config);
    Ok(CalcOutcome {
        sales,
        report,
        skipped,
    })
}
