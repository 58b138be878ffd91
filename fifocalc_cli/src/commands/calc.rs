use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use fifocalc_lib::{compute, read_csv_path, CalcConfig, ColumnMapping, Profile};

use crate::output::{
    print_json, print_report_csv, print_report_markdown, print_report_table, OutputFormat,
};

#[derive(Args)]
pub struct CalcArgs {
    /// Transaction file to read (CSV)
    pub file: PathBuf,

    /// Settings profile (TOML) naming columns and options
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Header name of the transaction date column
    #[arg(long)]
    pub date_col: Option<String>,

    /// Header name of the transaction type column
    #[arg(long)]
    pub type_col: Option<String>,

    /// Header name of the quantity column
    #[arg(long)]
    pub qty_col: Option<String>,

    /// Header name of the unit price column
    #[arg(long)]
    pub price_col: Option<String>,

    /// Header name of the identifier column
    #[arg(long)]
    pub id_col: Option<String>,

    /// Header name of the currency column
    #[arg(long)]
    pub currency_col: Option<String>,

    /// Extra column carried through to the output; repeatable
    #[arg(long)]
    pub extra_col: Vec<String>,

    /// Type value that counts as a buy; repeatable
    #[arg(long)]
    pub buy: Vec<String>,

    /// Type value that counts as a sell; repeatable
    #[arg(long)]
    pub sell: Vec<String>,

    /// Keep full-precision gains instead of rounding each lot to cents
    #[arg(long)]
    pub no_round: bool,

    /// Parse pattern for input dates, e.g. %d/%m/%Y; auto-detected when absent
    #[arg(long)]
    pub input_date_format: Option<String>,

    /// Render pattern for output dates
    #[arg(long)]
    pub output_date_format: Option<String>,
}

pub fn run(args: &CalcArgs, format: &OutputFormat) -> Result<()> {
    let profile = match &args.profile {
        Some(path) => Some(Profile::from_path(path)?),
        None => None,
    };

    let mapping = build_mapping(args, profile.as_ref())?;
    let config = build_config(args, profile.as_ref());

    let table = read_csv_path(&args.file)?;
    let outcome = compute(&table, &mapping, &config)?;

    if !outcome.skipped.is_empty() {
        eprintln!("Skipped {} row(s):", outcome.skipped.len());
        for skip in &outcome.skipped {
            eprintln!("  {}", skip);
        }
    }
    if outcome.report.is_empty() {
        eprintln!("No sells matched; the report is empty.");
    }

    match format {
        OutputFormat::Table => print_report_table(&outcome.report),
        OutputFormat::Json => print_json(&outcome.report.records()),
        OutputFormat::Csv => print_report_csv(&outcome.report)?,
        OutputFormat::Markdown => print_report_markdown(&outcome.report),
    }

    Ok(())
}

fn pick(flag: &Option<String>, fallback: Option<&String>) -> Option<String> {
    flag.clone().or_else(|| fallback.cloned())
}

/// Merge column flags over the profile's mapping. Every required column must
/// come from one of the two.
fn build_mapping(args: &CalcArgs, profile: Option<&Profile>) -> Result<ColumnMapping> {
    let cols = profile.map(|p| &p.columns);

    let Some(date) = pick(&args.date_col, cols.map(|c| &c.date)) else {
        bail!("No date column named; pass --date-col or use a profile");
    };
    let Some(kind) = pick(&args.type_col, cols.map(|c| &c.kind)) else {
        bail!("No type column named; pass --type-col or use a profile");
    };
    let Some(quantity) = pick(&args.qty_col, cols.map(|c| &c.quantity)) else {
        bail!("No quantity column named; pass --qty-col or use a profile");
    };
    let Some(price) = pick(&args.price_col, cols.map(|c| &c.price)) else {
        bail!("No price column named; pass --price-col or use a profile");
    };
    let Some(identifier) = pick(&args.id_col, cols.map(|c| &c.identifier)) else {
        bail!("No identifier column named; pass --id-col or use a profile");
    };

    let currency = pick(&args.currency_col, cols.and_then(|c| c.currency.as_ref()));
    let extra = if args.extra_col.is_empty() {
        cols.map(|c| c.extra.clone()).unwrap_or_default()
    } else {
        args.extra_col.clone()
    };

    Ok(ColumnMapping {
        date,
        kind,
        quantity,
        price,
        identifier,
        currency,
        extra,
    })
}

/// Merge option flags over the profile's settings. Unset flags leave the
/// profile value alone; no profile means library defaults.
fn build_config(args: &CalcArgs, profile: Option<&Profile>) -> CalcConfig {
    let mut config = profile.map(|p| p.settings.clone()).unwrap_or_default();

    if !args.buy.is_empty() {
        config.buy_values = args.buy.clone();
    }
    if !args.sell.is_empty() {
        config.sell_values = args.sell.clone();
    }
    if args.no_round {
        config.round_gains = false;
    }
    if let Some(fmt) = &args.input_date_format {
        config.input_date_format = Some(fmt.clone());
    }
    if let Some(fmt) = &args.output_date_format {
        config.output_date_format = fmt.clone();
    }

    config
}
