mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "fifocalc")]
#[command(about = "Compute realized gains from transaction exports, first in first out")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match sells against buys and report per-lot gains
    Calc(Box<commands::calc::CalcArgs>),
    /// Inspect the header and sample rows of a transaction file
    Columns(commands::columns::ColumnsArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fifocalc=info".parse().unwrap())
                .add_directive("fifocalc_lib=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::Calc(args) => commands::calc::run(args.as_ref(), &format)?,
        Commands::Columns(args) => commands::columns::run(args, &format)?,
    }

    Ok(())
}
