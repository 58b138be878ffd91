use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use fifocalc_lib::{read_csv_path, RawTable};
use serde_json::{json, Value};

use crate::output::{format_cell, print_grid, print_json, OutputFormat};

#[derive(Args)]
pub struct ColumnsArgs {
    /// Transaction file to read (CSV)
    pub file: PathBuf,

    /// Show the distinct values of this column with their counts
    #[arg(long)]
    pub values_of: Option<String>,

    /// Number of sample rows to show
    #[arg(long, default_value = "5")]
    pub sample: usize,
}

pub fn run(args: &ColumnsArgs, format: &OutputFormat) -> Result<()> {
    let table = read_csv_path(&args.file)?;

    let value_counts = match &args.values_of {
        Some(name) => Some((name.clone(), count_values(&table, name)?)),
        None => None,
    };

    if matches!(format, OutputFormat::Json) {
        print_json(&json_payload(args, &table, &value_counts));
        return Ok(());
    }
    let markdown = matches!(format, OutputFormat::Markdown);

    println!(
        "{} column(s), {} data row(s)",
        table.columns.len(),
        table.rows.len()
    );
    print_grid(
        ["#", "Column"],
        table
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| vec![i.to_string(), name.clone()])
            .collect(),
        markdown,
    );

    let sample = args.sample.min(table.rows.len());
    if sample > 0 {
        println!();
        println!("First {} row(s):", sample);
        print_grid(
            table.columns.clone(),
            table.rows[..sample]
                .iter()
                .map(|row| row.iter().map(format_cell).collect())
                .collect(),
            markdown,
        );
    }

    if let Some((name, counts)) = &value_counts {
        println!();
        println!("Values in '{}':", name);
        print_grid(
            ["Value", "Count"],
            counts
                .iter()
                .map(|(value, count)| vec![value.clone(), count.to_string()])
                .collect(),
            markdown,
        );
    }

    Ok(())
}

/// Distinct cell values of one column, most frequent first, ties by value.
fn count_values(table: &RawTable, name: &str) -> Result<Vec<(String, usize)>> {
    let Some(idx) = table.columns.iter().position(|c| c == name) else {
        bail!("Column '{}' not found in input header", name);
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in &table.rows {
        let text = match row.get(idx) {
            Some(Value::Null) | None => "(empty)".to_string(),
            Some(value) => format_cell(value),
        };
        *counts.entry(text).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

fn json_payload(
    args: &ColumnsArgs,
    table: &RawTable,
    value_counts: &Option<(String, Vec<(String, usize)>)>,
) -> Value {
    let mut payload = serde_json::Map::new();
    payload.insert("file".to_string(), json!(args.file.display().to_string()));
    payload.insert("columns".to_string(), json!(table.columns));
    payload.insert("row_count".to_string(), json!(table.rows.len()));
    if let Some((name, counts)) = value_counts {
        let mut values = serde_json::Map::new();
        for (value, count) in counts {
            values.insert(value.clone(), json!(count));
        }
        payload.insert("values_of".to_string(), json!(name));
        payload.insert("values".to_string(), Value::Object(values));
    }
    Value::Object(payload)
}
