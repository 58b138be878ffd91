use std::io;

use anyhow::Result;
use fifocalc_lib::Report;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Table;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

// -- Cell formatting --

/// One loose cell as display text. Nulls become blanks, strings lose their
/// quotes, numbers keep their JSON form.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn report_rows(report: &Report) -> Vec<Vec<String>> {
    report
        .rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect()
}

// -- Table and markdown output --

fn grid<I, S>(header: I, rows: Vec<Vec<String>>, markdown: bool) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    }
    table
}

pub fn print_grid<I, S>(header: I, rows: Vec<Vec<String>>, markdown: bool)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    println!("{}", grid(header, rows, markdown));
}

pub fn print_report_table(report: &Report) {
    print_grid(report.columns.clone(), report_rows(report), false);
}

pub fn print_report_markdown(report: &Report) {
    print_grid(report.columns.clone(), report_rows(report), true);
}

// -- CSV output --

fn write_report_csv<W: io::Write>(report: &Report, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&report.columns)?;
    for row in report_rows(report) {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_report_csv(report: &Report) -> Result<()> {
    write_report_csv(report, io::stdout())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
