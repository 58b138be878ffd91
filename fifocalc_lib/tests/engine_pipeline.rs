use fifocalc_lib::{
    compute, read_csv, CalcConfig, CalcError, CalcOutcome, ColumnMapping, SchemaError, SkipReason,
    SkippedRow, UNSPECIFIED_CURRENCY,
};
use serde_json::json;

const EPSILON: f64 = 1e-9;

const FIXTURE: &str = include_str!("fixtures/trades.csv");

fn fixture_mapping() -> ColumnMapping {
    ColumnMapping {
        date: "Trade Date".to_string(),
        kind: "Action".to_string(),
        quantity: "Shares".to_string(),
        price: "Price per Share".to_string(),
        identifier: "Symbol".to_string(),
        currency: Some("Currency".to_string()),
        extra: vec!["Description".to_string()],
    }
}

fn fixture_config() -> CalcConfig {
    CalcConfig {
        buy_values: vec!["BUY".to_string()],
        sell_values: vec!["SELL".to_string()],
        ..Default::default()
    }
}

fn run_fixture() -> CalcOutcome {
    let table = read_csv(FIXTURE.as_bytes()).unwrap();
    compute(&table, &fixture_mapping(), &fixture_config()).unwrap()
}

fn run_csv(csv: &str, mapping: &ColumnMapping, config: &CalcConfig) -> CalcOutcome {
    let table = read_csv(csv.as_bytes()).unwrap();
    compute(&table, mapping, config).unwrap()
}

fn plain_mapping() -> ColumnMapping {
    ColumnMapping {
        date: "Date".to_string(),
        kind: "Type".to_string(),
        quantity: "Qty".to_string(),
        price: "Price".to_string(),
        identifier: "Ticker".to_string(),
        currency: None,
        extra: Vec::new(),
    }
}

// ============================================================================
// Full Pipeline Tests - CSV bytes in, matched sales and report rows out
// ============================================================================

#[test]
fn fixture_sales_in_group_then_date_order() {
    let outcome = run_fixture();

    assert_eq!(outcome.sales.len(), 4);

    // AAPL/USD sells come first (earliest first-seen group), dated before undated.
    let first = &outcome.sales[0];
    assert_eq!(first.identifier, "AAPL");
    assert_eq!(first.currency, "USD");
    assert!(first.date.is_some());
    assert_eq!(first.sale_quantity, 12.0);
    assert_eq!(first.lots.len(), 2);
    assert_eq!(first.lots[0].used_quantity, 10.0);
    assert_eq!(first.lots[0].cost_basis, Some(5.0));
    assert_eq!(first.lots[0].gain, Some(30.0));
    assert_eq!(first.lots[1].used_quantity, 2.0);
    assert_eq!(first.lots[1].cost_basis, Some(6.0));
    assert_eq!(first.lots[1].gain, Some(4.0));
    assert!((first.total_gain - 34.0).abs() < EPSILON);

    // The undated AAPL sell sorts last within its group and still consumes
    // what the dated sells left behind.
    let second = &outcome.sales[1];
    assert_eq!(second.identifier, "AAPL");
    assert_eq!(second.date, None);
    assert_eq!(second.lots.len(), 1);
    assert_eq!(second.lots[0].cost_basis, Some(6.0));
    assert!((second.total_gain - 3.0).abs() < EPSILON);

    let third = &outcome.sales[2];
    assert_eq!(third.identifier, "MSFT");
    assert_eq!(third.sale_quantity, 250.0);
    assert!((third.total_gain - 625.0).abs() < EPSILON);

    let fourth = &outcome.sales[3];
    assert_eq!(fourth.identifier, "VOD");
    assert_eq!(fourth.currency, "GBP");
    assert!((fourth.total_gain - 12.0).abs() < EPSILON);
}

#[test]
fn fixture_comma_grouped_quantity_parsed() {
    let outcome = run_fixture();

    // The MSFT buy carries a quoted "1,000" share count; 250 of it sells.
    let msft = &outcome.sales[2];
    assert_eq!(msft.lots.len(), 1);
    assert_eq!(msft.lots[0].used_quantity, 250.0);
    assert_eq!(msft.lots[0].cost_basis, Some(30.0));
}

#[test]
fn fixture_report_layout_and_literals() {
    let outcome = run_fixture();
    let report = &outcome.report;

    assert_eq!(
        report.columns,
        vec![
            "Identifier",
            "Buy Date",
            "Buy Price",
            "Sell Date",
            "Sell Price",
            "Sell Qty",
            "Used Qty",
            "Gain/Loss",
            "Currency",
            "Description",
        ]
    );
    assert_eq!(report.len(), 5);

    assert_eq!(
        report.rows[0],
        vec![
            json!("AAPL"),
            json!("2024-01-02"),
            json!(5.0),
            json!("2024-01-09"),
            json!(8.0),
            json!(12.0),
            json!(10.0),
            json!(30.0),
            json!("USD"),
            json!("Apple Inc."),
        ]
    );
    assert_eq!(report.rows[1][1], json!("2024-01-05"));
    assert_eq!(report.rows[1][6], json!(2.0));

    // Unparsable sale date renders as the literal, not a blank.
    assert_eq!(report.rows[2][3], json!("Invalid Date"));
    assert_eq!(report.rows[2][7], json!(3.0));

    assert_eq!(report.rows[3][0], json!("MSFT"));
    assert_eq!(report.rows[4][8], json!("GBP"));
    assert_eq!(report.rows[4][9], json!("Vodafone Group"));
}

#[test]
fn fixture_skips_reported_in_row_order() {
    let outcome = run_fixture();

    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].row, 8);
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::MissingValue {
            column: "Trade Date".to_string(),
        }
    );
    assert_eq!(outcome.skipped[1].row, 11);
    assert_eq!(
        outcome.skipped[1].reason,
        SkipReason::BadNumber {
            column: "Shares".to_string(),
            raw: "abc".to_string(),
        }
    );
}

#[test]
fn fixture_unclassified_action_moves_nothing() {
    let outcome = run_fixture();

    // The DIVIDEND row is neither dropped nor matched; MSFT still sells 250
    // of its single open lot and no extra sale appears.
    assert_eq!(outcome.skipped.len(), 2);
    let msft_sales: Vec<_> = outcome
        .sales
        .iter()
        .filter(|s| s.identifier == "MSFT")
        .collect();
    assert_eq!(msft_sales.len(), 1);
}

#[test]
fn compute_is_repeatable() {
    let table = read_csv(FIXTURE.as_bytes()).unwrap();
    let mapping = fixture_mapping();
    let config = fixture_config();

    let once = compute(&table, &mapping, &config).unwrap();
    let twice = compute(&table, &mapping, &config).unwrap();

    assert_eq!(once.sales, twice.sales);
    assert_eq!(once.report, twice.report);
    assert_eq!(once.skipped, twice.skipped);
}

// ============================================================================
// Grouping Tests - identifier and currency partition the lot queues
// ============================================================================

#[test]
fn same_identifier_different_currency_kept_apart() {
    let csv = "\
Ticker,Date,Type,Qty,Price,Ccy
X,2024-01-01,BUY,5,10.00,USD
X,2024-01-02,SELL,3,12.00,EUR
X,2024-01-03,SELL,2,15.00,USD
";
    let mut mapping = plain_mapping();
    mapping.currency = Some("Ccy".to_string());

    let outcome = run_csv(csv, &mapping, &fixture_config());

    assert_eq!(outcome.sales.len(), 2);

    // USD group was seen first, so its sale leads even though the EUR sale
    // is earlier in time.
    let usd = &outcome.sales[0];
    assert_eq!(usd.currency, "USD");
    assert_eq!(usd.lots[0].cost_basis, Some(10.0));
    assert!((usd.total_gain - 10.0).abs() < EPSILON);

    // The EUR sell finds no EUR lots and reports an unknown origin.
    let eur = &outcome.sales[1];
    assert_eq!(eur.currency, "EUR");
    assert_eq!(eur.lots.len(), 1);
    assert_eq!(eur.lots[0].cost_basis, None);
    assert_eq!(eur.lots[0].gain, None);
    assert!((eur.total_gain - 0.0).abs() < EPSILON);
}

#[test]
fn unmapped_currency_omits_column_and_uses_sentinel() {
    let csv = "\
Ticker,Date,Type,Qty,Price
X,2024-01-01,BUY,2,1.00
X,2024-01-02,SELL,2,3.00
";
    let outcome = run_csv(csv, &plain_mapping(), &fixture_config());

    assert_eq!(outcome.sales[0].currency, UNSPECIFIED_CURRENCY);
    assert_eq!(outcome.report.columns.len(), 8);
    assert!(!outcome.report.columns.iter().any(|c| c == "Currency"));
}

// ============================================================================
// Date Format Tests - explicit format beats auto-detection
// ============================================================================

#[test]
fn explicit_day_first_format_applied() {
    let csv = "\
Ticker,Date,Type,Qty,Price
X,05/06/2024,BUY,2,1.00
X,06/06/2024,SELL,2,3.00
";
    let mut config = fixture_config();
    config.input_date_format = Some("%d/%m/%Y".to_string());

    let outcome = run_csv(csv, &plain_mapping(), &config);

    // Day-first reads June 5th where auto-detection would read May 6th.
    assert_eq!(outcome.report.rows[0][1], json!("2024-06-05"));
    assert_eq!(outcome.report.rows[0][3], json!("2024-06-06"));
    assert!((outcome.sales[0].total_gain - 4.0).abs() < EPSILON);
}

// ============================================================================
// Rounding Tests - per-lot cent rounding before summing
// ============================================================================

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[test]
fn total_matches_per_lot_rounded_expectation() {
    let csv = "\
Ticker,Date,Type,Qty,Price
X,2024-01-01,BUY,3,1.111
X,2024-01-02,BUY,2,2.222
X,2024-01-03,SELL,5,3.333
";
    let outcome = run_csv(csv, &plain_mapping(), &fixture_config());

    let expected = round2(3.0 * (3.333 - 1.111)) + round2(2.0 * (3.333 - 2.222));
    let sale = &outcome.sales[0];
    assert_eq!(sale.lots.len(), 2);
    assert!((sale.lots[0].gain.unwrap() - round2(3.0 * (3.333 - 1.111))).abs() < EPSILON);
    assert!((sale.lots[1].gain.unwrap() - round2(2.0 * (3.333 - 2.222))).abs() < EPSILON);
    assert!((sale.total_gain - expected).abs() < EPSILON);
}

#[test]
fn rounding_disabled_keeps_raw_sums() {
    let csv = "\
Ticker,Date,Type,Qty,Price
X,2024-01-01,BUY,3,1.111
X,2024-01-02,BUY,2,2.222
X,2024-01-03,SELL,5,3.333
";
    let mut config = fixture_config();
    config.round_gains = false;

    let outcome = run_csv(csv, &plain_mapping(), &config);

    let expected = 3.0 * (3.333 - 1.111) + 2.0 * (3.333 - 2.222);
    let sale = &outcome.sales[0];
    assert!((sale.lots[0].gain.unwrap() - 3.0 * (3.333 - 1.111)).abs() < EPSILON);
    assert!((sale.total_gain - expected).abs() < EPSILON);
}

// ============================================================================
// Non-finite Input Tests - "nan" and "inf" cells drop like any bad number
// ============================================================================

#[test]
fn nan_quantity_never_becomes_an_open_lot() {
    let csv = "\
Ticker,Date,Type,Qty,Price
X,2024-01-01,BUY,nan,5.00
X,2024-01-02,BUY,10,7.00
X,2024-01-03,SELL,4,8.00
";
    let outcome = run_csv(csv, &plain_mapping(), &fixture_config());

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(
        outcome.skipped[0],
        SkippedRow {
            row: 1,
            reason: SkipReason::BadNumber {
                column: "Qty".to_string(),
                raw: "nan".to_string(),
            },
        }
    );

    // The sell draws on the surviving 10 @ 7 lot, nothing else.
    let sale = &outcome.sales[0];
    assert_eq!(sale.lots.len(), 1);
    assert_eq!(sale.lots[0].cost_basis, Some(7.0));
    assert!((sale.total_gain - 4.0).abs() < EPSILON);
}

#[test]
fn nan_price_never_reaches_gain_arithmetic() {
    let csv = "\
Ticker,Date,Type,Qty,Price
X,2024-01-01,BUY,4,nan
X,2024-01-02,SELL,4,8.00
";
    let outcome = run_csv(csv, &plain_mapping(), &fixture_config());

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::BadNumber {
            column: "Price".to_string(),
            raw: "nan".to_string(),
        }
    );

    // With the buy dropped the sell has unknown origin, not a poisoned gain.
    let sale = &outcome.sales[0];
    assert_eq!(sale.lots.len(), 1);
    assert_eq!(sale.lots[0].cost_basis, None);
    assert_eq!(sale.lots[0].gain, None);
    assert!((sale.total_gain - 0.0).abs() < EPSILON);
    assert_eq!(outcome.report.rows[0][7], json!("Unknown"));
}

// ============================================================================
// Failure Tests - schema and configuration problems abort the run
// ============================================================================

#[test]
fn misspelled_mapping_suggests_header() {
    let table = read_csv(FIXTURE.as_bytes()).unwrap();
    let mut mapping = fixture_mapping();
    mapping.date = "Trade Dte".to_string();

    let err = compute(&table, &mapping, &fixture_config()).unwrap_err();
    match err {
        CalcError::Schema(SchemaError::ColumnNotFound { column, suggestion }) => {
            assert_eq!(column, "Trade Dte");
            assert_eq!(suggestion.as_deref(), Some("Trade Date"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn schema_error_message_names_the_column() {
    let table = read_csv(FIXTURE.as_bytes()).unwrap();
    let mut mapping = fixture_mapping();
    mapping.quantity = "Share Count".to_string();

    let err = compute(&table, &mapping, &fixture_config()).unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("Schema error:"), "got: {text}");
    assert!(text.contains("'Share Count'"), "got: {text}");
}

#[test]
fn empty_buy_values_rejected() {
    let table = read_csv(FIXTURE.as_bytes()).unwrap();
    let config = CalcConfig {
        buy_values: Vec::new(),
        sell_values: vec!["SELL".to_string()],
        ..Default::default()
    };

    let err = compute(&table, &fixture_mapping(), &config).unwrap_err();
    assert!(matches!(err, CalcError::Config(_)));
    assert_eq!(
        err.to_string(),
        "Configuration error: No transaction type values classify a buy"
    );
}

#[test]
fn header_only_input_rejected() {
    let csv = "Ticker,Date,Type,Qty,Price\n";
    let table = read_csv(csv.as_bytes()).unwrap();

    let err = compute(&table, &plain_mapping(), &fixture_config()).unwrap_err();
    assert!(matches!(
        err,
        CalcError::Schema(SchemaError::EmptyTable)
    ));
}
