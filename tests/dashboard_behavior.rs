//! Behavior-driven tests for the dashboard refresh cycle
//!
//! These tests verify what a user sees across refreshes: the no-data state,
//! errors next to previously loaded rows, and the calculator gating.

use std::sync::Arc;

use lecap_core::dashboard::{TABLE_LOAD_FAILED, USD_LOAD_FAILED};
use lecap_core::{
    CsvCandidate, CsvFetcher, Dashboard, HttpError, HttpResponse, ScriptedHttpClient, TableState,
    TickerRange, UsdClient,
};

const SHEET: &str = "https://docs.test/sheet/export?format=csv";
const RATES: &str = "https://rates.test/v1/dolares";
const CSV_BODY: &str = "Ticker,Vencimiento,Px,Pago Final,TNA\n\
S31L5,31/07/2025,99.5,101,35%\n\
S15G5,15/08/2025,98,103,37%\n\
S30S5,30/09/2025,94,107,38%\n\
T15E7,15/01/2027,70,130,36%\n";
const RATES_BODY: &str = r#"[{"moneda":"USD","casa":"bolsa","nombre":"Bolsa","compra":1180,"venta":1200,"fechaActualizacion":"2025-08-01T15:00:00.000Z"}]"#;

fn dashboard(http: &ScriptedHttpClient) -> Dashboard {
    let http = Arc::new(http.clone());
    let fetcher = CsvFetcher::new(
        http.clone(),
        vec![CsvCandidate::new(SHEET, "export").expect("valid candidate")],
    )
    .expect("candidates configured");
    Dashboard::new(fetcher, UsdClient::new(http, RATES))
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn when_both_sources_answer_dashboard_shows_selected_rows_and_results() {
    // Given: Sheet and rate API both answer
    let http = ScriptedHttpClient::new()
        .respond(SHEET, Ok(HttpResponse::ok(CSV_BODY)))
        .respond(RATES, Ok(HttpResponse::ok(RATES_BODY)));
    let mut dashboard = dashboard(&http);

    // When: Everything is refreshed with the default amount
    dashboard.refresh_all().await;
    let view = dashboard.view();

    // Then: The default range is shown and the calculator runs
    assert_eq!(view.state, TableState::Ready);
    assert_eq!(view.source.as_deref(), Some("export"));
    let codes: Vec<Option<&str>> = view.quotes.iter().map(|q| q.ticker.as_deref()).collect();
    assert_eq!(codes, [Some("S15G5"), Some("S30S5"), Some("T15E7")]);
    assert!(view.can_calculate);
    assert_eq!(view.amount, 100_000.0);
    assert_eq!(view.usd.as_ref().map(|usd| usd.rate), Some(1200.0));
    let breakeven = view.computed[0].breakeven_usd.expect("rate is known");
    assert!((breakeven - 1200.0 * 103.0 / 98.0).abs() < 1e-9);
}

#[tokio::test]
async fn when_sheet_is_unreachable_dashboard_reports_failure_instead_of_blank() {
    // Given: Nothing answers
    let http = ScriptedHttpClient::new();
    let mut dashboard = dashboard(&http);

    // When: The dashboard refreshes
    dashboard.refresh_all().await;
    let view = dashboard.view();

    // Then: An explicit failure state with both messages
    assert_eq!(view.state, TableState::Failed(TABLE_LOAD_FAILED.to_owned()));
    assert!(view.quotes.is_empty());
    assert!(!view.can_calculate);
    assert_eq!(view.usd_error.as_deref(), Some(USD_LOAD_FAILED));
}

// =============================================================================
// Refreshing
// =============================================================================

#[tokio::test]
async fn failed_second_refresh_keeps_rows_and_flags_error() {
    // Given: The sheet answers once, then fails
    let http = ScriptedHttpClient::new()
        .respond(SHEET, Ok(HttpResponse::ok(CSV_BODY)))
        .respond(SHEET, Ok(HttpResponse::with_status(500, "")));
    let mut dashboard = dashboard(&http);
    dashboard.refresh_table().await;

    // When: The table is refreshed again
    dashboard.refresh_table().await;
    let view = dashboard.view();

    // Then: Old rows are still shown with the error alongside
    assert_eq!(view.state, TableState::Ready);
    assert_eq!(view.quotes.len(), 3);
    assert_eq!(view.table_error.as_deref(), Some(TABLE_LOAD_FAILED));
}

#[tokio::test]
async fn successful_refresh_clears_previous_error() {
    // Given: The first refresh fails (direct and relay), the second succeeds
    let http = ScriptedHttpClient::new()
        .respond(SHEET, Err(HttpError::new("timed out")))
        .respond(SHEET, Ok(HttpResponse::ok(CSV_BODY)));
    let mut dashboard = dashboard(&http);
    dashboard.refresh_table().await;
    assert!(dashboard.view().table_error.is_some());

    // When: The table is refreshed again
    dashboard.refresh_table().await;

    // Then: The error is gone
    let view = dashboard.view();
    assert_eq!(view.table_error, None);
    assert_eq!(view.state, TableState::Ready);
}

// =============================================================================
// Calculator
// =============================================================================

#[tokio::test]
async fn calculator_follows_typed_amount() {
    // Given: A loaded table without a dollar rate
    let http = ScriptedHttpClient::new().respond(SHEET, Ok(HttpResponse::ok(CSV_BODY)));
    let mut dashboard = dashboard(&http).with_range(TickerRange::parse("S31L5", "S15G5").expect("codes"));
    dashboard.refresh_table().await;

    // When: The user types an es-AR amount
    dashboard.set_amount_input("$ 1.000.000,00");
    let view = dashboard.view();

    // Then: Final capital scales with the amount and breakeven is unknown
    assert_eq!(view.amount, 1_000_000.0);
    assert_eq!(view.computed.len(), 2);
    let estimate = view.computed[1].final_estimado.expect("price is known");
    assert!((estimate - 1_000_000.0 / 98.0 * 103.0).abs() < 1e-6);
    assert_eq!(view.computed[1].breakeven_usd, None);

    // When: The input is cleared
    dashboard.set_amount_input("");

    // Then: The calculator is disabled while the table stays
    let view = dashboard.view();
    assert!(!view.can_calculate);
    assert!(view.computed.is_empty());
    assert_eq!(view.quotes.len(), 2);
}
