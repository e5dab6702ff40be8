//! # LECAP Core
//!
//! Acquisition, normalization and computation for Argentine LECAP
//! (short-term Treasury bill) quotes published as a hand-maintained
//! spreadsheet.
//!
//! ## Overview
//!
//! - **Two-phase CSV fetch** over ordered candidate URLs, direct then via a
//!   CORS relay, with a per-attempt failure history
//! - **Locale-tolerant numbers** (`1.234,56`, `1,234.56`, `12%`)
//! - **Fuzzy header resolution** from an alias table
//! - **Ticker extraction and range selection** (`S15G5`..`T15E7`)
//! - **Calculator**: final capital and breakeven dollar rate per bond
//! - **"Dólar bolsa" quote** from a dolarapi-compatible endpoint
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`compute`] | Quote and calculator projections of a row |
//! | [`config`] | Environment-driven configuration |
//! | [`dashboard`] | Per-refresh state and derived view |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Two-phase CSV fetcher and plausibility check |
//! | [`format`] | es-AR display helpers |
//! | [`header`] | Alias table and header resolver |
//! | [`http_client`] | HTTP client abstraction |
//! | [`numeric`] | Number parsing and rate normalization |
//! | [`selection`] | Ticker tagging and range selection |
//! | [`source`] | Candidates, relay and attempt records |
//! | [`table`] | CSV decoding into string rows |
//! | [`ticker`] | LECAP code detection |
//! | [`usd`] | Dollar quote client |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  CsvFetcher     │────▶│ HTTP Client      │
//! │ (direct, relay) │     │ (reqwest/script) │
//! └────────┬────────┘     └──────────────────┘
//!          │ CsvPayload            ▲
//!          ▼                       │
//! ┌─────────────────┐     ┌──────────────────┐
//! │ HeaderMap +     │     │ UsdClient        │
//! │ select_rows     │     └────────┬─────────┘
//! └────────┬────────┘              │ UsdQuote
//!          ▼                       ▼
//! ┌──────────────────────────────────────────┐
//! │ Dashboard / QuoteSheet (quotes, computed)│
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lecap_core::{Dashboard, LecapConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LecapConfig::from_env()?;
//!     let http = Arc::new(ReqwestHttpClient::new());
//!
//!     let mut dashboard = Dashboard::new(config.csv_fetcher(http.clone())?, config.usd_client(http))
//!         .with_range(config.range.clone());
//!     dashboard.refresh_all().await;
//!
//!     for quote in dashboard.view().quotes {
//!         println!("{:?} {:?}", quote.ticker, quote.px);
//!     }
//!     Ok(())
//! }
//! ```

pub mod compute;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod header;
pub mod http_client;
pub mod numeric;
pub mod selection;
pub mod source;
pub mod table;
pub mod ticker;
pub mod usd;

// Computation
pub use compute::{
    compute_row, parse_amount, project_quote_row, require_positive_amount, ComputedRow, QuoteRow,
};

// Configuration
pub use config::LecapConfig;

// Dashboard
pub use dashboard::{Dashboard, DashboardView, QuoteSheet, TableState};

// Error types
pub use error::{TableError, ValidationError};

// Fetching
pub use fetcher::{is_likely_csv, CsvFetchError, CsvFetcher, CsvPayload, FetchFailure};

// Display helpers
pub use format::{format_ars, format_date_es, format_dias_meses, format_percent};

// Header resolution
pub use header::{find_header, Field, FieldAliasSpec, HeaderMap};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient,
};

// Numbers
pub use numeric::{normalize_rate, parse_number, parse_number_str};

// Selection
pub use selection::{select_rows, tag_rows, RowTicker, TickerRange};

// Sources
pub use source::{CorsRelay, CsvCandidate, FetchAttempt};

// Tables
pub use table::{parse_csv, ParsedTable, RawTable, Row, RowWarning};

// Tickers
pub use ticker::{extract_ticker, is_lecap_code, LecapCode};

// Dollar quote
pub use usd::{BolsaQuote, UsdClient, UsdError, UsdQuote};
