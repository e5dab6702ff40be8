//! Per-refresh state of the quotes dashboard.
//!
//! The dashboard owns the last fetched CSV, the last dollar quote and the
//! calculator input. Everything shown (header map, selected rows, quote
//! lines, calculator results) is derived on demand by [`Dashboard::view`].

use serde::Serialize;
use tracing::{info, warn};

use crate::compute::{compute_row, parse_amount, project_quote_row, ComputedRow, QuoteRow};
use crate::fetcher::{CsvFetchError, CsvFetcher, CsvPayload};
use crate::header::{FieldAliasSpec, HeaderMap};
use crate::selection::{select_rows, TickerRange};
use crate::usd::{UsdClient, UsdError, UsdQuote};

pub const TABLE_LOAD_FAILED: &str = "Could not load the quotes CSV.";
pub const USD_LOAD_FAILED: &str = "Could not fetch the bolsa dollar rate automatically.";
pub const NO_DATA: &str = "no data available";
pub const DEFAULT_AMOUNT_INPUT: &str = "100000";

/// Header map plus the selected rows projected both ways.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSheet {
    pub header_map: HeaderMap,
    pub quotes: Vec<QuoteRow>,
    pub computed: Vec<ComputedRow>,
}

impl QuoteSheet {
    pub fn build(
        payload: &CsvPayload,
        aliases: &FieldAliasSpec,
        range: &TickerRange,
        amount: f64,
        usd_rate: Option<f64>,
    ) -> Self {
        let header_map = HeaderMap::resolve(&payload.headers, aliases);
        let selected = select_rows(&payload.rows, &header_map, &payload.headers, range);

        let quotes = selected
            .iter()
            .map(|entry| project_quote_row(entry.row, &header_map, &payload.headers))
            .collect();
        let computed = selected
            .iter()
            .map(|entry| compute_row(entry.row, &header_map, &payload.headers, amount, usd_rate))
            .collect();

        Self {
            header_map,
            quotes,
            computed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum TableState {
    Ready,
    NoData,
    Failed(String),
}

/// Snapshot rendered by a front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub state: TableState,
    /// Set after a failed refresh even when older rows are still shown.
    pub table_error: Option<String>,
    pub source: Option<String>,
    pub header_map: Option<HeaderMap>,
    pub quotes: Vec<QuoteRow>,
    pub amount: f64,
    pub can_calculate: bool,
    /// Empty unless `can_calculate`.
    pub computed: Vec<ComputedRow>,
    pub usd: Option<UsdQuote>,
    pub usd_error: Option<String>,
}

#[derive(Debug)]
pub struct Dashboard {
    fetcher: CsvFetcher,
    usd_client: UsdClient,
    aliases: FieldAliasSpec,
    range: TickerRange,
    payload: Option<CsvPayload>,
    table_error: Option<String>,
    usd: Option<UsdQuote>,
    usd_error: Option<String>,
    amount_input: String,
}

impl Dashboard {
    pub fn new(fetcher: CsvFetcher, usd_client: UsdClient) -> Self {
        Self {
            fetcher,
            usd_client,
            aliases: FieldAliasSpec::default(),
            range: TickerRange::default(),
            payload: None,
            table_error: None,
            usd: None,
            usd_error: None,
            amount_input: DEFAULT_AMOUNT_INPUT.to_owned(),
        }
    }

    pub fn with_range(mut self, range: TickerRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_aliases(mut self, aliases: FieldAliasSpec) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn set_amount_input(&mut self, input: impl Into<String>) {
        self.amount_input = input.into();
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn payload(&self) -> Option<&CsvPayload> {
        self.payload.as_ref()
    }

    pub async fn refresh_table(&mut self) {
        let result = self.fetcher.fetch_csv().await;
        self.apply_table(result);
    }

    pub async fn refresh_usd(&mut self) {
        let result = self.usd_client.fetch_bolsa().await;
        self.apply_usd(result.map(|quote| quote.to_usd_quote()));
    }

    /// Refresh both sources one after the other.
    pub async fn refresh_all(&mut self) {
        self.refresh_table().await;
        self.refresh_usd().await;
    }

    /// Record a table refresh. A failure keeps the previous rows.
    pub fn apply_table(&mut self, result: Result<CsvPayload, CsvFetchError>) {
        match result {
            Ok(payload) => {
                info!(source = %payload.source, rows = payload.rows.len(), "quotes table refreshed");
                self.payload = Some(payload);
                self.table_error = None;
            }
            Err(error) => {
                warn!(%error, "quotes table refresh failed");
                self.table_error = Some(TABLE_LOAD_FAILED.to_owned());
            }
        }
    }

    /// Record a dollar refresh. A failure clears the previous rate.
    pub fn apply_usd(&mut self, result: Result<UsdQuote, UsdError>) {
        match result {
            Ok(quote) => {
                self.usd = Some(quote);
                self.usd_error = None;
            }
            Err(error) => {
                warn!(%error, "bolsa dollar refresh failed");
                self.usd = None;
                self.usd_error = Some(USD_LOAD_FAILED.to_owned());
            }
        }
    }

    pub fn view(&self) -> DashboardView {
        let amount = parse_amount(&self.amount_input);
        let usd_rate = self.usd.as_ref().map(|quote| quote.rate);

        let Some(payload) = &self.payload else {
            let state = match &self.table_error {
                Some(message) => TableState::Failed(message.clone()),
                None => TableState::NoData,
            };
            return DashboardView {
                state,
                table_error: self.table_error.clone(),
                source: None,
                header_map: None,
                quotes: Vec::new(),
                amount,
                can_calculate: false,
                computed: Vec::new(),
                usd: self.usd.clone(),
                usd_error: self.usd_error.clone(),
            };
        };

        let sheet = QuoteSheet::build(payload, &self.aliases, &self.range, amount, usd_rate);
        let can_calculate = amount > 0.0 && !sheet.quotes.is_empty();
        let state = if sheet.quotes.is_empty() {
            TableState::NoData
        } else {
            TableState::Ready
        };

        DashboardView {
            state,
            table_error: self.table_error.clone(),
            source: Some(payload.source.clone()),
            header_map: Some(sheet.header_map),
            quotes: sheet.quotes,
            amount,
            can_calculate,
            computed: if can_calculate { sheet.computed } else { Vec::new() },
            usd: self.usd.clone(),
            usd_error: self.usd_error.clone(),
        }
    }
}
