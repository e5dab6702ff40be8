use axum::extract::{Query, State};
use axum::Json;
use lecap_core::dashboard::USD_LOAD_FAILED;
use lecap_core::{
    parse_amount, BolsaQuote, ComputedRow, CsvPayload, HeaderMap, QuoteRow, QuoteSheet,
    TickerRange, UsdQuote,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_lecap(State(state): State<AppState>) -> Result<Json<CsvPayload>, ApiError> {
    let payload = state.fetcher.fetch_csv().await?;
    Ok(Json(payload))
}

pub async fn get_usd(State(state): State<AppState>) -> Result<Json<BolsaQuote>, ApiError> {
    let quote = state.usd_client.fetch_bolsa().await?;
    Ok(Json(quote))
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotesQuery {
    #[serde(default)]
    amount: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesResponse {
    source: String,
    fetched_url: String,
    header_map: HeaderMap,
    range: TickerRange,
    amount: f64,
    quotes: Vec<QuoteRow>,
    computed: Vec<ComputedRow>,
    usd: Option<UsdQuote>,
    usd_error: Option<String>,
}

/// Quote table plus calculator results for `amount`.
///
/// A dollar failure degrades to `usd: null`; a CSV failure fails the request.
pub async fn get_quotes(
    State(state): State<AppState>,
    Query(q): Query<QuotesQuery>,
) -> Result<Json<QuotesResponse>, ApiError> {
    let payload = state.fetcher.fetch_csv().await?;

    let (usd, usd_error) = match state.usd_client.fetch_bolsa().await {
        Ok(quote) => (Some(quote.to_usd_quote()), None),
        Err(error) => {
            warn!(%error, "quotes served without a dollar rate");
            (None, Some(USD_LOAD_FAILED.to_owned()))
        }
    };

    let amount = q.amount.as_deref().map(parse_amount).unwrap_or(0.0);
    let sheet = QuoteSheet::build(
        &payload,
        &state.aliases,
        &state.range,
        amount,
        usd.as_ref().map(|quote| quote.rate),
    );

    // Empty unless the amount is positive.
    let computed = if amount > 0.0 { sheet.computed } else { Vec::new() };

    Ok(Json(QuotesResponse {
        source: payload.source,
        fetched_url: payload.fetched_url,
        header_map: sheet.header_map,
        range: state.range.clone(),
        amount,
        quotes: sheet.quotes,
        computed,
        usd,
        usd_error,
    }))
}
