use std::sync::Arc;

use lecap_core::dashboard::NO_DATA;
use lecap_core::{
    format_ars, format_date_es, format_dias_meses, format_percent, FieldAliasSpec, HeaderMap,
    HttpClient, LecapConfig, QuoteRow, QuoteSheet, TickerRange,
};
use serde::Serialize;

use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TableResponseData<'a> {
    source: &'a str,
    fetched_url: &'a str,
    range: &'a TickerRange,
    header_map: &'a HeaderMap,
    quotes: &'a [QuoteRow],
}

pub async fn run(config: &LecapConfig, http: Arc<dyn HttpClient>) -> Result<CommandResult, CliError> {
    let payload = config.csv_fetcher(http)?.fetch_csv().await?;
    let sheet = QuoteSheet::build(&payload, &FieldAliasSpec::default(), &config.range, 0.0, None);

    let data = serde_json::to_value(TableResponseData {
        source: &payload.source,
        fetched_url: &payload.fetched_url,
        range: &config.range,
        header_map: &sheet.header_map,
        quotes: &sheet.quotes,
    })?;

    Ok(CommandResult::ok(data)
        .with_source(payload.source.clone())
        .with_warnings(header_warnings(&sheet.header_map, sheet.quotes.is_empty()))
        .with_table(quote_table(&sheet.quotes)))
}

/// Unmatched columns, plus an empty-selection notice.
pub(super) fn header_warnings(header_map: &HeaderMap, empty: bool) -> Vec<String> {
    let mut warnings: Vec<String> = header_map
        .missing()
        .into_iter()
        .map(|field| format!("no column matched field '{}'", field.as_str()))
        .collect();
    if empty {
        warnings.push(NO_DATA.to_owned());
    }
    warnings
}

fn quote_table(quotes: &[QuoteRow]) -> TextTable {
    let mut table = TextTable::new([
        "Ticker",
        "Vencimiento",
        "Liquidación",
        "Plazo",
        "Px",
        "Pago final",
        "TNA",
        "TEM",
        "TEA",
    ]);

    for quote in quotes {
        table.push_row(vec![
            quote.ticker.clone().unwrap_or_default(),
            format_date_es(quote.fecha_venc.as_deref()),
            quote.liqui_secu.clone().unwrap_or_else(|| "—".into()),
            format_dias_meses(quote.dias, quote.meses),
            format_ars(quote.px),
            format_ars(quote.pago_final),
            format_percent(quote.tna, 2),
            format_percent(quote.tem, 2),
            format_percent(quote.tea, 2),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use lecap_core::Field;

    use super::*;

    #[test]
    fn quote_lines_use_display_formats() {
        let table = quote_table(&[QuoteRow {
            ticker: Some(String::from("S15G5")),
            fecha_venc: Some(String::from("15/08/2025")),
            liqui_secu: None,
            dias: Some(45.0),
            meses: None,
            px: Some(101.5),
            pago_final: Some(104.0),
            tna: Some(0.385),
            tem: None,
            tea: None,
        }]);

        let lines = table.lines();
        assert!(lines[2].starts_with("S15G5"));
        assert!(lines[2].contains("15/8/2025"));
        assert!(lines[2].contains("$ 101,50"));
        assert!(lines[2].contains("38.50%"));
    }

    #[test]
    fn liquidity_cell_is_shown_as_written() {
        let quote = |liqui_secu: Option<&str>| QuoteRow {
            ticker: Some(String::from("S30S5")),
            fecha_venc: Some(String::from("30/09/2025")),
            liqui_secu: liqui_secu.map(str::to_owned),
            dias: None,
            meses: None,
            px: None,
            pago_final: None,
            tna: None,
            tem: None,
            tea: None,
        };

        let table = quote_table(&[quote(Some("01/08/2025")), quote(None)]);

        let lines = table.lines();
        let column = lines[0].find("Liquidación").expect("liquidity header");
        assert!(lines[2][column..].starts_with("01/08/2025"));
        assert!(lines[3][column..].starts_with('—'));
    }

    #[test]
    fn missing_columns_become_warnings() {
        let header_map = HeaderMap {
            ticker: Some(String::from("Ticker")),
            ..HeaderMap::default()
        };

        let warnings = header_warnings(&header_map, true);
        assert!(warnings.contains(&format!("no column matched field '{}'", Field::Px.as_str())));
        assert!(!warnings.iter().any(|warning| warning.contains("'ticker'")));
        assert_eq!(warnings.last().map(String::as_str), Some(NO_DATA));
    }
}
