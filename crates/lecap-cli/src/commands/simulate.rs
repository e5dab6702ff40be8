use std::sync::Arc;

use lecap_core::dashboard::USD_LOAD_FAILED;
use lecap_core::{
    format_ars, format_date_es, format_percent, require_positive_amount, ComputedRow,
    FieldAliasSpec, HttpClient, LecapConfig, QuoteSheet, UsdQuote,
};
use serde::Serialize;
use tracing::warn;

use crate::cli::SimulateArgs;
use crate::error::CliError;
use crate::output::TextTable;

use super::table::header_warnings;
use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponseData<'a> {
    source: &'a str,
    amount: f64,
    usd: Option<&'a UsdQuote>,
    computed: &'a [ComputedRow],
}

pub async fn run(
    args: &SimulateArgs,
    config: &LecapConfig,
    http: Arc<dyn HttpClient>,
) -> Result<CommandResult, CliError> {
    let amount = require_positive_amount(&args.amount)?;
    let fetcher = config.csv_fetcher(http.clone())?;

    let mut warnings = Vec::new();
    let usd = if args.no_usd {
        None
    } else {
        match config.usd_client(http).fetch_bolsa().await {
            Ok(quote) => Some(quote.to_usd_quote()),
            Err(error) => {
                warn!(%error, "continuing without a dollar rate");
                warnings.push(format!("{USD_LOAD_FAILED} ({error})"));
                None
            }
        }
    };

    let payload = fetcher.fetch_csv().await?;
    let sheet = QuoteSheet::build(
        &payload,
        &FieldAliasSpec::default(),
        &config.range,
        amount,
        usd.as_ref().map(|quote| quote.rate),
    );
    warnings.extend(header_warnings(&sheet.header_map, sheet.computed.is_empty()));

    let data = serde_json::to_value(SimulateResponseData {
        source: &payload.source,
        amount,
        usd: usd.as_ref(),
        computed: &sheet.computed,
    })?;

    Ok(CommandResult::ok(data)
        .with_source(payload.source.clone())
        .with_warnings(warnings)
        .with_table(computed_table(&sheet.computed)))
}

fn computed_table(rows: &[ComputedRow]) -> TextTable {
    let mut table = TextTable::new([
        "Código",
        "Px",
        "Pago final",
        "TNA",
        "Días",
        "Vencimiento",
        "Final estimado",
        "Breakeven USD",
    ]);

    for row in rows {
        table.push_row(vec![
            row.codigo.clone(),
            format_ars(row.px),
            format_ars(row.pago_final),
            format_percent(row.tna_pct, 2),
            row.dias.map(|dias| dias.to_string()).unwrap_or_else(|| String::from("—")),
            format_date_es(row.venc.as_deref()),
            format_ars(row.final_estimado),
            format_ars(row.breakeven_usd),
        ]);
    }
    table
}
