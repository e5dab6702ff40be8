use std::sync::Arc;

use lecap_core::{format_ars, format_date_es, HttpClient, LecapConfig};

use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

pub async fn run(config: &LecapConfig, http: Arc<dyn HttpClient>) -> Result<CommandResult, CliError> {
    let quote = config.usd_client(http).fetch_bolsa().await?;

    let mut table = TextTable::new(["Casa", "Compra", "Venta", "Actualizado"]);
    table.push_row(vec![
        quote.casa.clone(),
        format_ars(quote.compra),
        format_ars(Some(quote.venta)),
        format_date_es(quote.fecha_actualizacion.as_deref()),
    ]);

    Ok(CommandResult::ok(serde_json::to_value(&quote)?)
        .with_source(quote.source.clone())
        .with_table(table))
}
