use std::sync::Arc;

use lecap_core::{HttpClient, LecapConfig};

use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

pub async fn run(config: &LecapConfig, http: Arc<dyn HttpClient>) -> Result<CommandResult, CliError> {
    let fetcher = config.csv_fetcher(http)?;
    let payload = fetcher.fetch_csv().await?;

    let mut table = TextTable::new(payload.headers.iter().cloned());
    for row in &payload.rows {
        table.push_row(
            payload
                .headers
                .iter()
                .map(|header| row.get(header).unwrap_or_default().to_owned())
                .collect(),
        );
    }

    let mut result = CommandResult::ok(serde_json::to_value(&payload)?)
        .with_source(payload.source.clone())
        .with_table(table);
    if payload.rows.is_empty() {
        result = result.with_warning("CSV contained a header row but no data rows");
    }
    Ok(result)
}
