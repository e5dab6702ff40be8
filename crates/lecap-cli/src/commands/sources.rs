use lecap_core::LecapConfig;
use serde::Serialize;

use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceEntry {
    label: String,
    url: String,
    proxy_label: String,
    proxy_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourcesResponseData {
    candidates: Vec<SourceEntry>,
    relay: String,
    usd_api_url: String,
    timeout_ms: u64,
}

/// Direct candidates in try order; each is retried through the relay afterwards.
pub fn run(config: &LecapConfig) -> Result<CommandResult, CliError> {
    let candidates: Vec<SourceEntry> = config
        .candidates
        .iter()
        .map(|candidate| SourceEntry {
            label: candidate.label.clone(),
            url: candidate.url.clone(),
            proxy_label: candidate.proxy_label(),
            proxy_url: config.relay.proxify(&candidate.url),
        })
        .collect();

    let mut table = TextTable::new(["Label", "URL"]);
    for entry in &candidates {
        table.push_row(vec![entry.label.clone(), entry.url.clone()]);
    }
    for entry in &candidates {
        table.push_row(vec![entry.proxy_label.clone(), entry.proxy_url.clone()]);
    }

    let mut result = CommandResult::ok(serde_json::to_value(SourcesResponseData {
        candidates,
        relay: config.relay.template().to_owned(),
        usd_api_url: config.usd_api_url.clone(),
        timeout_ms: config.timeout_ms,
    })?)
    .with_table(table);

    if config.candidates.is_empty() {
        result = result.with_warning(
            "no CSV candidate configured; set LECAP_SHEET_GVIZ_URL or LECAP_SHEET_EXPORT_URL",
        );
    }
    Ok(result)
}
