mod fetch;
mod simulate;
mod sources;
mod table;
mod usd;

use std::env;
use std::sync::Arc;
use std::time::Instant;

use lecap_core::{HttpClient, LecapConfig, ReqwestHttpClient};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{Report, TextTable};

pub struct CommandResult {
    pub data: Value,
    pub source: Option<String>,
    pub warnings: Vec<String>,
    pub table: Option<TextTable>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            source: None,
            warnings: Vec::new(),
            table: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_table(mut self, table: TextTable) -> Self {
        self.table = Some(table);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let config = load_config(cli, |name| env::var(name).ok())?;
    debug!(
        candidates = config.candidates.len(),
        timeout_ms = config.timeout_ms,
        "configuration loaded"
    );

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let started = Instant::now();

    let command_result = match &cli.command {
        Command::Fetch => fetch::run(&config, http).await?,
        Command::Table => table::run(&config, http).await?,
        Command::Simulate(args) => simulate::run(args, &config, http).await?,
        Command::Usd => usd::run(&config, http).await?,
        Command::Sources => sources::run(&config)?,
    };

    let CommandResult {
        data,
        source,
        warnings,
        table,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = Metadata::new(source, latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Report { meta, data, table })
}

/// Environment configuration with command-line flags taking precedence.
fn load_config<F>(cli: &Cli, env_lookup: F) -> Result<LecapConfig, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides: Vec<(&str, String)> = [
        ("LECAP_SHEET_GVIZ_URL", cli.gviz_url.clone()),
        ("LECAP_SHEET_EXPORT_URL", cli.export_url.clone()),
        ("LECAP_DOLAR_API_URL", cli.usd_url.clone()),
        ("LECAP_TIMEOUT_MS", cli.timeout_ms.map(|ms| ms.to_string())),
        ("LECAP_RANGE_START", cli.start.clone()),
        ("LECAP_RANGE_END", cli.end.clone()),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|value| (name, value)))
    .collect();

    let config = LecapConfig::from_lookup(|name| {
        overrides
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
            .or_else(|| env_lookup(name))
    })?;
    Ok(config)
}
