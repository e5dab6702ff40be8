use std::env;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::fetcher::CsvFetcher;
use crate::http_client::{HttpClient, DEFAULT_TIMEOUT_MS};
use crate::selection::TickerRange;
use crate::source::{CorsRelay, CsvCandidate};
use crate::ticker::LecapCode;
use crate::usd::{UsdClient, DEFAULT_DOLAR_API_URL};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Runtime configuration shared by the CLI and the web service.
///
/// # Environment Variables
///
/// | Setting | Primary Env Var | Fallback Env Var | Default |
/// |---------|-----------------|------------------|---------|
/// | gviz candidate | `LECAP_SHEET_GVIZ_URL` | `NEXT_SHEET_GVIZ_URL` | - |
/// | export candidate | `LECAP_SHEET_EXPORT_URL` | `NEXT_SHEET_EXPORT_URL` | - |
/// | dollar API | `LECAP_DOLAR_API_URL` | `NEXT_DOLAR_API_URL` | `https://dolarapi.com/v1/dolares` |
/// | relay template | `LECAP_CORS_RELAY` | - | `https://cors.isomorphic-git.org/{url}` |
/// | timeout | `LECAP_TIMEOUT_MS` | - | `10000` |
/// | range | `LECAP_RANGE_START` / `LECAP_RANGE_END` | - | `S15G5` / `T15E7` |
/// | web bind | `LECAP_BIND` | - | `127.0.0.1:3000` |
///
/// Unset candidates are skipped. Building a [`CsvFetcher`] requires at least
/// one; the dollar client does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LecapConfig {
    pub candidates: Vec<CsvCandidate>,
    pub usd_api_url: String,
    pub relay: CorsRelay,
    pub timeout_ms: u64,
    pub range: TickerRange,
    pub bind: String,
}

impl LecapConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(|name| lookup(name)))
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut candidates = Vec::new();
        for (primary, fallback, label) in [
            ("LECAP_SHEET_GVIZ_URL", "NEXT_SHEET_GVIZ_URL", "gviz"),
            ("LECAP_SHEET_EXPORT_URL", "NEXT_SHEET_EXPORT_URL", "export"),
        ] {
            if let Some(url) = read(primary, Some(fallback)) {
                candidates.push(CsvCandidate::new(url, label)?);
            }
        }

        let relay = match read("LECAP_CORS_RELAY", None) {
            Some(template) => CorsRelay::new(template)?,
            None => CorsRelay::default(),
        };

        let timeout_ms = match read("LECAP_TIMEOUT_MS", None) {
            Some(raw) => parse_timeout("LECAP_TIMEOUT_MS", &raw)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let defaults = TickerRange::default();
        let range = TickerRange::new(
            read_code(read("LECAP_RANGE_START", None), defaults.start)?,
            read_code(read("LECAP_RANGE_END", None), defaults.end)?,
        );

        Ok(Self {
            candidates,
            usd_api_url: read("LECAP_DOLAR_API_URL", Some("NEXT_DOLAR_API_URL"))
                .unwrap_or_else(|| DEFAULT_DOLAR_API_URL.to_owned()),
            relay,
            timeout_ms,
            range,
            bind: read("LECAP_BIND", None).unwrap_or_else(|| DEFAULT_BIND.to_owned()),
        })
    }

    /// Replace the candidate list (e.g. from command-line URLs).
    pub fn with_candidates(mut self, candidates: Vec<CsvCandidate>) -> Result<Self, ValidationError> {
        if candidates.is_empty() {
            return Err(ValidationError::NoCandidates);
        }
        self.candidates = candidates;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_range(mut self, range: TickerRange) -> Self {
        self.range = range;
        self
    }

    pub fn csv_fetcher(&self, http: Arc<dyn HttpClient>) -> Result<CsvFetcher, ValidationError> {
        Ok(CsvFetcher::new(http, self.candidates.clone())?
            .with_relay(self.relay.clone())
            .with_timeout_ms(self.timeout_ms))
    }

    pub fn usd_client(&self, http: Arc<dyn HttpClient>) -> UsdClient {
        UsdClient::new(http, self.usd_api_url.clone()).with_timeout_ms(self.timeout_ms)
    }
}

fn parse_timeout(name: &'static str, raw: &str) -> Result<u64, ValidationError> {
    raw.parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| ValidationError::InvalidEnv {
            name,
            value: raw.to_owned(),
        })
}

fn read_code(value: Option<String>, default: LecapCode) -> Result<LecapCode, ValidationError> {
    match value {
        Some(raw) => LecapCode::parse(&raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn primary_names_win_over_fallbacks() {
        let config = LecapConfig::from_lookup(lookup(&[
            ("LECAP_SHEET_GVIZ_URL", "https://primary.test/gviz"),
            ("NEXT_SHEET_GVIZ_URL", "https://fallback.test/gviz"),
            ("NEXT_SHEET_EXPORT_URL", "https://fallback.test/export"),
        ]))
        .expect("config should load");

        assert_eq!(config.candidates.len(), 2);
        assert_eq!(config.candidates[0].url, "https://primary.test/gviz");
        assert_eq!(config.candidates[0].label, "gviz");
        assert_eq!(config.candidates[1].label, "export");
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = LecapConfig::from_lookup(lookup(&[(
            "NEXT_SHEET_EXPORT_URL",
            "https://sheet.test/export",
        )]))
        .expect("config should load");

        assert_eq!(config.candidates.len(), 1);
        assert_eq!(config.usd_api_url, DEFAULT_DOLAR_API_URL);
        assert_eq!(config.relay, CorsRelay::default());
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.range, TickerRange::default());
        assert_eq!(config.bind, DEFAULT_BIND);
    }

    #[test]
    fn fetcher_needs_a_candidate() {
        let config = LecapConfig::from_lookup(lookup(&[("LECAP_SHEET_GVIZ_URL", "   ")]))
            .expect("config should load");
        assert!(config.candidates.is_empty());

        let http: Arc<dyn HttpClient> = Arc::new(crate::http_client::ScriptedHttpClient::new());
        assert!(matches!(
            config.csv_fetcher(http.clone()),
            Err(ValidationError::NoCandidates)
        ));
        assert_eq!(config.usd_client(http).url(), DEFAULT_DOLAR_API_URL);
    }

    #[test]
    fn invalid_values_are_reported() {
        let base = [("LECAP_SHEET_GVIZ_URL", "https://sheet.test/gviz")];

        let timeout = LecapConfig::from_lookup(lookup(&[base[0], ("LECAP_TIMEOUT_MS", "soon")]));
        assert!(matches!(timeout, Err(ValidationError::InvalidEnv { .. })));

        let range = LecapConfig::from_lookup(lookup(&[base[0], ("LECAP_RANGE_END", "AL30")]));
        assert!(matches!(range, Err(ValidationError::InvalidTickerCode { .. })));

        let relay = LecapConfig::from_lookup(lookup(&[base[0], ("LECAP_CORS_RELAY", "https://r.test/")]));
        assert!(matches!(relay, Err(ValidationError::InvalidRelayTemplate { .. })));
    }
}
