//! "Dólar bolsa" (MEP) quote from a dolarapi-compatible endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpError, HttpRequest, DEFAULT_TIMEOUT_MS};

pub const DEFAULT_DOLAR_API_URL: &str = "https://dolarapi.com/v1/dolares";
const BOLSA: &str = "bolsa";

/// Error label of a transport or decode failure.
pub const USD_FETCH_FAILED: &str = "Failed to fetch dollar rate";

/// Snapshot consumed by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdQuote {
    pub rate: f64,
    pub as_of: Option<String>,
}

/// Normalized "bolsa" entry, as served by the USD endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BolsaQuote {
    pub source: String,
    pub moneda: String,
    pub casa: String,
    pub compra: Option<f64>,
    pub venta: f64,
    pub fecha_actualizacion: Option<String>,
    pub raw_count: usize,
}

impl BolsaQuote {
    pub fn to_usd_quote(&self) -> UsdQuote {
        UsdQuote {
            rate: self.venta,
            as_of: self.fecha_actualizacion.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UsdError {
    #[error("Dollar API error {status}")]
    Upstream { status: u16 },

    #[error("Could not find the 'bolsa' quote.")]
    BolsaNotFound,

    #[error("Failed to fetch dollar rate: {0}")]
    Transport(#[from] HttpError),

    #[error("Failed to fetch dollar rate: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UsdError {
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Upstream { .. } => 502,
            Self::BolsaNotFound => 404,
            Self::Transport(_) | Self::Decode(_) => 500,
        }
    }

    /// Underlying cause for unexpected failures, reported next to the label.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Transport(error) => Some(error.to_string()),
            Self::Decode(error) => Some(error.to_string()),
            Self::Upstream { .. } | Self::BolsaNotFound => None,
        }
    }
}

/// Loose shape of one rate entry; fields are checked after decoding.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DolarEntry {
    moneda: Option<String>,
    casa: Option<Value>,
    nombre: Option<Value>,
    compra: Option<Value>,
    venta: Option<Value>,
    fecha_actualizacion: Option<String>,
}

impl DolarEntry {
    fn is_named(value: Option<&Value>) -> bool {
        match value {
            Some(Value::String(text)) => text.to_lowercase() == BOLSA,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string().to_lowercase() == BOLSA,
        }
    }

    fn text(value: Option<&Value>) -> Option<String> {
        match value? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Client for the rate API.
#[derive(Clone)]
pub struct UsdClient {
    http: Arc<dyn HttpClient>,
    url: String,
    timeout_ms: u64,
}

impl UsdClient {
    pub fn new(http: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_bolsa(&self) -> Result<BolsaQuote, UsdError> {
        let request = HttpRequest::get(&self.url)
            .with_header("accept", "application/json")
            .no_cache()
            .with_timeout_ms(self.timeout_ms);

        let response = self.http.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, url = %self.url, "dollar API answered with an error");
            return Err(UsdError::Upstream {
                status: response.status,
            });
        }

        let entries: Vec<DolarEntry> = serde_json::from_str(&response.body)?;
        debug!(entries = entries.len(), "dollar API payload decoded");

        let bolsa = entries
            .iter()
            .find(|entry| DolarEntry::is_named(entry.casa.as_ref()))
            .or_else(|| {
                entries
                    .iter()
                    .find(|entry| DolarEntry::is_named(entry.nombre.as_ref()))
            })
            .ok_or(UsdError::BolsaNotFound)?;

        let venta = bolsa
            .venta
            .as_ref()
            .and_then(Value::as_f64)
            .ok_or(UsdError::BolsaNotFound)?;

        Ok(BolsaQuote {
            source: self.url.clone(),
            moneda: bolsa.moneda.clone().unwrap_or_else(|| String::from("USD")),
            casa: DolarEntry::text(bolsa.casa.as_ref())
                .or_else(|| DolarEntry::text(bolsa.nombre.as_ref()))
                .unwrap_or_else(|| String::from(BOLSA)),
            compra: bolsa.compra.as_ref().and_then(Value::as_f64),
            venta,
            fecha_actualizacion: bolsa.fecha_actualizacion.clone(),
            raw_count: entries.len(),
        })
    }
}

impl std::fmt::Debug for UsdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsdClient")
            .field("url", &self.url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
