use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lecap_core::fetcher::UNEXPECTED_ERROR;
use lecap_core::usd::USD_FETCH_FAILED;
use lecap_core::{CsvFetchError, UsdError};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Failure of an API handler, rendered as a JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Csv(#[from] CsvFetchError),

    #[error(transparent)]
    Usd(#[from] UsdError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Csv(error) => error.http_status(),
            Self::Usd(error) => error.http_status(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(%status, error = %self, "request failed");

        let body = match &self {
            Self::Csv(CsvFetchError::Exhausted(failure)) => json!({
                "error": failure.error,
                "attempts": failure.attempts,
            }),
            Self::Csv(CsvFetchError::Parse(error)) => json!({
                "error": UNEXPECTED_ERROR,
                "details": error.to_string(),
            }),
            Self::Usd(error) => match error.details() {
                Some(details) => json!({ "error": USD_FETCH_FAILED, "details": details }),
                None => json!({ "error": error.to_string() }),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Startup failure of the `lecap-web` binary.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] lecap_core::ValidationError),

    #[error("cannot bind {bind}: {source}")]
    Bind {
        bind: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
