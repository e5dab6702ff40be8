//! # lecap-web
//!
//! JSON HTTP API over [`lecap_core`].
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `GET /api/lecap` | `{ headers, rows, source, fetchedUrl }` | `502 { error, attempts }`, `500 { error, details }` |
//! | `GET /api/usd` | `{ source, moneda, casa, compra, venta, fechaActualizacion, rawCount }` | `404`/`502 { error }`, `500 { error, details }` |
//! | `GET /api/quotes?amount=` | quote table, calculator results and dollar rate | same as `/api/lecap` |
//! | `GET /healthz` | `{ status: "ok" }` | - |

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use lecap_core::{
    CsvFetcher, FieldAliasSpec, HttpClient, LecapConfig, TickerRange, UsdClient, ValidationError,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Clients shared by every request. Nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<CsvFetcher>,
    pub usd_client: Arc<UsdClient>,
    pub range: TickerRange,
    pub aliases: Arc<FieldAliasSpec>,
}

impl AppState {
    pub fn new(fetcher: CsvFetcher, usd_client: UsdClient) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            usd_client: Arc::new(usd_client),
            range: TickerRange::default(),
            aliases: Arc::new(FieldAliasSpec::default()),
        }
    }

    pub fn from_config(
        config: &LecapConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        let fetcher = config.csv_fetcher(http.clone())?;
        Ok(Self::new(fetcher, config.usd_client(http)).with_range(config.range.clone()))
    }

    pub fn with_range(mut self, range: TickerRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_aliases(mut self, aliases: FieldAliasSpec) -> Self {
        self.aliases = Arc::new(aliases);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/lecap", get(routes::get_lecap))
        .route("/api/usd", get(routes::get_usd))
        .route("/api/quotes", get(routes::get_quotes))
        .route("/healthz", get(routes::healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use lecap_core::{CsvCandidate, HttpError, HttpResponse, ScriptedHttpClient};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const GVIZ: &str = "https://sheet.test/gviz";
    const RATES: &str = "https://rates.test/v1/dolares";
    const SHEET: &str = "Ticker,Vencimiento,Px,Pago Final,TNA\n\
                         S15G5,15/08/2025,100,104,38%\n\
                         S30S5,30/09/2025,98,106,40%\n";
    const RATES_BODY: &str = r#"[
        {"moneda":"USD","casa":"oficial","nombre":"Oficial","compra":950,"venta":990},
        {"moneda":"USD","casa":"bolsa","nombre":"Bolsa","compra":1180,"venta":1200,"fechaActualizacion":"2025-07-01T15:00:00.000Z"}
    ]"#;

    fn app(http: ScriptedHttpClient) -> Router {
        let http: Arc<dyn HttpClient> = Arc::new(http);
        let fetcher = CsvFetcher::new(
            http.clone(),
            vec![CsvCandidate::new(GVIZ, "gviz").expect("valid candidate")],
        )
        .expect("candidates configured");
        router(AppState::new(fetcher, UsdClient::new(http, RATES)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router answers");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (status, body) = get_json(app(ScriptedHttpClient::new()), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn lecap_serves_decoded_rows() {
        let http = ScriptedHttpClient::new().respond(GVIZ, Ok(HttpResponse::ok(SHEET)));

        let (status, body) = get_json(app(http), "/api/lecap").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "gviz");
        assert_eq!(body["fetchedUrl"], GVIZ);
        assert_eq!(body["rows"][0]["Ticker"], "S15G5");
        assert_eq!(body["headers"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn exhausted_candidates_answer_502_with_attempts() {
        let (status, body) = get_json(app(ScriptedHttpClient::new()), "/api/lecap").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "No valid CSV received");
        let attempts = body["attempts"].as_array().expect("attempts");
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0]["label"], "gviz");
        assert_eq!(attempts[1]["label"], "proxy-gviz");
    }

    #[tokio::test]
    async fn usd_maps_errors_to_statuses() {
        let missing = ScriptedHttpClient::new().respond(RATES, Ok(HttpResponse::ok("[]")));
        let (status, body) = get_json(app(missing), "/api/usd").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Could not find the 'bolsa' quote.");

        let upstream =
            ScriptedHttpClient::new().respond(RATES, Ok(HttpResponse::with_status(503, "")));
        let (status, _) = get_json(app(upstream), "/api/usd").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let broken = ScriptedHttpClient::new().respond(RATES, Err(HttpError::new("reset")));
        let (status, body) = get_json(app(broken), "/api/usd").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch dollar rate");
        assert!(body["details"].as_str().is_some_and(|d| d.contains("reset")));
    }

    #[tokio::test]
    async fn quotes_combine_table_and_rate() {
        let http = ScriptedHttpClient::new()
            .respond(GVIZ, Ok(HttpResponse::ok(SHEET)))
            .respond(RATES, Ok(HttpResponse::ok(RATES_BODY)));

        let (status, body) = get_json(app(http), "/api/quotes?amount=1000").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usd"]["rate"], 1200.0);
        assert_eq!(body["quotes"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["computed"][0]["codigo"], "S15G5");
        assert_eq!(body["computed"][0]["finalEstimado"], 1040.0);
        assert!(body["usdError"].is_null());
    }

    #[tokio::test]
    async fn quotes_survive_a_dollar_failure() {
        let http = ScriptedHttpClient::new().respond(GVIZ, Ok(HttpResponse::ok(SHEET)));

        let (status, body) = get_json(app(http), "/api/quotes").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["usd"].is_null());
        assert!(body["usdError"].is_string());
        assert_eq!(body["computed"], serde_json::json!([]));
        assert_eq!(body["quotes"][1]["ticker"], "S30S5");
    }
}
