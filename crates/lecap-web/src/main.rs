use std::process::ExitCode;
use std::sync::Arc;

use lecap_core::{HttpClient, LecapConfig, ReqwestHttpClient};
use lecap_web::error::ServeError;
use lecap_web::{router, AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lecap_core=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lecap-web stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<(), ServeError> {
    let config = LecapConfig::from_env()?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let state = AppState::from_config(&config, http)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|source| ServeError::Bind {
            bind: config.bind.clone(),
            source,
        })?;
    info!(bind = %config.bind, candidates = config.candidates.len(), "lecap-web listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
