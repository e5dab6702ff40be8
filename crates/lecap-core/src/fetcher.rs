//! Two-phase CSV fetch: every candidate directly, then every candidate
//! through the CORS relay. The first plausible body wins; otherwise the
//! caller gets the full ordered attempt history.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{TableError, ValidationError};
use crate::http_client::{HttpClient, HttpError, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::source::{CorsRelay, CsvCandidate, FetchAttempt};
use crate::table::{parse_csv, Row};

const CSV_ACCEPT: &str = "text/csv, text/plain, */*";
const SNIFF_CHARS: usize = 4000;
const SNIFF_LINES: usize = 6;

static WRAPPER_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mR)^(?:Title:|URL Source:|Markdown Content:)")
        .expect("static wrapper pattern is valid")
});

/// Exhaustion message reported with the attempt list.
pub const NO_VALID_CSV: &str = "No valid CSV received";
/// Error label of an unexpected (non-transport) failure.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Decoded CSV plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPayload {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Candidate label, `proxy-` prefixed when served through the relay.
    pub source: String,
    /// Original candidate URL, never the relay URL.
    pub fetched_url: String,
}

/// Every candidate failed in both phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub error: String,
    pub attempts: Vec<FetchAttempt>,
}

#[derive(Debug, Error)]
pub enum CsvFetchError {
    #[error("{} after {} attempt(s)", .0.error, .0.attempts.len())]
    Exhausted(FetchFailure),

    #[error("unexpected failure while decoding CSV: {0}")]
    Parse(#[from] TableError),
}

impl CsvFetchError {
    /// Status the CSV endpoint answers with for this error.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Exhausted(_) => 502,
            Self::Parse(_) => 500,
        }
    }

    pub fn attempts(&self) -> &[FetchAttempt] {
        match self {
            Self::Exhausted(failure) => &failure.attempts,
            Self::Parse(_) => &[],
        }
    }
}

/// Cheap check that a body looks like delimited text.
///
/// Reader-proxy wrappers (`Title:` / `URL Source:` / `Markdown Content:`
/// lines) are rejected outright. Otherwise one of the first lines must
/// contain a comma, semicolon or tab.
pub fn is_likely_csv(text: &str) -> bool {
    let sample = match text.char_indices().nth(SNIFF_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    };

    if WRAPPER_MARKER.is_match(sample) {
        return false;
    }

    sample
        .split('\n')
        .take(SNIFF_LINES)
        .any(|line| line.contains([',', ';', '\t']))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Direct,
    Relay,
}

/// Fetches the quotes CSV from an ordered candidate list.
#[derive(Clone)]
pub struct CsvFetcher {
    http: Arc<dyn HttpClient>,
    candidates: Vec<CsvCandidate>,
    relay: CorsRelay,
    timeout_ms: u64,
}

impl CsvFetcher {
    pub fn new(
        http: Arc<dyn HttpClient>,
        candidates: Vec<CsvCandidate>,
    ) -> Result<Self, ValidationError> {
        if candidates.is_empty() {
            return Err(ValidationError::NoCandidates);
        }
        Ok(Self {
            http,
            candidates,
            relay: CorsRelay::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        })
    }

    pub fn with_relay(mut self, relay: CorsRelay) -> Self {
        self.relay = relay;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn candidates(&self) -> &[CsvCandidate] {
        &self.candidates
    }

    pub fn relay(&self) -> &CorsRelay {
        &self.relay
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub async fn fetch_csv(&self) -> Result<CsvPayload, CsvFetchError> {
        let mut attempts = Vec::with_capacity(self.candidates.len() * 2);

        for phase in [Phase::Direct, Phase::Relay] {
            for candidate in &self.candidates {
                let (url, label) = match phase {
                    Phase::Direct => (candidate.url.clone(), candidate.label.clone()),
                    Phase::Relay => (self.relay.proxify(&candidate.url), candidate.proxy_label()),
                };
                debug!(%url, %label, "fetching CSV candidate");

                match self.fetch_raw(&url).await {
                    Ok(body) if is_likely_csv(&body) => {
                        info!(
                            %label,
                            failed_attempts = attempts.len(),
                            "CSV candidate accepted"
                        );
                        return decode(&body, label, candidate.url.clone());
                    }
                    Ok(body) => {
                        warn!(%url, %label, "candidate body does not look like CSV");
                        attempts.push(FetchAttempt::rejected(url, label, &body));
                    }
                    Err(error) => {
                        debug!(%url, %label, %error, "CSV candidate failed");
                        attempts.push(FetchAttempt::failed(url, label, error.message()));
                    }
                }
            }
        }

        warn!(attempts = attempts.len(), "every CSV candidate failed");
        Err(CsvFetchError::Exhausted(FetchFailure {
            error: NO_VALID_CSV.to_owned(),
            attempts,
        }))
    }

    async fn fetch_raw(&self, url: &str) -> Result<String, HttpError> {
        let request = HttpRequest::get(url)
            .with_header("accept", CSV_ACCEPT)
            .no_cache()
            .with_timeout_ms(self.timeout_ms);

        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(HttpError::new(format!("Status {}", response.status)));
        }
        Ok(response.body)
    }
}

impl std::fmt::Debug for CsvFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvFetcher")
            .field("candidates", &self.candidates)
            .field("relay", &self.relay)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

fn decode(body: &str, source: String, fetched_url: String) -> Result<CsvPayload, CsvFetchError> {
    let parsed = parse_csv(body)?;
    Ok(CsvPayload {
        headers: parsed.table.headers,
        rows: parsed.table.rows,
        source,
        fetched_url,
    })
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    use super::*;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};

    const GVIZ: &str = "https://sheet.test/gviz";
    const EXPORT: &str = "https://sheet.test/export";

    fn fetcher(http: &ScriptedHttpClient) -> CsvFetcher {
        CsvFetcher::new(
            Arc::new(http.clone()),
            vec![
                CsvCandidate::new(GVIZ, "gviz").expect("valid candidate"),
                CsvCandidate::new(EXPORT, "export").expect("valid candidate"),
            ],
        )
        .expect("candidates configured")
    }

    #[test]
    fn plausibility_rejects_reader_wrappers() {
        assert!(!is_likely_csv("Title: Some Page\nURL Source: x\n\na,b,c"));
        assert!(!is_likely_csv("intro\r\nMarkdown Content:\r\na,b"));
        assert!(is_likely_csv("a,b,c\n1,2,3"));
        assert!(is_likely_csv("a;b\n1;2"));
        assert!(is_likely_csv("a\tb"));
    }

    #[test]
    fn plausibility_only_looks_at_first_lines() {
        let late = format!("{}x,y", "line\n".repeat(6));
        assert!(!is_likely_csv(&late));
        assert!(!is_likely_csv("<html><body>nope</body></html>"));
        assert!(!is_likely_csv(""));
    }

    #[test]
    fn wrapper_markers_only_count_inside_the_sniff_window() {
        let early = format!("a,b\n{}\nTitle: LECAPs\n", "x".repeat(3000));
        assert!(!is_likely_csv(&early));

        let late = format!("a,b\n{}\nTitle: LECAPs\n", "x".repeat(4100));
        assert!(is_likely_csv(&late));
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let result = CsvFetcher::new(Arc::new(ScriptedHttpClient::new()), Vec::new());
        assert!(matches!(result, Err(ValidationError::NoCandidates)));
    }

    #[test]
    fn first_plausible_direct_body_wins() {
        let http = ScriptedHttpClient::new()
            .respond(GVIZ, Ok(HttpResponse::ok("Ticker,Px\nS15G5,105\n")));

        let payload = block_on(fetcher(&http).fetch_csv()).expect("fetch should succeed");

        assert_eq!(payload.source, "gviz");
        assert_eq!(payload.fetched_url, GVIZ);
        assert_eq!(payload.rows[0].get("Ticker"), Some("S15G5"));
        assert_eq!(http.requested_urls(), vec![GVIZ.to_owned()]);

        let request = &http.requests()[0];
        assert_eq!(request.headers.get("accept").map(String::as_str), Some(CSV_ACCEPT));
        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn non_success_status_is_recorded_as_error() {
        let http = ScriptedHttpClient::new()
            .respond(GVIZ, Ok(HttpResponse::with_status(404, "missing")))
            .respond(EXPORT, Ok(HttpResponse::ok("a,b\n1,2\n")));

        let payload = block_on(fetcher(&http).fetch_csv()).expect("fetch should succeed");
        assert_eq!(payload.source, "export");
    }

    #[test]
    fn exhaustion_lists_attempts_in_order() {
        let relay = CorsRelay::default();
        let http = ScriptedHttpClient::new()
            .respond(GVIZ, Ok(HttpResponse::with_status(500, "")))
            .respond(EXPORT, Ok(HttpResponse::ok("Title: Sheet\nnope")));

        let error = block_on(fetcher(&http).fetch_csv()).expect_err("fetch should fail");

        assert_eq!(error.http_status(), 502);
        let attempts = error.attempts();
        assert_eq!(attempts.len(), 4);
        assert_eq!(attempts[0].error.as_deref(), Some("Status 500"));
        assert_eq!(attempts[1].body.as_deref(), Some("Title: Sheet\nnope"));
        assert_eq!(attempts[2].url, relay.proxify(GVIZ));
        assert_eq!(attempts[2].label, "proxy-gviz");
        assert_eq!(attempts[3].label, "proxy-export");
    }

    fn block_on<F>(future: F) -> F::Output
    where
        F: Future,
    {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);
        let mut future = std::pin::pin!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
        unsafe { Waker::from_raw(noop_raw_waker()) }
    }

    fn noop_raw_waker() -> RawWaker {
        RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
    }

    unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }

    unsafe fn noop_raw_waker_wake(_: *const ()) {}

    unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

    unsafe fn noop_raw_waker_drop(_: *const ()) {}

    static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
        noop_raw_waker_clone,
        noop_raw_waker_wake,
        noop_raw_waker_wake_by_ref,
        noop_raw_waker_drop,
    );
}
