//! CSV candidates, the CORS relay and per-attempt records.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Placeholder replaced by the percent-encoded target URL.
pub const RELAY_URL_PLACEHOLDER: &str = "{url}";
pub const DEFAULT_CORS_RELAY: &str = "https://cors.isomorphic-git.org/{url}";
const PROXY_LABEL_PREFIX: &str = "proxy-";

/// Characters of a rejected body kept in its attempt record.
pub const BODY_PREVIEW_CHARS: usize = 120;

/// One place the quotes CSV may be published at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvCandidate {
    pub url: String,
    pub label: String,
}

impl CsvCandidate {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into().trim().to_owned();
        let label = label.into().trim().to_owned();
        if url.is_empty() {
            return Err(ValidationError::EmptyCandidateUrl);
        }
        if label.is_empty() {
            return Err(ValidationError::EmptyCandidateLabel);
        }
        Ok(Self { url, label })
    }

    /// Label reported when the candidate is served through the relay.
    pub fn proxy_label(&self) -> String {
        format!("{PROXY_LABEL_PREFIX}{}", self.label)
    }
}

/// URL-encoding CORS relay used as the second fetch phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsRelay {
    template: String,
}

impl CorsRelay {
    pub fn new(template: impl Into<String>) -> Result<Self, ValidationError> {
        let template = template.into().trim().to_owned();
        if !template.contains(RELAY_URL_PLACEHOLDER) {
            return Err(ValidationError::InvalidRelayTemplate { value: template });
        }
        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn proxify(&self, url: &str) -> String {
        self.template
            .replace(RELAY_URL_PLACEHOLDER, &urlencoding::encode(url))
    }
}

impl Default for CorsRelay {
    fn default() -> Self {
        Self {
            template: DEFAULT_CORS_RELAY.to_owned(),
        }
    }
}

/// Record of one unsuccessful fetch attempt.
///
/// Exactly one of `error` (transport failure) or `body` (preview of a body
/// that failed the CSV plausibility check) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAttempt {
    pub url: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl FetchAttempt {
    pub fn failed(url: impl Into<String>, label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            error: Some(error.into()),
            body: None,
        }
    }

    pub fn rejected(url: impl Into<String>, label: impl Into<String>, body: &str) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            error: None,
            body: Some(body.chars().take(BODY_PREVIEW_CHARS).collect()),
        }
    }
}
