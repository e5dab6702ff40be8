use thiserror::Error;

/// Validation and configuration errors exposed by `lecap-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("candidate url cannot be empty")]
    EmptyCandidateUrl,
    #[error("candidate label cannot be empty")]
    EmptyCandidateLabel,
    #[error("at least one CSV candidate url must be configured")]
    NoCandidates,

    #[error("'{value}' is not a LECAP code, expected S or T followed by 4 alphanumerics")]
    InvalidTickerCode { value: String },

    #[error("relay template must contain '{{url}}': '{value}'")]
    InvalidRelayTemplate { value: String },

    #[error("amount must be a positive number: '{value}'")]
    NonPositiveAmount { value: String },

    #[error("environment variable '{name}' has an invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

/// CSV decoding failure that could not be degraded to a row warning.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read CSV header row: {0}")]
    Header(#[source] csv::Error),
}
