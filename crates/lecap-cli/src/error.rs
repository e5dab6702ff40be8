use lecap_core::{CsvFetchError, FetchAttempt, UsdError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] lecap_core::ValidationError),

    #[error(transparent)]
    Csv(#[from] CsvFetchError),

    #[error(transparent)]
    Usd(#[from] UsdError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Csv(_) | Self::Usd(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }

    /// Attempt history of an exhausted CSV fetch.
    pub fn attempts(&self) -> &[FetchAttempt] {
        match self {
            Self::Csv(error) => error.attempts(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use lecap_core::{FetchFailure, ValidationError};

    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        let exhausted = CliError::from(CsvFetchError::Exhausted(FetchFailure {
            error: String::from("No valid CSV received"),
            attempts: vec![FetchAttempt::failed("https://a.test", "gviz", "Status 500")],
        }));

        assert_eq!(CliError::from(ValidationError::NoCandidates).exit_code(), 2);
        assert_eq!(exhausted.exit_code(), 3);
        assert_eq!(exhausted.attempts().len(), 1);
        assert_eq!(CliError::from(UsdError::BolsaNotFound).exit_code(), 3);
        assert_eq!(
            CliError::from(std::io::Error::other("closed pipe")).exit_code(),
            10
        );
    }
}
