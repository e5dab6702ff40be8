//! LECAP code detection.
//!
//! A code is `S` or `T` followed by four alphanumerics (`S15G5`, `T15E7`).
//! The spreadsheet sometimes hides it inside a free-text column, so
//! extraction falls back to tokenizing every cell.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::header::HeaderMap;
use crate::table::Row;

static CODE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ST][A-Z0-9]{4}$").expect("static ticker pattern is valid"));

/// Header names probed for a code before the fallback scan.
pub const LIKELY_TICKER_COLUMNS: [&str; 7] = [
    "Ticker", "Código", "Codigo", "Símbolo", "Simbolo", "Especie", "Serie",
];

/// Uppercased, validated LECAP code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LecapCode(String);

impl LecapCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let candidate = input.trim().to_uppercase();
        if CODE_SHAPE.is_match(&candidate) {
            Ok(Self(candidate))
        } else {
            Err(ValidationError::InvalidTickerCode {
                value: input.to_owned(),
            })
        }
    }

    /// Code known to be valid at compile time (built-in defaults).
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(CODE_SHAPE.is_match(code));
        Self(code.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LecapCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LecapCode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for LecapCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LecapCode> for String {
    fn from(value: LecapCode) -> Self {
        value.0
    }
}

/// Whether `value` has the LECAP code shape (case-insensitive, trimmed).
pub fn is_lecap_code(value: &str) -> bool {
    CODE_SHAPE.is_match(&value.trim().to_uppercase())
}

/// Find the LECAP code of a row.
///
/// Likely ticker columns are probed first (the resolved ticker header, then
/// [`LIKELY_TICKER_COLUMNS`]). Otherwise every column in `headers` order (or
/// the row's own key order when `headers` is empty) is tokenized and the
/// first token with the code shape wins.
pub fn extract_ticker<S: AsRef<str>>(
    row: &Row,
    header_map: Option<&HeaderMap>,
    headers: &[S],
) -> Option<String> {
    let mapped = header_map.and_then(|map| map.ticker.as_deref());
    let candidates = mapped
        .into_iter()
        .chain(LIKELY_TICKER_COLUMNS)
        .filter(|column| !column.is_empty());

    for column in candidates {
        if let Some(value) = row.get(column) {
            if !value.is_empty() && is_lecap_code(value) {
                return Some(value.trim().to_uppercase());
            }
        }
    }

    let keys: Vec<&str> = if headers.is_empty() {
        row.keys().collect()
    } else {
        headers.iter().map(AsRef::as_ref).collect()
    };

    for key in keys {
        let Some(value) = row.get(key).filter(|value| !value.is_empty()) else {
            continue;
        };

        if let Some(token) = value.split(is_token_delimiter).find(|token| is_lecap_code(token)) {
            return Some(token.to_uppercase());
        }
        if is_lecap_code(value) {
            return Some(value.trim().to_uppercase());
        }
    }

    None
}

fn is_token_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ',' | ';' | ':' | '/' | '-' | '\u{2013}' | '\u{2014}')
}
