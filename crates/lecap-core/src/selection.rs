//! Ticker tagging and range selection over the fetched rows.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::header::HeaderMap;
use crate::table::Row;
use crate::ticker::{extract_ticker, LecapCode};

pub const DEFAULT_RANGE_START: &str = "S15G5";
pub const DEFAULT_RANGE_END: &str = "T15E7";

/// Inclusive code range delimiting the bonds of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRange {
    pub start: LecapCode,
    pub end: LecapCode,
}

impl TickerRange {
    pub fn new(start: LecapCode, end: LecapCode) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(LecapCode::parse(start)?, LecapCode::parse(end)?))
    }
}

impl Default for TickerRange {
    fn default() -> Self {
        Self::new(
            LecapCode::from_static(DEFAULT_RANGE_START),
            LecapCode::from_static(DEFAULT_RANGE_END),
        )
    }
}

/// A row together with the code extracted from it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTicker<'a> {
    pub row: &'a Row,
    pub ticker: Option<String>,
}

/// Tag every row with its extracted code, preserving order.
pub fn tag_rows<'a, S: AsRef<str>>(
    rows: &'a [Row],
    header_map: &HeaderMap,
    headers: &[S],
) -> Vec<RowTicker<'a>> {
    rows.iter()
        .map(|row| RowTicker {
            row,
            ticker: extract_ticker(row, Some(header_map), headers),
        })
        .collect()
}

/// Rows of interest, each tagged with its code.
///
/// When both range ends are present the result is the inclusive slice
/// between their first occurrences (in either order). Otherwise every row
/// carrying a code is returned in table order.
pub fn select_rows<'a, S: AsRef<str>>(
    rows: &'a [Row],
    header_map: &HeaderMap,
    headers: &[S],
    range: &TickerRange,
) -> Vec<RowTicker<'a>> {
    let mut tagged = tag_rows(rows, header_map, headers);

    let position = |tagged: &[RowTicker<'_>], code: &LecapCode| {
        tagged
            .iter()
            .position(|entry| entry.ticker.as_deref() == Some(code.as_str()))
    };

    match (position(&tagged, &range.start), position(&tagged, &range.end)) {
        (Some(start), Some(end)) => {
            let (from, to) = if start <= end { (start, end) } else { (end, start) };
            tagged.truncate(to + 1);
            tagged.drain(..from);
            tagged
        }
        _ => {
            tagged.retain(|entry| entry.ticker.is_some());
            tagged
        }
    }
}
