//! Raw CSV table decoding.
//!
//! Every cell stays a string: the spreadsheet mixes locales, so numeric
//! interpretation is deferred to [`crate::numeric`] once the header map tells
//! us which columns are numeric at all.

use std::fmt::{self, Formatter};
use std::io::Cursor;

use csv::{ReaderBuilder, StringRecord};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::TableError;

const BOM: char = '\u{feff}';
const LOGGED_WARNINGS: usize = 3;

/// One data row: header → cell, in column order.
///
/// Lookups by a duplicated header return the first matching cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(header, value);
        self
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.push((header.into(), value.into()));
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header to cell text")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut row = Row::new();
                while let Some((key, value)) = access.next_entry::<String, Option<String>>()? {
                    row.push(key, value.unwrap_or_default());
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Decoded CSV: ordered headers plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Non-fatal problem found while decoding a single CSV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    /// 1-based line of the record in the source text.
    pub line: u64,
    pub message: String,
}

/// Decoding result: the table plus the row-level warnings it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub table: RawTable,
    pub warnings: Vec<RowWarning>,
}

/// Decode CSV text with a header row.
///
/// Blank lines and rows whose cells are all blank are skipped. Short rows
/// omit the missing keys and long rows drop the extra cells; both are
/// reported as warnings, the first few of which are logged.
pub fn parse_csv(text: &str) -> Result<ParsedTable, TableError> {
    let clean = text.strip_prefix(BOM).unwrap_or(text);
    let header_line = clean
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    let delimiter = detect_delimiter(header_line);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(clean.as_bytes()));

    let header_record = reader.headers().map_err(TableError::Header)?.clone();
    let mut headers: Vec<String> = header_record.iter().map(str::to_owned).collect();

    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                let line = error.position().map(|pos| pos.line()).unwrap_or(0);
                warnings.push(RowWarning {
                    line,
                    message: format!("unreadable record: {error}"),
                });
                continue;
            }
        };

        if is_blank(&record) {
            continue;
        }

        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        if !headers.is_empty() && record.len() != headers.len() {
            let problem = if record.len() < headers.len() {
                "too few fields"
            } else {
                "too many fields"
            };
            warnings.push(RowWarning {
                line,
                message: format!(
                    "{problem}: expected {}, parsed {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.as_str(), value))
                .collect::<Row>(),
        );
    }

    for warning in warnings.iter().take(LOGGED_WARNINGS) {
        warn!(line = warning.line, "CSV parse warning: {}", warning.message);
    }

    if headers.is_empty() {
        headers = rows
            .first()
            .map(|row| row.keys().map(str::to_owned).collect())
            .unwrap_or_default();
    }

    Ok(ParsedTable {
        table: RawTable { headers, rows },
        warnings,
    })
}

/// Most frequent of `,` `;` tab `|` on the first line, defaulting to comma.
pub fn detect_delimiter(first_line: &str) -> char {
    let counts = [
        (',', first_line.matches(',').count()),
        (';', first_line.matches(';').count()),
        ('\t', first_line.matches('\t').count()),
        ('|', first_line.matches('|').count()),
    ];

    // max_by_key keeps the last maximum, so scan in reverse to prefer earlier
    // delimiters on ties.
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count > 0)
        .map(|(delimiter, _)| delimiter)
        .unwrap_or(',')
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
