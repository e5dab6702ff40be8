//! Fuzzy header resolution.
//!
//! The quotes spreadsheet is maintained by hand, so column titles drift
//! ("Fecha Vencim.", "Fecha de Vencimiento", "Vto"). Each logical field
//! carries an ordered alias list; [`find_header`] picks the raw header that
//! matches one of them after accent and punctuation folding.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Logical column of the quotes table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Ticker,
    FechaVenc,
    LiquiSecu,
    Dias,
    Meses,
    Px,
    PagoFinal,
    Tna,
    Tem,
    Tea,
}

impl Field {
    pub const ALL: [Self; 10] = [
        Self::Ticker,
        Self::FechaVenc,
        Self::LiquiSecu,
        Self::Dias,
        Self::Meses,
        Self::Px,
        Self::PagoFinal,
        Self::Tna,
        Self::Tem,
        Self::Tea,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::FechaVenc => "fechaVenc",
            Self::LiquiSecu => "liquiSecu",
            Self::Dias => "dias",
            Self::Meses => "meses",
            Self::Px => "px",
            Self::PagoFinal => "pagoFinal",
            Self::Tna => "tna",
            Self::Tem => "tem",
            Self::Tea => "tea",
        }
    }

    /// Built-in alias list, most specific first.
    pub const fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Ticker => &[
                "Ticker",
                "Código",
                "Codigo",
                "Símbolo",
                "Simbolo",
                "Código LECAP",
                "Codigo LECAP",
            ],
            Self::FechaVenc => &[
                "Fecha Vencim.",
                "Fecha de Vencimiento",
                "Vencimiento",
                "Fecha Vto",
                "Fecha Vto.",
                "F. Venc.",
            ],
            Self::LiquiSecu => &["Liqui Secu.", "Liqui Secu", "Liquidez Secundaria", "Liquidez"],
            Self::Dias => &[
                "Días",
                "Dias",
                "Plazo (días)",
                "Plazo dias",
                "Días al vencimiento",
                "Dias al vencimiento",
            ],
            Self::Meses => &["Meses", "Plazo (meses)", "Mes"],
            Self::Px => &[
                "Px",
                "Precio Actual",
                "Precio",
                "Precio (ARS)",
                "Último Precio",
                "Ultimo Precio",
            ],
            Self::PagoFinal => &[
                "PagoFinal",
                "Pago Final",
                "Pago Final (ARS)",
                "Pago Final ARS",
                "Pago al Vencimiento",
                "Valor a Cobrar",
            ],
            Self::Tna => &[
                "TNA",
                "Tasa Nominal Anual (TNA)",
                "Tasa Nominal Anual",
                "Tasa Nominal",
            ],
            Self::Tem => &["TEM", "Tasa Efectiva Mensual"],
            Self::Tea => &["TEA", "Tasa Efectiva Anual"],
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from logical field to its ordered candidate header strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliasSpec {
    entries: Vec<(Field, Vec<String>)>,
}

impl Default for FieldAliasSpec {
    fn default() -> Self {
        Self {
            entries: Field::ALL
                .iter()
                .map(|field| {
                    let aliases = field
                        .default_aliases()
                        .iter()
                        .map(|alias| (*alias).to_owned())
                        .collect();
                    (*field, aliases)
                })
                .collect(),
        }
    }
}

impl FieldAliasSpec {
    pub fn aliases(&self, field: Field) -> &[String] {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the alias list of one field.
    pub fn with_aliases<I, S>(mut self, field: Field, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(candidate, _)| *candidate == field) {
            Some(entry) => entry.1 = aliases,
            None => self.entries.push((field, aliases)),
        }
        self
    }
}

/// Resolved raw header per logical field (`None` when nothing matched).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMap {
    pub ticker: Option<String>,
    pub fecha_venc: Option<String>,
    pub liqui_secu: Option<String>,
    pub dias: Option<String>,
    pub meses: Option<String>,
    pub px: Option<String>,
    pub pago_final: Option<String>,
    pub tna: Option<String>,
    pub tem: Option<String>,
    pub tea: Option<String>,
}

impl HeaderMap {
    /// Resolve every logical field against the raw headers of one table.
    pub fn resolve<S: AsRef<str>>(headers: &[S], spec: &FieldAliasSpec) -> Self {
        let mut map = Self::default();
        for field in Field::ALL {
            let found = find_header(headers, spec.aliases(field)).map(str::to_owned);
            *map.slot_mut(field) = found;
        }
        map
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Ticker => self.ticker.as_deref(),
            Field::FechaVenc => self.fecha_venc.as_deref(),
            Field::LiquiSecu => self.liqui_secu.as_deref(),
            Field::Dias => self.dias.as_deref(),
            Field::Meses => self.meses.as_deref(),
            Field::Px => self.px.as_deref(),
            Field::PagoFinal => self.pago_final.as_deref(),
            Field::Tna => self.tna.as_deref(),
            Field::Tem => self.tem.as_deref(),
            Field::Tea => self.tea.as_deref(),
        }
    }

    /// Fields the table did not provide, in declaration order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Ticker => &mut self.ticker,
            Field::FechaVenc => &mut self.fecha_venc,
            Field::LiquiSecu => &mut self.liqui_secu,
            Field::Dias => &mut self.dias,
            Field::Meses => &mut self.meses,
            Field::Px => &mut self.px,
            Field::PagoFinal => &mut self.pago_final,
            Field::Tna => &mut self.tna,
            Field::Tem => &mut self.tem,
            Field::Tea => &mut self.tea,
        }
    }
}

/// NFD-decompose, drop combining diacritics, lowercase and trim.
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !('\u{0300}'..='\u{036f}').contains(ch))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_owned()
}

/// [`normalize`] plus punctuation stripping and whitespace collapsing.
pub fn normalize_loose(value: &str) -> String {
    let stripped: String = normalize(value)
        .chars()
        .filter(|ch| !is_loose_punctuation(*ch))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_loose_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '.' | '-' | '_' | ':' | ';' | '"' | '\'' | '(' | ')' | '{' | '}' | '[' | ']' | '%'
    )
}

/// Find the raw header best matching any alias.
///
/// Pass 1 looks for an exact loose match, pass 2 for containment in either
/// direction. Both passes walk headers in table order and return the first
/// hit. Headers or aliases that fold to an empty string never match, unlike
/// plain substring containment where the empty string is inside every alias.
pub fn find_header<'h, H, A>(headers: &'h [H], aliases: &[A]) -> Option<&'h str>
where
    H: AsRef<str>,
    A: AsRef<str>,
{
    let folded_headers: Vec<(&'h str, String)> = headers
        .iter()
        .map(|header| (header.as_ref(), normalize_loose(header.as_ref())))
        .filter(|(_, folded)| !folded.is_empty())
        .collect();
    let folded_aliases: Vec<String> = aliases
        .iter()
        .map(|alias| normalize_loose(alias.as_ref()))
        .filter(|folded| !folded.is_empty())
        .collect();

    for (raw, header) in &folded_headers {
        if folded_aliases.iter().any(|alias| alias == header) {
            return Some(*raw);
        }
    }

    for (raw, header) in &folded_headers {
        if folded_aliases
            .iter()
            .any(|alias| header.contains(alias.as_str()) || alias.contains(header.as_str()))
        {
            return Some(*raw);
        }
    }

    None
}
