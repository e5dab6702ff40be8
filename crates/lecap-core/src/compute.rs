//! Per-row projections: the quote table line and the calculator result.
//!
//! Formulas, with `amount` in pesos:
//!
//! - units = amount / px
//! - final capital = units * pagoFinal
//! - breakeven USD = usd_today * (pagoFinal / px)
//!
//! Both results exist only when `px` and `pagoFinal` are known and positive.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::header::{Field, HeaderMap};
use crate::numeric::{normalize_rate, parse_number, parse_number_str};
use crate::table::Row;
use crate::ticker::extract_ticker;

/// Calculator output for one selected row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedRow {
    /// Extracted code, empty when none was found.
    pub codigo: String,
    pub px: Option<f64>,
    pub pago_final: Option<f64>,
    /// Nominal annual rate as a fraction.
    pub tna_pct: Option<f64>,
    pub dias: Option<i64>,
    /// Raw maturity cell.
    pub venc: Option<String>,
    pub final_estimado: Option<f64>,
    pub breakeven_usd: Option<f64>,
}

/// Quote table line for one selected row. Rates are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRow {
    pub ticker: Option<String>,
    pub fecha_venc: Option<String>,
    pub liqui_secu: Option<String>,
    pub dias: Option<f64>,
    pub meses: Option<f64>,
    pub px: Option<f64>,
    pub pago_final: Option<f64>,
    pub tna: Option<f64>,
    pub tem: Option<f64>,
    pub tea: Option<f64>,
}

fn cell<'r>(row: &'r Row, header_map: &HeaderMap, field: Field) -> Option<&'r str> {
    header_map.get(field).and_then(|header| row.get(header))
}

fn number(row: &Row, header_map: &HeaderMap, field: Field) -> Option<f64> {
    parse_number(cell(row, header_map, field))
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

pub fn compute_row<S: AsRef<str>>(
    row: &Row,
    header_map: &HeaderMap,
    headers: &[S],
    amount: f64,
    usd_rate: Option<f64>,
) -> ComputedRow {
    let px = number(row, header_map, Field::Px);
    let pago_final = number(row, header_map, Field::PagoFinal);

    // Zero days reads as "unknown" in the sheet.
    let dias = number(row, header_map, Field::Dias)
        .filter(|d| *d != 0.0)
        .map(|d| d.round() as i64);

    let (final_estimado, breakeven_usd) = match (positive(px), positive(pago_final)) {
        (Some(px), Some(pago_final)) => (
            Some(amount / px * pago_final),
            usd_rate.map(|usd| usd * (pago_final / px)),
        ),
        _ => (None, None),
    };

    ComputedRow {
        codigo: extract_ticker(row, Some(header_map), headers).unwrap_or_default(),
        px,
        pago_final,
        tna_pct: normalize_rate(number(row, header_map, Field::Tna)),
        dias,
        venc: cell(row, header_map, Field::FechaVenc).map(str::to_owned),
        final_estimado,
        breakeven_usd,
    }
}

pub fn project_quote_row<S: AsRef<str>>(
    row: &Row,
    header_map: &HeaderMap,
    headers: &[S],
) -> QuoteRow {
    let text = |field| {
        cell(row, header_map, field)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    QuoteRow {
        ticker: extract_ticker(row, Some(header_map), headers),
        fecha_venc: text(Field::FechaVenc),
        liqui_secu: text(Field::LiquiSecu),
        dias: number(row, header_map, Field::Dias),
        meses: number(row, header_map, Field::Meses),
        px: number(row, header_map, Field::Px),
        pago_final: number(row, header_map, Field::PagoFinal),
        tna: normalize_rate(number(row, header_map, Field::Tna)),
        tem: normalize_rate(number(row, header_map, Field::Tem)),
        tea: normalize_rate(number(row, header_map, Field::Tea)),
    }
}

/// Calculator amount as typed; unparseable input counts as zero.
pub fn parse_amount(input: &str) -> f64 {
    parse_number_str(input).unwrap_or(0.0)
}

/// Amount the calculator may run with.
pub fn require_positive_amount(input: &str) -> Result<f64, ValidationError> {
    let amount = parse_amount(input);
    if amount > 0.0 {
        Ok(amount)
    } else {
        Err(ValidationError::NonPositiveAmount {
            value: input.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FieldAliasSpec;

    const HEADERS: [&str; 7] = ["Ticker", "Fecha Vencim.", "Días", "Px", "Pago Final", "TNA", "TEM"];

    fn header_map() -> HeaderMap {
        HeaderMap::resolve(&HEADERS, &FieldAliasSpec::default())
    }

    fn row(px: &str, pago_final: &str) -> Row {
        Row::new()
            .with_cell("Ticker", "S15G5")
            .with_cell("Fecha Vencim.", "15/08/2025")
            .with_cell("Días", "29,6")
            .with_cell("Px", px)
            .with_cell("Pago Final", pago_final)
            .with_cell("TNA", "38,5%")
            .with_cell("TEM", "0,031")
    }

    #[test]
    fn computes_final_capital_and_breakeven() {
        let computed = compute_row(&row("100", "110"), &header_map(), &HEADERS, 1000.0, Some(1200.0));

        assert_eq!(computed.codigo, "S15G5");
        assert_eq!(computed.dias, Some(30));
        assert_eq!(computed.venc.as_deref(), Some("15/08/2025"));
        assert!((computed.final_estimado.unwrap_or_default() - 1100.0).abs() < 1e-9);
        assert!((computed.breakeven_usd.unwrap_or_default() - 1320.0).abs() < 1e-9);
        assert!((computed.tna_pct.unwrap_or_default() - 0.385).abs() < 1e-9);
    }

    #[test]
    fn results_are_absent_without_positive_inputs() {
        let map = header_map();
        for (px, pago_final) in [("", "110"), ("0", "110"), ("100", "-1"), ("n/a", "n/a")] {
            let computed = compute_row(&row(px, pago_final), &map, &HEADERS, 1000.0, Some(1200.0));
            assert_eq!(computed.final_estimado, None, "px={px} pagoFinal={pago_final}");
            assert_eq!(computed.breakeven_usd, None, "px={px} pagoFinal={pago_final}");
        }
    }

    #[test]
    fn breakeven_needs_usd_rate() {
        let computed = compute_row(&row("100", "110"), &header_map(), &HEADERS, 1000.0, None);
        assert!(computed.final_estimado.is_some());
        assert_eq!(computed.breakeven_usd, None);
    }

    #[test]
    fn compute_is_pure() {
        let map = header_map();
        let input = row("98,7", "105");
        assert_eq!(
            compute_row(&input, &map, &HEADERS, 5000.0, Some(1100.0)),
            compute_row(&input, &map, &HEADERS, 5000.0, Some(1100.0))
        );
    }

    #[test]
    fn zero_days_is_unknown() {
        let input = Row::new()
            .with_cell("Px", "100")
            .with_cell("Pago Final", "110")
            .with_cell("Días", "0");
        assert_eq!(compute_row(&input, &header_map(), &HEADERS, 1.0, None).dias, None);
    }

    #[test]
    fn quote_row_normalizes_rates() {
        let quote = project_quote_row(&row("100", "110"), &header_map(), &HEADERS);

        assert_eq!(quote.ticker.as_deref(), Some("S15G5"));
        assert_eq!(quote.liqui_secu, None);
        assert!((quote.tna.unwrap_or_default() - 0.385).abs() < 1e-9);
        assert!((quote.tem.unwrap_or_default() - 0.031).abs() < 1e-9);
        assert_eq!(quote.tea, None);
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount("100.000"), 100.0);
        assert_eq!(parse_amount("$ 100000"), 100_000.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert!(require_positive_amount("0").is_err());
        assert_eq!(require_positive_amount("1.500,5"), Ok(1500.5));
    }
}
