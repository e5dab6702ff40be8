//! es-AR display helpers shared by the CLI table and the dashboard view.

use once_cell::sync::Lazy;
use regex::Regex;
use time::macros::format_description;
use time::{Date, Month};

/// Placeholder rendered for absent values.
pub const EMPTY: &str = "—";

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})$").expect("static date pattern is valid")
});

/// `$ 1.234,56`: dot thousands, comma decimals, always two fraction digits.
pub fn format_ars(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return EMPTY.to_owned();
    };

    let cents = (value.abs() * 100.0).round() as u128;
    let whole = group_thousands(cents / 100);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}$ {whole},{:02}", cents % 100)
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Fraction rendered as a percentage with `digits` decimals (`0.385` → `38.50%`).
pub fn format_percent(value: Option<f64>, digits: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.*}%", digits, v * 100.0),
        None => EMPTY.to_owned(),
    }
}

/// Maturity date as `d/m/yyyy`.
///
/// Accepts `d/m/yy(yy)` or `d-m-yy(yy)` (two-digit years are 20xx) and ISO
/// `yyyy-mm-dd` with an optional time part. Anything else is returned as-is.
pub fn format_date_es(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return EMPTY.to_owned();
    };

    match parse_sheet_date(raw) {
        Some(date) => format!("{}/{}/{}", date.day(), u8::from(date.month()), date.year()),
        None => raw.to_owned(),
    }
}

fn parse_sheet_date(raw: &str) -> Option<Date> {
    if let Some(caps) = DAY_MONTH_YEAR.captures(raw) {
        let day: u8 = caps[1].parse().ok()?;
        let month: u8 = caps[2].parse().ok()?;
        let year_text = &caps[3];
        let year: i32 = if year_text.len() == 2 {
            format!("20{year_text}").parse().ok()?
        } else {
            year_text.parse().ok()?
        };
        return Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok();
    }

    let (day_part, rest) = raw.split_at_checked(10)?;
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    Date::parse(day_part, format_description!("[year]-[month]-[day]")).ok()
}

/// Remaining term: days when known, otherwise the months column.
///
/// More than 30 days is shown as rounded months.
pub fn format_dias_meses(dias: Option<f64>, meses: Option<f64>) -> String {
    if let Some(days) = dias.filter(|d| d.is_finite()) {
        if days > 30.0 {
            let months = (days / 30.0).round() as i64;
            return format!("{months} {} aprox", plural(months, "mes", "meses"));
        }
        return format!("{} días", days.round() as i64);
    }

    match meses {
        Some(months) => format_meses_friendly(months),
        None => EMPTY.to_owned(),
    }
}

/// Month count in words: weeks below one month, years past twelve.
pub fn format_meses_friendly(months: f64) -> String {
    if !months.is_finite() {
        return EMPTY.to_owned();
    }

    if months < 1.0 {
        let weeks = ((months * 10.0).round() as i64).max(1);
        return format!("{weeks} {}", plural(weeks, "semana", "semanas"));
    }

    if months >= 12.0 {
        let years = (months / 12.0).floor() as i64;
        let remaining = (months % 12.0).floor() as i64;
        let years_text = format!("{years} {}", plural(years, "año", "años"));
        if remaining > 0 {
            return format!(
                "{years_text} {remaining} {} aprox",
                plural(remaining, "mes", "meses")
            );
        }
        return format!("{years_text} aprox");
    }

    let whole = months.floor() as i64;
    format!("{whole} {} aprox", plural(whole, "mes", "meses"))
}

fn plural(count: i64, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}
