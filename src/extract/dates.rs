//! Portuguese date strings: discovery in free text, numeric-to-localized
//! normalization, and conversion into a sortable calendar value.
//!
//! The localized form is `D de <mês> de YYYY`. Anything that cannot be
//! parsed sorts as [`EARLIEST`], never as an error.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Sortable value for dates that fail to parse; ranks after everything.
pub const EARLIEST: NaiveDate = NaiveDate::MIN;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

static LOCALIZED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2}\s+de\s+\w+\s+de\s+\d{4})").ok());
static NUMERIC: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").ok());
static LEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\d{1,2}\s+de\s+\w+\s+de\s+\d{4}\s*").ok());
static TRAILING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\d{1,2}\s+de\s+\w+\s+de\s+\d{4}$").ok());

pub fn find_localized(text: &str) -> Option<String> {
    let re = LOCALIZED.as_ref()?;
    re.captures(text).map(|c| c[1].to_string())
}

/// First `D/M/YYYY` date in `text`, rewritten in the localized form.
pub fn find_numeric(text: &str) -> Option<String> {
    let re = NUMERIC.as_ref()?;
    re.captures_iter(text).find_map(|c| {
        let day: u32 = c[1].parse().ok()?;
        let month: usize = c[2].parse().ok()?;
        let year = &c[3];
        let name = MONTHS.get(month.checked_sub(1)?)?;
        Some(format!("{day} de {name} de {year}"))
    })
}

pub fn find_date(text: &str) -> Option<String> {
    find_localized(text).or_else(|| find_numeric(text))
}

pub fn localized(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{:02} de {month} de {}", date.day(), date.year())
}

pub fn strip_leading_date(text: &str) -> String {
    match LEADING.as_ref() {
        Some(re) => re.replace(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

pub fn strip_trailing_date(text: &str) -> String {
    match TRAILING.as_ref() {
        Some(re) => re.replace(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let name = if name == "marco" { "março".to_string() } else { name };
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

/// Converts `D de <mês> de YYYY` into a calendar date, or [`EARLIEST`].
pub fn sortable(date_text: &str) -> NaiveDate {
    let parts: Vec<&str> = date_text.split_whitespace().collect();
    if parts.len() < 5 {
        return EARLIEST;
    }
    let parsed = (|| {
        let day: u32 = parts[0].parse().ok()?;
        let month = month_number(parts[2])?;
        let year: i32 = parts[4].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })();
    parsed.unwrap_or_else(|| {
        tracing::debug!(date_text, "unparseable date, ranking last");
        EARLIEST
    })
}
