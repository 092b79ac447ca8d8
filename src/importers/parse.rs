//! Brazilian-locale cell parsing shared by the ledger importers.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use encoding_rs::WINDOWS_1252;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::db::FIXED_POINT_SCALE;

/// Read a text file, falling back to Windows-1252 when it is not UTF-8
/// (spreadsheet exports on Brazilian Windows machines).
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("{:?} is not UTF-8, decoding as Windows-1252", path);
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            decoded.into_owned()
        }
    };
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// `;` when the header uses it, `,` otherwise
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

pub fn parse_date(text: &str) -> std::result::Result<NaiveDate, String> {
    let text = text.trim();
    for format in ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"] {
        match NaiveDate::parse_from_str(text, format) {
            // "05/01/23" parses as year 23 with %Y
            Ok(date) if date.year() >= 1000 => return Ok(date),
            _ => {}
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%y") {
        return Ok(date);
    }
    Err(format!("could not parse date '{}'", text))
}

/// Parse "1.234,56", "R$ 10,50", "-400" or "12.5" as a decimal.
///
/// With a comma present, dots are thousands separators.
pub fn parse_decimal(text: &str) -> std::result::Result<Decimal, String> {
    let cleaned: String = text
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    Decimal::from_str(&normalized).map_err(|_| format!("could not parse number '{}'", text.trim()))
}

/// Convert to the ledger's fixed-point integer (two implied decimals)
pub fn parse_fixed_point(text: &str) -> std::result::Result<i64, String> {
    let value = parse_decimal(text)?;
    (value * Decimal::from(FIXED_POINT_SCALE))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| format!("number out of range '{}'", text.trim()))
}
