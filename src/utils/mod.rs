//! Formatting helpers for ledger amounts
//!
//! The engine works in fixed-point scales (prices and quantities x100,
//! amounts x10_000). These helpers bring values back to reais and format
//! them with Brazilian conventions: `.` for thousands, `,` for decimals.

use rust_decimal::Decimal;

use crate::db::FIXED_POINT_SCALE;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// No currency symbol (quantities, index levels)
    None,
}

/// Core formatting function with full control over output.
///
/// # Examples
/// ```
/// use invest::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::BRL),
///     "R$ 1.234,56"
/// );
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1.234,00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (.) to integer part
    let mut with_separators = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            with_separators.push('.');
        }
        with_separators.push(c);
    }

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::None => "",
    };
    let result = format!("{}{}{},{}", prefix, sign, with_separators, decimal_part);

    if width > 0 && result.chars().count() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// "R$ 1.234,56"
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::BRL)
}

/// "1.234,56"
pub fn format_decimal_br(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

/// Amount in product scale (x10_000) as reais
///
/// ```
/// use invest::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(10000000)), "R$ 1.000,00");
/// ```
pub fn format_amount(scaled: Decimal) -> String {
    let scale = Decimal::from(FIXED_POINT_SCALE * FIXED_POINT_SCALE);
    format_currency(scaled / scale)
}

/// Price in price scale (x100) as reais
pub fn format_price(scaled: Decimal) -> String {
    format_currency(scaled / Decimal::from(FIXED_POINT_SCALE))
}

/// Quantity or index level in x100 scale, without symbol
pub fn format_units(scaled: Decimal) -> String {
    format_decimal_br(scaled / Decimal::from(FIXED_POINT_SCALE))
}

/// Ratio as percentage: 0.1234 -> "12,34%"
pub fn format_percent(ratio: Decimal) -> String {
    format!("{}%", format_decimal_br(ratio * Decimal::ONE_HUNDRED))
}

/// Absent values render as an empty cell
pub fn or_blank<T>(value: Option<T>, format: impl Fn(T) -> String) -> String {
    value.map(format).unwrap_or_default()
}
