//! Free text → numeric price with a best-effort currency.

use crate::types::ParsedAmount;
use regex::Regex;
use std::sync::OnceLock;

/// Leading symbols the parser recognises and the codes they stand for.
/// Composite symbols come first so `R$` is not read as a bare `$`.
const SYMBOL_CURRENCIES: &[(&str, &str)] = &[
    ("R$", "BRL"),
    ("kr", "SEK"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("₹", "INR"),
    ("¥", "JPY"),
];

/// ISO 4217 codes accepted after a number. Other three-letter words such as
/// `OFF` or `NEW` are not currencies.
const KNOWN_CODES: &[&str] = &[
    "AED", "ARS", "AUD", "BGN", "BRL", "CAD", "CHF", "CLP", "CNY", "COP", "CZK", "DKK", "EGP",
    "EUR", "GBP", "HKD", "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KRW", "MXN", "MYR", "NGN",
    "NOK", "NZD", "PEN", "PHP", "PKR", "PLN", "RON", "RUB", "SAR", "SEK", "SGD", "THB", "TRY",
    "TWD", "UAH", "USD", "VND", "ZAR",
];

static PRICE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn price_pattern() -> &'static Regex {
    PRICE_PATTERN.get_or_init(|| {
        Regex::new(r"(R\$|\bkr|[₹$€£¥])?\s*([0-9][0-9,.]*)(?:\s*([A-Z]{3})\b)?")
            .expect("valid price pattern")
    })
}

pub fn currency_from_symbol(symbol: &str) -> &'static str {
    SYMBOL_CURRENCIES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, code)| *code)
        .unwrap_or("")
}

/// Parse the first price-looking token in `text`.
///
/// Returns `None` when no numeric token is present or the number is not finite.
/// A bare number is still a valid parse, with `has_currency_signal == false`.
pub fn parse(text: &str) -> Option<ParsedAmount> {
    let cleaned = collapse_whitespace(text);
    if cleaned.is_empty() {
        return None;
    }

    let caps = price_pattern().captures(&cleaned)?;
    let symbol = caps.get(1).map(|m| m.as_str());
    let code = caps
        .get(3)
        .map(|m| m.as_str())
        .filter(|code| KNOWN_CODES.contains(code));
    let value = normalize_number(caps.get(2)?.as_str())?;

    let currency = match (code, symbol) {
        (Some(code), _) => code.to_string(),
        (None, Some(symbol)) => currency_from_symbol(symbol).to_string(),
        (None, None) => String::new(),
    };

    Some(ParsedAmount {
        value,
        currency,
        has_currency_signal: code.is_some() || symbol.is_some(),
    })
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `.`/`,` into a single decimal point and convert.
///
/// - both present: whichever comes last is the decimal point
/// - comma only: decimal iff exactly two digits follow the last comma
/// - dot only: read as a plain decimal
fn normalize_number(token: &str) -> Option<f64> {
    // "12.99." at the end of a sentence.
    let token = token.trim_end_matches([',', '.']);

    let normalized = match (token.rfind(','), token.rfind('.')) {
        (Some(comma), Some(dot)) => with_decimal_at(token, comma.max(dot)),
        (Some(comma), None) if token.len() - comma - 1 == 2 => with_decimal_at(token, comma),
        (Some(_), None) => token.replace(',', ""),
        (None, _) => token.to_string(),
    };

    leading_decimal(&normalized)
}

/// Keep `token[idx]` as the decimal point and drop every other separator.
fn with_decimal_at(token: &str, idx: usize) -> String {
    let (int_part, frac_part) = token.split_at(idx);
    let digits: String = int_part.chars().filter(char::is_ascii_digit).collect();
    format!("{}.{}", digits, &frac_part[1..])
}

/// Longest prefix that reads as a decimal number, so `1.234.567` yields `1.234`.
fn leading_decimal(s: &str) -> Option<f64> {
    let end = s.match_indices('.').nth(1).map_or(s.len(), |(i, _)| i);
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str) -> f64 {
        parse(text).expect("should parse").value
    }

    #[test]
    fn separator_styles_agree() {
        assert_eq!(value("1,234.56"), 1234.56);
        assert_eq!(value("1.234,56"), 1234.56);
        assert_eq!(value("1234.56"), 1234.56);
    }

    #[test]
    fn dollar_amount_with_thousands() {
        let parsed = parse("$1,234.50").unwrap();
        assert_eq!(parsed.value, 1234.50);
        assert_eq!(parsed.currency, "USD");
        assert!(parsed.has_currency_signal);
    }

    #[test]
    fn lone_comma_with_two_digits_is_decimal() {
        assert_eq!(value("12,99"), 12.99);
        assert_eq!(value("1,200"), 1200.0);
        assert_eq!(value("1,234,567"), 1_234_567.0);
    }

    #[test]
    fn no_number_means_no_parse() {
        assert!(parse("no price here").is_none());
        assert!(parse("").is_none());
        assert!(parse("   \n\t ").is_none());
    }

    #[test]
    fn trailing_code_beats_symbol() {
        let parsed = parse("$ 49.00 CAD").unwrap();
        assert_eq!(parsed.currency, "CAD");
        assert!(parsed.has_currency_signal);

        let parsed = parse("1299 INR").unwrap();
        assert_eq!(parsed.value, 1299.0);
        assert_eq!(parsed.currency, "INR");
    }

    #[test]
    fn unknown_trailing_word_is_not_a_currency() {
        let parsed = parse("$5 OFF").unwrap();
        assert_eq!(parsed.value, 5.0);
        assert_eq!(parsed.currency, "USD");

        let parsed = parse("3 NEW").unwrap();
        assert_eq!(parsed.currency, "");
        assert!(!parsed.has_currency_signal);
    }

    #[test]
    fn kr_inside_a_word_is_not_a_symbol() {
        let parsed = parse("Pokr 12").unwrap();
        assert_eq!(parsed.value, 12.0);
        assert_eq!(parsed.currency, "");
        assert!(!parsed.has_currency_signal);
    }

    #[test]
    fn symbol_table_lookup() {
        assert_eq!(parse("€ 19,90").unwrap().currency, "EUR");
        assert_eq!(parse("£7").unwrap().currency, "GBP");
        assert_eq!(parse("₹ 2,499").unwrap().currency, "INR");
        assert_eq!(parse("¥1200").unwrap().currency, "JPY");
        assert_eq!(parse("R$ 89,90").unwrap().currency, "BRL");
        assert_eq!(parse("kr 349").unwrap().currency, "SEK");
    }

    #[test]
    fn bare_number_has_no_currency_signal() {
        let parsed = parse("Only 42 left").unwrap();
        assert_eq!(parsed.value, 42.0);
        assert_eq!(parsed.currency, "");
        assert!(!parsed.has_currency_signal);
    }

    #[test]
    fn whitespace_is_collapsed_before_matching() {
        let parsed = parse("\n   Now:\n   $\n   24.99\n  ").unwrap();
        assert_eq!(parsed.value, 24.99);
        assert_eq!(parsed.currency, "USD");
    }

    #[test]
    fn sentence_punctuation_is_ignored() {
        assert_eq!(value("It costs $12.50."), 12.5);
        assert_eq!(value("Price: 12,99, shipping free"), 12.99);
    }

    #[test]
    fn repeated_dots_read_as_leading_decimal() {
        assert_eq!(value("1.234.567"), 1.234);
    }

    #[test]
    fn overflowing_number_is_rejected() {
        let huge = "9".repeat(400);
        assert!(parse(&huge).is_none());
    }
}
