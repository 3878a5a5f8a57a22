//! Amount parsing for loosely formatted provider values.
//!
//! Handles plain JSON numbers and strings such as `"$1,299.99"`,
//! `"1.299,99 TL"`, `"₺849"` or `"4,5 / 5"`.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// First run of digits with embedded separators.
    static ref AMOUNT_TOKEN: Regex = Regex::new(r"\d[\d.,]*").unwrap();
}

/// Parse a JSON number or formatted string into a finite amount.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_amount_text(s),
        _ => None,
    }
}

/// Parse the first amount in free text.
///
/// A minus sign before the amount, with only currency symbols or spaces in
/// between, makes the text unparseable.
pub fn parse_amount_text(text: &str) -> Option<f64> {
    let found = AMOUNT_TOKEN.find(text)?;
    if is_negated(&text[..found.start()]) {
        return None;
    }
    parse_token(found.as_str().trim_end_matches(['.', ',']))
}

fn is_negated(prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches(|c: char| !c.is_alphanumeric() && !is_minus(c));
    let Some(rest) = prefix.strip_suffix(is_minus) else {
        return false;
    };
    !rest.chars().next_back().is_some_and(char::is_alphanumeric)
}

fn is_minus(c: char) -> bool {
    c == '-' || c == '\u{2212}'
}

/// Separator rules:
/// - both `,` and `.` present: the last one is the decimal separator;
/// - one kind present, the first group is 1-3 digits without a leading zero
///   and every later group has three digits: thousands separator;
/// - one kind present once otherwise: decimal separator;
/// - anything else is ambiguous and rejected.
fn parse_token(token: &str) -> Option<f64> {
    let normalized = match (token.rfind(','), token.rfind('.')) {
        (Some(comma), Some(dot)) => {
            let (decimal_at, thousands) = if comma > dot {
                (comma, '.')
            } else {
                (dot, ',')
            };
            let (int_part, frac_part) = token.split_at(decimal_at);
            let decimal = if thousands == '.' { ',' } else { '.' };
            if int_part.contains(decimal) {
                return None;
            }
            format!("{}.{}", int_part.replace(thousands, ""), &frac_part[1..])
        }
        (Some(_), None) => resolve_single_separator(token, ',')?,
        (None, Some(_)) => resolve_single_separator(token, '.')?,
        (None, None) => token.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn resolve_single_separator(token: &str, separator: char) -> Option<String> {
    let groups: Vec<&str> = token.split(separator).collect();

    let lead = groups[0];
    let is_thousands = (1..=3).contains(&lead.len())
        && !lead.starts_with('0')
        && groups[1..].iter().all(|g| g.len() == 3);
    if is_thousands {
        return Some(groups.concat());
    }

    match groups.as_slice() {
        [int_part, frac_part] => Some(format!("{}.{}", int_part, frac_part)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(parse_amount(&Value::from(80)), Some(80.0));
        assert_eq!(parse_amount(&Value::from(1299.99)), Some(1299.99));
        assert_eq!(parse_amount(&Value::Null), None);
        assert_eq!(parse_amount(&Value::Bool(true)), None);
    }

    #[test]
    fn test_currency_symbols_and_codes() {
        assert_eq!(parse_amount_text("$19.99"), Some(19.99));
        assert_eq!(parse_amount_text("₺849"), Some(849.0));
        assert_eq!(parse_amount_text("849 TL"), Some(849.0));
        assert_eq!(parse_amount_text("EUR 12"), Some(12.0));
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(parse_amount_text("$1,299.99"), Some(1299.99));
        assert_eq!(parse_amount_text("1.299,99 TL"), Some(1299.99));
        assert_eq!(parse_amount_text("1,299"), Some(1299.0));
        assert_eq!(parse_amount_text("1.299.000 TL"), Some(1_299_000.0));
        assert_eq!(parse_amount_text("12,345,678.50"), Some(12_345_678.5));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_amount_text("12,50 €"), Some(12.5));
        assert_eq!(parse_amount_text("4,5 / 5"), Some(4.5));
        assert_eq!(parse_amount_text("1.5"), Some(1.5));
        assert_eq!(parse_amount_text("$0.500"), Some(0.5));
        assert_eq!(parse_amount_text("0.999"), Some(0.999));
        assert_eq!(parse_amount_text("0,750 TL"), Some(0.75));
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(parse_amount_text("-$5"), None);
        assert_eq!(parse_amount_text("-5"), None);
        assert_eq!(parse_amount_text("TL -1.299,99"), None);
        assert_eq!(parse_amount_text("\u{2212}12,50 €"), None);
        assert_eq!(parse_amount(&Value::from("-19.99")), None);
    }

    #[test]
    fn test_hyphen_inside_words_is_not_a_sign() {
        assert_eq!(parse_amount_text("Wi-Fi 6 router"), Some(6.0));
        assert_eq!(parse_amount_text("10 - 20 TL"), Some(10.0));
    }

    #[test]
    fn test_trailing_separator() {
        assert_eq!(parse_amount_text("849."), Some(849.0));
        assert_eq!(parse_amount_text("Price: 15, shipping free"), Some(15.0));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_amount_text(""), None);
        assert_eq!(parse_amount_text("Call for price"), None);
        assert_eq!(parse_amount_text("1,2,3"), None);
        assert_eq!(parse_amount_text("1,299,99.5,1"), None);
    }
}
