/// Utility helpers used by the collector and all adapters.
///
/// This module contains:
/// - Time helpers
/// - Ordered-alias field lookup over decoded JSON
/// - Quote-currency symbol splitting
///
/// IMPORTANT:
/// - No exchange-specific business logic should live here.
/// - Which alias list applies to which field is decided in the
///   adapter modules; this module only evaluates them.
///
use chrono::Utc;
use serde_json::Value;

/// Returns the current Unix timestamp in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Known quote currencies, in match priority order.
///
/// Order matters: the first suffix that matches wins, so the
/// stablecoins come before the crypto quotes.
pub const QUOTE_PRIORITY: [&str; 4] = ["USDT", "USDC", "BTC", "ETH"];

/// Split a bare symbol into (base, quote) by matching a known
/// quote-currency suffix from `QUOTE_PRIORITY`.
///
/// Examples:
/// - "BTCUSDT" -> Some(("BTC", "USDT"))
/// - "ETHBTC"  -> Some(("ETH", "BTC"))
/// - "FOO"     -> None
///
/// Returns None when no known suffix matches; the caller decides
/// the fallback. A symbol equal to a bare quote currency does not
/// match (the base must be non-empty).
pub fn split_quote(symbol: &str) -> Option<(String, String)> {
    let upper = symbol.to_uppercase();
    for quote in QUOTE_PRIORITY {
        if upper.len() > quote.len() && upper.ends_with(quote) {
            let base = &upper[..upper.len() - quote.len()];
            return Some((base.to_string(), quote.to_string()));
        }
    }
    None
}

/// Resolve a numeric field through an ordered alias list.
///
/// Keys are tried in order; the first present, coercible value
/// wins. A key may address one nested level with a dot path
/// ("k.c" reads `value["k"]["c"]`). Exchanges ship numbers both
/// as JSON numbers and as decimal strings; both coerce.
///
/// Returns 0.0 when no alias resolves. Never fails the message.
pub fn num_at(value: &Value, keys: &[&str]) -> f64 {
    for key in keys {
        if let Some(n) = value_at(value, key).and_then(coerce_num) {
            return n;
        }
    }
    0.0
}

/// Resolve an integer field (typically an epoch-millis timestamp)
/// through an ordered alias list.
///
/// Same lookup rules as `num_at`, but the absence of every alias
/// is reported as None so the caller can pick its own fallback.
pub fn int_at(value: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        match value_at(value, key) {
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Some(i);
                }
            }
            Some(Value::String(s)) => {
                if let Ok(i) = s.parse::<i64>() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn value_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn coerce_num(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_quote_matches_usdt() {
        assert_eq!(
            split_quote("BTCUSDT"),
            Some(("BTC".to_string(), "USDT".to_string()))
        );
    }

    #[test]
    fn split_quote_matches_crypto_quote() {
        assert_eq!(
            split_quote("ETHBTC"),
            Some(("ETH".to_string(), "BTC".to_string()))
        );
    }

    #[test]
    fn split_quote_matches_usdc() {
        assert_eq!(
            split_quote("BTCUSDC"),
            Some(("BTC".to_string(), "USDC".to_string()))
        );
    }

    #[test]
    fn split_quote_lowercase_input() {
        assert_eq!(
            split_quote("ethusdt"),
            Some(("ETH".to_string(), "USDT".to_string()))
        );
    }

    #[test]
    fn split_quote_unknown_suffix() {
        assert_eq!(split_quote("FOO"), None);
    }

    #[test]
    fn split_quote_bare_quote_currency_does_not_match() {
        assert_eq!(split_quote("USDT"), None);
    }

    #[test]
    fn num_at_takes_first_present_alias() {
        let v = json!({"p": "42.5", "c": "99.0"});
        assert_eq!(num_at(&v, &["c", "p"]), 99.0);
    }

    #[test]
    fn num_at_skips_missing_aliases() {
        let v = json!({"p": "42.5"});
        assert_eq!(num_at(&v, &["c", "p"]), 42.5);
    }

    #[test]
    fn num_at_coerces_numbers_and_strings() {
        assert_eq!(num_at(&json!({"x": 7}), &["x"]), 7.0);
        assert_eq!(num_at(&json!({"x": "7.25"}), &["x"]), 7.25);
    }

    #[test]
    fn num_at_defaults_to_zero() {
        assert_eq!(num_at(&json!({}), &["a", "b"]), 0.0);
        assert_eq!(num_at(&json!({"a": true}), &["a"]), 0.0);
    }

    #[test]
    fn num_at_dot_path() {
        let v = json!({"k": {"c": "105.5"}});
        assert_eq!(num_at(&v, &["c", "k.c"]), 105.5);
    }

    #[test]
    fn int_at_parses_string_millis() {
        let v = json!({"ts": "1704067200123"});
        assert_eq!(int_at(&v, &["ts"]), Some(1704067200123));
    }

    #[test]
    fn int_at_absent_is_none() {
        assert_eq!(int_at(&json!({}), &["E", "T"]), None);
    }
}
