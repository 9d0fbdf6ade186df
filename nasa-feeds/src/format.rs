//! Small text helpers shared by the fetchers.

use serde_json::Value;

/// Rounds to a whole number and groups thousands with commas (`12345.6` -> `"12,346"`).
pub fn thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if value < 0.0 && rounded != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Reads a number that upstream may send either as a JSON number or as a numeric string.
pub fn loose_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(0.0, "0")]
    #[test_case(999.4, "999")]
    #[test_case(1000.0, "1,000")]
    #[test_case(10_000.0, "10,000")]
    #[test_case(500_000.0, "500,000")]
    #[test_case(1_234_567.8, "1,234,568")]
    #[test_case(-42_000.0, "-42,000")]
    fn test_thousands(value: f64, expected: &str) {
        assert_eq!(thousands(value), expected);
    }

    #[test]
    fn test_loose_f64() {
        assert_eq!(loose_f64(&json!(12.5)), Some(12.5));
        assert_eq!(loose_f64(&json!("-3.25")), Some(-3.25));
        assert_eq!(loose_f64(&json!("fast")), None);
        assert_eq!(loose_f64(&json!(null)), None);
    }

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("Earth • Jan", 7), "Earth •");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
