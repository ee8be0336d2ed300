//! Typing of constant literals
//!
//! A `const` node stores its literal as text. The type is decided from the
//! text in a fixed order: bool, duration, integer, percent, float, and
//! finally plain string.

use alloc::string::String;

pub const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// A typed constant literal
#[derive(Debug, Clone)]
pub enum ConstValue {
    Bool(bool),
    /// Nanoseconds
    Duration(i64),
    Int(i32),
    /// Stored as a fraction: `"35%"` is `0.35`
    Percent(f64),
    Float(f64),
    Str(String),
}

impl ConstValue {
    pub fn parse(text: &str) -> Self {
        if text.eq_ignore_ascii_case("true") {
            return ConstValue::Bool(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return ConstValue::Bool(false);
        }
        if let Some(nanos) = parse_duration(text) {
            return ConstValue::Duration(nanos);
        }
        if let Ok(n) = text.parse::<i32>() {
            return ConstValue::Int(n);
        }
        if text.len() > 1 {
            if let Some(number) = text.strip_suffix('%') {
                if let Ok(f) = number.parse::<f64>() {
                    return ConstValue::Percent(f / 100.0);
                }
            }
        }
        if let Ok(f) = text.parse::<f64>() {
            return ConstValue::Float(f);
        }
        ConstValue::Str(text.into())
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ConstValue::Int(n) => Some(*n as f64),
            ConstValue::Percent(f) | ConstValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The literal read as a time offset. Plain numbers are seconds.
    pub fn as_duration(&self) -> Option<i64> {
        match self {
            ConstValue::Duration(nanos) => Some(*nanos),
            _ => self.as_number().map(|s| (s * NANOS_PER_SECOND) as i64),
        }
    }
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Bool(a), ConstValue::Bool(b)) => a == b,
            (ConstValue::Duration(a), ConstValue::Duration(b)) => a == b,
            (ConstValue::Str(a), ConstValue::Str(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
                _ => false,
            },
        }
    }
}

fn unit_nanos(unit: &str) -> Option<f64> {
    Some(match unit {
        "ns" => 1.0,
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000.0,
        "ms" => 1_000_000.0,
        "s" => NANOS_PER_SECOND,
        "m" => 60.0 * NANOS_PER_SECOND,
        "h" => 3600.0 * NANOS_PER_SECOND,
        _ => return None,
    })
}

/// Parse a duration such as `"-1.5s"`, `"100ms"` or `"1m30s"` into
/// nanoseconds. Every number needs a unit, except a bare `"0"`.
pub fn parse_duration(text: &str) -> Option<i64> {
    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if rest == "0" {
        return Some(0);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total = 0.0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return None;
        }
        let value = number.parse::<f64>().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_nanos(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        total += value * scale;
    }

    // f64::round is not available without std
    let nanos = (total + 0.5) as i64;
    Some(if negative { -nanos } else { nanos })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_order() {
        assert!(matches!(ConstValue::parse("True"), ConstValue::Bool(true)));
        assert!(matches!(ConstValue::parse("-2s"), ConstValue::Duration(-2_000_000_000)));
        assert!(matches!(ConstValue::parse("0"), ConstValue::Duration(0)));
        assert!(matches!(ConstValue::parse("42"), ConstValue::Int(42)));
        assert!(matches!(
            ConstValue::parse("35%"),
            ConstValue::Percent(p) if (p - 0.35).abs() < 1e-9
        ));
        assert!(matches!(ConstValue::parse("2.5"), ConstValue::Float(_)));
        assert!(matches!(ConstValue::parse("Heal"), ConstValue::Str(_)));
        assert!(matches!(ConstValue::parse(""), ConstValue::Str(_)));
        assert!(matches!(ConstValue::parse("%"), ConstValue::Str(_)));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1.5s"), Some(1_500_000_000));
        assert_eq!(parse_duration("100ms"), Some(100_000_000));
        assert_eq!(parse_duration("1m30s"), Some(90_000_000_000));
        assert_eq!(parse_duration("-.5s"), Some(-500_000_000));
        assert_eq!(parse_duration("1h"), Some(3_600_000_000_000));
        assert_eq!(parse_duration("5"), None);
        assert_eq!(parse_duration("s"), None);
        assert_eq!(parse_duration("1x"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("-"), None);
    }

    #[test]
    fn test_numeric_equality_by_value() {
        assert_eq!(ConstValue::parse("1.0s"), ConstValue::parse("1s"));
        assert_eq!(ConstValue::parse("1000ms"), ConstValue::parse("1s"));
        assert_eq!(ConstValue::parse("50"), ConstValue::parse("50.0"));
        assert_eq!(ConstValue::parse("50%"), ConstValue::parse("0.5"));
        assert_eq!(ConstValue::parse("TRUE"), ConstValue::parse("true"));
        assert_ne!(ConstValue::parse("1"), ConstValue::parse("1s"));
        assert_ne!(ConstValue::parse("abc"), ConstValue::parse("ABC"));
    }

    #[test]
    fn test_as_duration() {
        assert_eq!(ConstValue::parse("-2s").as_duration(), Some(-2_000_000_000));
        assert_eq!(ConstValue::parse("-3").as_duration(), Some(-3_000_000_000));
        assert_eq!(ConstValue::parse("soon").as_duration(), None);
        assert_eq!(ConstValue::parse("true").as_duration(), None);
    }
}
