use super::FieldType;
use crate::value::Value;

/// `float`: numeric strings with optional `$` and `,` decoration.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

/// `currency`: like `float`, rounded to cents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyType;

impl FieldType for FloatType {
    fn tag(&self) -> &str {
        "float"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Float(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::Integer(_) | Value::String(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        parse_decimal(value).map(Value::Float).unwrap_or(Value::Null)
    }
}

impl FieldType for CurrencyType {
    fn tag(&self) -> &str {
        "currency"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Float(f) if round_cents(*f) == *f)
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::Integer(_) | Value::Float(_) | Value::String(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        let parsed = match value {
            Value::Float(f) => Some(*f),
            other => parse_decimal(other),
        };
        parsed
            .filter(|f| f.is_finite())
            .map(|f| Value::Float(round_cents(f)))
            .unwrap_or(Value::Null)
    }
}

fn round_cents(f: f64) -> f64 {
    (f * 100.0).round() / 100.0
}

/// Accepts integers, and strings made only of `[0-9$.,-]` once trimmed.
/// `$` and `,` are stripped before parsing.
fn parse_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || !s.chars().all(is_decimal_char) {
                return None;
            }
            let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

fn is_decimal_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '$' | '.' | ',' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_strips_decoration() {
        assert_eq!(CurrencyType.coerce(&Value::from("$12,345.67")), Value::Float(12345.67));
        assert_eq!(CurrencyType.coerce(&Value::from("-$1.5")), Value::Float(-1.5));
    }

    #[test]
    fn test_currency_rejects_foreign_characters() {
        assert_eq!(CurrencyType.coerce(&Value::from("$3.o1")), Value::Null);
        assert_eq!(CurrencyType.coerce(&Value::from("1e3")), Value::Null);
        assert_eq!(CurrencyType.coerce(&Value::from("$")), Value::Null);
    }

    #[test]
    fn test_currency_rounds_to_cents() {
        assert_eq!(CurrencyType.coerce(&Value::Float(1.005_1)), Value::Float(1.01));
        assert_eq!(CurrencyType.coerce(&Value::Integer(3)), Value::Float(3.0));
    }

    #[test]
    fn test_float_does_not_round() {
        assert_eq!(FloatType.coerce(&Value::from("1,000.125")), Value::Float(1000.125));
        assert_eq!(FloatType.coerce(&Value::Integer(7)), Value::Float(7.0));
        assert_eq!(FloatType.coerce(&Value::Bool(true)), Value::Null);
    }
}
