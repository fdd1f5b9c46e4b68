use rusqlite::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

type TypedParser = fn(&str) -> Option<TypedValue>;

// Tried in order; the first parser that accepts the text wins.
const PARSERS: [TypedParser; 3] = [parse_null, parse_integer, parse_real];

/// Coerces free text into the most specific value it reads as, falling back
/// to text.
pub fn parse_typed(raw: &str) -> TypedValue {
    PARSERS
        .iter()
        .find_map(|parser| parser(raw))
        .unwrap_or_else(|| TypedValue::Text(raw.to_string()))
}

fn parse_null(raw: &str) -> Option<TypedValue> {
    raw.eq_ignore_ascii_case("null").then_some(TypedValue::Null)
}

fn parse_integer(raw: &str) -> Option<TypedValue> {
    raw.trim().parse::<i64>().ok().map(TypedValue::Integer)
}

fn parse_real(raw: &str) -> Option<TypedValue> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(TypedValue::Real)
}

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        match value {
            TypedValue::Null => Value::Null,
            TypedValue::Integer(number) => Value::Integer(number),
            TypedValue::Real(number) => Value::Real(number),
            TypedValue::Text(text) => Value::Text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_most_specific_type() {
        assert_eq!(parse_typed("42"), TypedValue::Integer(42));
        assert_eq!(parse_typed(" -7 "), TypedValue::Integer(-7));
        assert_eq!(parse_typed("2.5"), TypedValue::Real(2.5));
        assert_eq!(parse_typed("NULL"), TypedValue::Null);
        assert_eq!(parse_typed("S1E1-S1E3"), TypedValue::Text("S1E1-S1E3".to_string()));
    }

    #[test]
    fn non_finite_numbers_stay_text() {
        assert_eq!(parse_typed("inf"), TypedValue::Text("inf".to_string()));
        assert_eq!(parse_typed("NaN"), TypedValue::Text("NaN".to_string()));
    }

    #[test]
    fn converts_into_sqlite_values() {
        assert_eq!(Value::from(TypedValue::Integer(3)), Value::Integer(3));
        assert_eq!(
            Value::from(TypedValue::Text("x".to_string())),
            Value::Text("x".to_string())
        );
    }
}
