//! Typed literal values carried by actions
//!
//! Downstream emitters format integers and floats differently, so the
//! integer/float distinction made while parsing must survive serialization.

use std::fmt;

use serde::{Serialize, Serializer};

/// A literal pulled out of instruction text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl Literal {
    /// Parse numeric text. Values with no fractional part become integers,
    /// so `42.0` is `Integer(42)` and `3.5` is `Float(3.5)`.
    pub fn from_number_text(text: &str) -> Option<Literal> {
        let value: f64 = text.trim().parse().ok()?;
        Literal::from_f64(value)
    }

    pub fn from_f64(value: f64) -> Option<Literal> {
        if !value.is_finite() {
            return None;
        }
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Some(Literal::Integer(value as i64))
        } else {
            Some(Literal::Float(value))
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(i) => Some(*i as f64),
            Literal::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Coerce a bare token: quoted string, number, boolean, null, else raw string
    pub fn coerce(text: &str) -> Literal {
        let trimmed = text.trim().trim_end_matches(['.', ',', ';']).trim();
        if let Some(inner) = strip_quotes(trimmed) {
            return Literal::String(inner.to_string());
        }
        if let Some(number) = Literal::from_number_text(trimmed) {
            return number;
        }
        match trimmed.to_lowercase().as_str() {
            "true" => Literal::Boolean(true),
            "false" => Literal::Boolean(false),
            "null" => Literal::Null,
            _ => Literal::String(trimmed.to_string()),
        }
    }
}

fn strip_quotes(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    let first = text.chars().next()?;
    let last = text.chars().last()?;
    if (first == '"' || first == '\'') && first == last {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::String(s) => serializer.serialize_str(s),
            Literal::Integer(i) => serializer.serialize_i64(*i),
            Literal::Float(x) => serializer.serialize_f64(*x),
            Literal::Boolean(b) => serializer.serialize_bool(*b),
            Literal::Null => serializer.serialize_unit(),
        }
    }
}

/// What a verify step compares against
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedValue {
    Literal(Literal),
    /// Field must be present
    Exists,
    /// Field must be absent
    DoesNotExist,
}

impl From<Literal> for ExpectedValue {
    fn from(literal: Literal) -> Self {
        ExpectedValue::Literal(literal)
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedValue::Literal(l) => write!(f, "{}", l),
            ExpectedValue::Exists => write!(f, "exists"),
            ExpectedValue::DoesNotExist => write!(f, "does_not_exist"),
        }
    }
}

impl Serialize for ExpectedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExpectedValue::Literal(l) => l.serialize(serializer),
            ExpectedValue::Exists => serializer.serialize_str("exists"),
            ExpectedValue::DoesNotExist => serializer.serialize_str("does_not_exist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_float_distinction() {
        assert_eq!(Literal::from_number_text("42"), Some(Literal::Integer(42)));
        assert_eq!(Literal::from_number_text("42.0"), Some(Literal::Integer(42)));
        assert_eq!(Literal::from_number_text("-7"), Some(Literal::Integer(-7)));
        assert_eq!(Literal::from_number_text("3.5"), Some(Literal::Float(3.5)));
        assert_eq!(Literal::from_number_text("abc"), None);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Literal::coerce("\"hello\""), Literal::String("hello".into()));
        assert_eq!(Literal::coerce("'x'"), Literal::String("x".into()));
        assert_eq!(Literal::coerce("1."), Literal::Integer(1));
        assert_eq!(Literal::coerce("TRUE"), Literal::Boolean(true));
        assert_eq!(Literal::coerce("null"), Literal::Null);
        assert_eq!(Literal::coerce("John Doe"), Literal::String("John Doe".into()));
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(serde_json::to_string(&Literal::Integer(1)).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Literal::Float(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Literal::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&ExpectedValue::DoesNotExist).unwrap(),
            "\"does_not_exist\""
        );
        assert_eq!(serde_json::to_string(&ExpectedValue::Exists).unwrap(), "\"exists\"");
    }
}
