// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Cell values

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The numeric magnitude, when this value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::BigInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Render for the text protocol. NULL renders to `None` (the row encoder
    /// emits the 0xFB marker). FLOAT uses two fraction digits, DOUBLE four,
    /// booleans `TRUE`/`FALSE`.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(v) => Some(v.to_string()),
            Value::BigInt(v) => Some(v.to_string()),
            Value::Float(v) => Some(format!("{:.2}", v)),
            Value::Double(v) => Some(format!("{:.4}", v)),
            Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.render() {
            Some(s) => f.write_str(&s),
            None => f.write_str("NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_integers() {
        assert_eq!(Value::Int(42).render().as_deref(), Some("42"));
        assert_eq!(Value::Int(-7).render().as_deref(), Some("-7"));
        assert_eq!(
            Value::BigInt(9_000_000_000).render().as_deref(),
            Some("9000000000")
        );
    }

    #[test]
    fn test_render_floats() {
        assert_eq!(Value::Float(3.5).render().as_deref(), Some("3.50"));
        assert_eq!(Value::Double(2.25).render().as_deref(), Some("2.2500"));
        assert_eq!(Value::Double(-0.5).render().as_deref(), Some("-0.5000"));
    }

    #[test]
    fn test_render_bool_and_text() {
        assert_eq!(Value::Bool(true).render().as_deref(), Some("TRUE"));
        assert_eq!(Value::Bool(false).render().as_deref(), Some("FALSE"));
        assert_eq!(
            Value::Text("hello".to_string()).render().as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn test_render_null() {
        assert_eq!(Value::Null.render(), None);
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
