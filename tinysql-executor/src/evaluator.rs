// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! WHERE-clause evaluation
//!
//! Evaluates a filter expression against one row. AND/OR short-circuit;
//! comparisons against NULL yield false (three-valued logic flattened for
//! filtering); numeric operands compare by numeric value across concrete
//! types; mixed string/number comparison is an error the executor surfaces
//! as ERR 1064.

use tinysql_common::SqlError;
use tinysql_parser::ast::{BinaryOp, Expr, Literal};
use tinysql_storage::{ColumnDef, Row, Value};

/// Evaluate a filter expression to a boolean for one row.
pub fn evaluate(expr: &Expr, row: &Row, columns: &[ColumnDef]) -> Result<bool, SqlError> {
    match expr {
        Expr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => {
            if !evaluate(left, row, columns)? {
                return Ok(false);
            }
            evaluate(right, row, columns)
        }
        Expr::Binary {
            left,
            op: BinaryOp::Or,
            right,
        } => {
            if evaluate(left, row, columns)? {
                return Ok(true);
            }
            evaluate(right, row, columns)
        }
        Expr::Binary { left, op, right } => {
            let left = evaluate_value(left, row, columns)?;
            let right = evaluate_value(right, row, columns)?;
            compare(&left, *op, &right)
        }
        other => Ok(truthy(&evaluate_value(other, row, columns)?)),
    }
}

/// Evaluate a sub-expression to a value.
fn evaluate_value(expr: &Expr, row: &Row, columns: &[ColumnDef]) -> Result<Value, SqlError> {
    match expr {
        Expr::Column(name) => {
            let index = columns
                .iter()
                .position(|col| col.name == *name)
                .ok_or_else(|| {
                    SqlError::expression_error(format!(
                        "Unknown column in expression: {}",
                        name
                    ))
                })?;
            row.value(index).cloned().ok_or_else(|| {
                SqlError::expression_error(format!(
                    "Row has no value for column: {}",
                    name
                ))
            })
        }
        Expr::Literal(lit) => Ok(literal_value(lit)),
        Expr::Binary { left, op, right } => match op {
            BinaryOp::And | BinaryOp::Or => {
                Ok(Value::Bool(evaluate(expr, row, columns)?))
            }
            _ => {
                let left = evaluate_value(left, row, columns)?;
                let right = evaluate_value(right, row, columns)?;
                Ok(Value::Bool(compare(&left, *op, &right)?))
            }
        },
    }
}

/// A literal as it appears in an expression. Integers that fit i32 stay
/// narrow; floating-point literals are double-precision.
fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Integer(i) => match i32::try_from(*i) {
            Ok(narrow) => Value::Int(narrow),
            Err(_) => Value::BigInt(*i),
        },
        Literal::Float(f) => Value::Double(*f),
        Literal::String(s) => Value::Text(s.clone()),
        Literal::Boolean(b) => Value::Bool(*b),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(v) => *v != 0,
        Value::BigInt(v) => *v != 0,
        Value::Float(v) => v.abs() > f32::EPSILON,
        Value::Double(v) => v.abs() > f64::EPSILON,
        Value::Text(s) => !s.is_empty(),
    }
}

/// Compare two values under a comparison operator.
fn compare(left: &Value, op: BinaryOp, right: &Value) -> Result<bool, SqlError> {
    if left.is_null() || right.is_null() {
        return Ok(false);
    }

    let ordering = ordering_of(left, right)?;
    Ok(match op {
        BinaryOp::Eq => ordering == std::cmp::Ordering::Equal,
        BinaryOp::NotEq => ordering != std::cmp::Ordering::Equal,
        BinaryOp::Lt => ordering == std::cmp::Ordering::Less,
        BinaryOp::Gt => ordering == std::cmp::Ordering::Greater,
        BinaryOp::LtEq => ordering != std::cmp::Ordering::Greater,
        BinaryOp::GtEq => ordering != std::cmp::Ordering::Less,
        BinaryOp::And | BinaryOp::Or => unreachable!("handled by evaluate"),
    })
}

fn ordering_of(left: &Value, right: &Value) -> Result<std::cmp::Ordering, SqlError> {
    use std::cmp::Ordering;

    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::BigInt(a), Value::BigInt(b)) => Ok(a.cmp(b)),
        (Value::Int(a), Value::BigInt(b)) => Ok((*a as i64).cmp(b)),
        (Value::BigInt(a), Value::Int(b)) => Ok(a.cmp(&(*b as i64))),
        _ => {
            let (a, b) = match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(SqlError::expression_error(format!(
                        "Cannot compare {} with {}",
                        type_name(left),
                        type_name(right)
                    )));
                }
            };
            Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Int(_) | Value::BigInt(_) => "integer",
        Value::Float(_) | Value::Double(_) => "floating-point",
        Value::Text(_) => "string",
        Value::Bool(_) => "boolean",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinysql_common::DataType;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", DataType::Int),
            ColumnDef::new("name", DataType::Varchar),
            ColumnDef::new("score", DataType::Double),
        ]
    }

    fn row(id: i32, name: &str, score: f64) -> Row {
        Row::new(vec![
            Value::Int(id),
            Value::Text(name.to_string()),
            Value::Double(score),
        ])
    }

    fn col(name: &str) -> Expr {
        Expr::Column(name.to_string())
    }

    fn int(v: i64) -> Expr {
        Expr::Literal(Literal::Integer(v))
    }

    fn text(v: &str) -> Expr {
        Expr::Literal(Literal::String(v.to_string()))
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    #[test]
    fn test_integer_comparisons() {
        let cols = columns();
        let r = row(5, "a", 1.0);

        assert!(evaluate(&binary(col("id"), BinaryOp::Eq, int(5)), &r, &cols).unwrap());
        assert!(evaluate(&binary(col("id"), BinaryOp::Gt, int(4)), &r, &cols).unwrap());
        assert!(evaluate(&binary(col("id"), BinaryOp::LtEq, int(5)), &r, &cols).unwrap());
        assert!(!evaluate(&binary(col("id"), BinaryOp::NotEq, int(5)), &r, &cols).unwrap());
    }

    #[test]
    fn test_cross_type_numeric_comparison() {
        let cols = columns();
        let r = row(2, "a", 2.5);

        // INT column against a float literal
        let expr = binary(col("id"), BinaryOp::Lt, Expr::Literal(Literal::Float(2.5)));
        assert!(evaluate(&expr, &r, &cols).unwrap());

        // DOUBLE column against an integer literal
        let expr = binary(col("score"), BinaryOp::Gt, int(2));
        assert!(evaluate(&expr, &r, &cols).unwrap());
    }

    #[test]
    fn test_string_comparison() {
        let cols = columns();
        let r = row(1, "banana", 0.0);

        assert!(evaluate(&binary(col("name"), BinaryOp::Eq, text("banana")), &r, &cols).unwrap());
        assert!(evaluate(&binary(col("name"), BinaryOp::Gt, text("apple")), &r, &cols).unwrap());
        assert!(evaluate(&binary(col("name"), BinaryOp::Lt, text("cherry")), &r, &cols).unwrap());
    }

    #[test]
    fn test_mixed_string_number_is_error() {
        let cols = columns();
        let r = row(1, "a", 0.0);

        let err =
            evaluate(&binary(col("name"), BinaryOp::Eq, int(1)), &r, &cols).unwrap_err();
        assert_eq!(err.code, 1064);
    }

    #[test]
    fn test_null_comparison_is_false() {
        let cols = vec![ColumnDef::new("v", DataType::Int)];
        let r = Row::new(vec![Value::Null]);

        assert!(!evaluate(&binary(col("v"), BinaryOp::Eq, int(1)), &r, &cols).unwrap());
        assert!(!evaluate(&binary(col("v"), BinaryOp::NotEq, int(1)), &r, &cols).unwrap());
        assert!(
            !evaluate(
                &binary(col("v"), BinaryOp::Eq, Expr::Literal(Literal::Null)),
                &r,
                &cols
            )
            .unwrap()
        );
    }

    #[test]
    fn test_and_or_short_circuit() {
        let cols = columns();
        let r = row(3, "a", 0.0);

        // Right side references an unknown column but the left side decides.
        let and_expr = binary(
            binary(col("id"), BinaryOp::Eq, int(99)),
            BinaryOp::And,
            col("missing"),
        );
        assert!(!evaluate(&and_expr, &r, &cols).unwrap());

        let or_expr = binary(
            binary(col("id"), BinaryOp::Eq, int(3)),
            BinaryOp::Or,
            col("missing"),
        );
        assert!(evaluate(&or_expr, &r, &cols).unwrap());
    }

    #[test]
    fn test_unknown_column_is_error() {
        let cols = columns();
        let r = row(1, "a", 0.0);

        let err = evaluate(&binary(col("nope"), BinaryOp::Eq, int(1)), &r, &cols).unwrap_err();
        assert_eq!(err.code, 1064);
        assert!(err.message.contains("nope"));
    }
}
