// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Error types for the Tiny-SQL server

use thiserror::Error;

/// Infrastructure-level errors: I/O, framing, connection lifecycle.
///
/// SQL-level failures that become ERR packets use [`SqlError`] instead.
#[derive(Error, Debug)]
pub enum TinySqlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TinySqlError>;

/// A SQL-level error destined for the wire as an ERR packet.
///
/// `sql_state` must be exactly 5 ASCII characters; the ERR packet encoder
/// substitutes `HY000` for anything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ERROR {code} ({sql_state}): {message}")]
pub struct SqlError {
    pub code: u16,
    pub sql_state: String,
    pub message: String,
}

impl SqlError {
    pub fn new(code: u16, sql_state: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            sql_state: sql_state.to_string(),
            message: message.into(),
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(1064, "42000", format!("SQL syntax error: {}", detail))
    }

    pub fn no_database_selected() -> Self {
        Self::new(1046, "3D000", "No database selected")
    }

    pub fn unknown_database(name: &str) -> Self {
        Self::new(1049, "42000", format!("Unknown database '{}'", name))
    }

    pub fn unknown_table(name: &str) -> Self {
        Self::new(1051, "42S02", format!("Unknown table '{}'", name))
    }

    pub fn table_exists(name: &str) -> Self {
        Self::new(1050, "42S01", format!("Table '{}' already exists", name))
    }

    pub fn no_such_table(db: &str, table: &str) -> Self {
        Self::new(
            1146,
            "42S02",
            format!("Table '{}.{}' doesn't exist", db, table),
        )
    }

    pub fn unknown_column(name: &str) -> Self {
        Self::new(
            1054,
            "42S22",
            format!("Unknown column '{}' in 'field list'", name),
        )
    }

    pub fn column_count_mismatch() -> Self {
        Self::new(1136, "21S01", "Column count doesn't match value count")
    }

    pub fn constraint_violation(detail: impl std::fmt::Display) -> Self {
        Self::new(1062, "23000", detail.to_string())
    }

    pub fn expression_error(detail: impl std::fmt::Display) -> Self {
        Self::new(1064, "42000", detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_display() {
        let err = SqlError::no_database_selected();
        assert_eq!(err.code, 1046);
        assert_eq!(err.sql_state, "3D000");
        assert_eq!(
            err.to_string(),
            "ERROR 1046 (3D000): No database selected"
        );
    }

    #[test]
    fn test_sql_error_constructors() {
        assert_eq!(SqlError::unknown_database("nope").code, 1049);
        assert_eq!(SqlError::unknown_table("t").sql_state, "42S02");
        assert_eq!(SqlError::table_exists("t").code, 1050);
        assert_eq!(
            SqlError::no_such_table("db", "t").message,
            "Table 'db.t' doesn't exist"
        );
        assert_eq!(SqlError::unknown_column("c").code, 1054);
        assert_eq!(SqlError::column_count_mismatch().sql_state, "21S01");
        assert_eq!(SqlError::parse_error("near 'FROM'").code, 1064);
    }
}
