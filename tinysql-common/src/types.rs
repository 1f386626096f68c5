// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Column data types

use serde::{Deserialize, Serialize};

/// The data types a table column may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int,
    BigInt,
    Float,
    Double,
    Varchar,
    Text,
    Boolean,
}

impl DataType {
    /// Parse a declared type name, e.g. `INT`, `VARCHAR(32)`, `BOOL`.
    ///
    /// Unrecognized names fall back to `Varchar`, matching how the server
    /// treats any unknown declaration as a string column.
    pub fn parse(type_str: &str) -> Self {
        let upper = type_str.trim().to_uppercase();

        if upper.starts_with("VARCHAR") {
            return DataType::Varchar;
        }

        match upper.as_str() {
            "INT" | "INTEGER" => DataType::Int,
            "BIGINT" => DataType::BigInt,
            "FLOAT" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "TEXT" => DataType::Text,
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            _ => DataType::Varchar,
        }
    }

}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Varchar => "VARCHAR",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        };
        f.write_str(name)
    }
}
