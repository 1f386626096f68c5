// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Table and row definitions

use crate::value::Value;
use std::collections::HashMap;
use tinysql_common::{DataType, SqlError};

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub default_value: Option<Value>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            not_null: false,
            primary_key: false,
            auto_increment: false,
            default_value: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default_value = Some(default);
        self
    }
}

/// One row of cell values, positionally aligned with the table's columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An in-memory table. Rows are kept in insertion order.
#[derive(Debug)]
pub struct Table {
    pub name: String,
    columns: Vec<ColumnDef>,
    column_index: HashMap<String, usize>,
    rows: Vec<Row>,
    next_auto_increment: i64,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.name.clone(), i))
            .collect();
        Self {
            name: name.into(),
            columns,
            column_index,
            rows: Vec::new(),
            next_auto_increment: 1,
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Allocate the next auto-increment value.
    pub fn next_auto_increment(&mut self) -> i64 {
        let value = self.next_auto_increment;
        self.next_auto_increment += 1;
        value
    }

    /// Append a row, enforcing arity and NOT NULL constraints.
    pub fn insert_row(&mut self, row: Row) -> Result<(), SqlError> {
        if row.len() != self.columns.len() {
            return Err(SqlError::column_count_mismatch());
        }

        for (column, value) in self.columns.iter().zip(row.values.iter()) {
            if column.not_null && value.is_null() {
                return Err(SqlError::constraint_violation(format!(
                    "Column '{}' cannot be null",
                    column.name
                )));
            }
        }

        self.rows.push(row);
        Ok(())
    }
}
