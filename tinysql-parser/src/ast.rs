// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Statement tree definitions
//!
//! A deliberately small AST: only what the executor needs. Table names keep
//! an optional schema qualifier (`db.table`); WHERE clauses are a binary
//! expression tree over identifiers and literals.

/// Top-level SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableStatement),
    DropTable(DropTableStatement),
    Insert(InsertStatement),
    Select(SelectStatement),
    Use(String),
    ShowDatabases,
    ShowTables,
}

/// A table reference, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct TableName {
    pub schema: Option<String>,
    pub table: String,
}

impl TableName {
    pub fn new(schema: Option<String>, table: String) -> Self {
        Self { schema, table }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: TableName,
    pub columns: Vec<ColumnSpec>,
}

/// One column declaration in CREATE TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    /// Declared type name as written, e.g. `VARCHAR(32)`
    pub data_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub default: Option<Literal>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub name: TableName,
}

/// Single-row INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub name: TableName,
    /// Explicit column list; empty means positional insert
    pub columns: Vec<String>,
    pub values: Vec<Literal>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub name: TableName,
    pub projection: Projection,
    pub selection: Option<Expr>,
    /// -1 means unlimited
    pub limit: i64,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Wildcard,
    Columns(Vec<String>),
}

/// WHERE-clause expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Literal(Literal),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

/// A literal value as it appears in SQL text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}
