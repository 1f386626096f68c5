// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! SQL statement tree and parser for the Tiny-SQL server
//!
//! The executor consumes the statement tree defined in [`ast`]; the
//! [`parser`] module produces it from SQL text.

pub mod ast;
pub mod parser;

pub use ast::{
    BinaryOp, ColumnSpec, CreateTableStatement, DropTableStatement, Expr,
    InsertStatement, Literal, Projection, SelectStatement, Statement, TableName,
};
pub use parser::{ParseError, TinyParser};
