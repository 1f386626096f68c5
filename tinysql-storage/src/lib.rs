// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! In-memory catalog and table store for the Tiny-SQL server
//!
//! The engine holds databases, databases hold tables, tables hold rows in
//! insertion order. Everything lives in memory and is lost on exit.

pub mod database;
pub mod engine;
pub mod table;
pub mod value;

pub use database::Database;
pub use engine::StorageEngine;
pub use table::{ColumnDef, Row, Table};
pub use value::Value;
