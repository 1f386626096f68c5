// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Query execution results

use tinysql_storage::{ColumnDef, Row};

/// What a successfully executed statement produced.
#[derive(Debug)]
pub enum QueryOutcome {
    /// DDL/DML success, encoded as an OK packet.
    Ok {
        affected_rows: u64,
        last_insert_id: u64,
        info: String,
    },
    /// SELECT (or SHOW) success, encoded as a result set.
    ResultSet(QueryResultSet),
}

impl QueryOutcome {
    pub fn ok() -> Self {
        QueryOutcome::Ok {
            affected_rows: 0,
            last_insert_id: 0,
            info: String::new(),
        }
    }

    pub fn ok_with_info(info: impl Into<String>) -> Self {
        QueryOutcome::Ok {
            affected_rows: 0,
            last_insert_id: 0,
            info: info.into(),
        }
    }
}

/// A materialized result set, positionally aligned columns and rows.
#[derive(Debug)]
pub struct QueryResultSet {
    /// Schema the rows came from; empty for synthetic results such as SHOW.
    pub database: String,
    /// Table the rows came from; empty for synthetic results.
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Row>,
}
