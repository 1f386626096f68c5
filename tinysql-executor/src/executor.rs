// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Query Executor
//!
//! Parses SQL text and executes it against the storage engine. All
//! protocol-visible error codes and SQLSTATEs originate here (or in the
//! storage layer's constraint checks) as `SqlError` values.

use crate::evaluator;
use crate::result::{QueryOutcome, QueryResultSet};
use std::sync::Arc;
use tinysql_common::{DataType, SqlError};
use tinysql_parser::ast::*;
use tinysql_parser::TinyParser;
use tinysql_storage::{ColumnDef, Database, Row, StorageEngine, Table, Value};
use tracing::{debug, info};

pub struct QueryExecutor {
    engine: Arc<StorageEngine>,
}

impl QueryExecutor {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Execute one SQL string. `current_db` is the session's schema slot;
    /// USE updates it in place.
    pub fn execute_sql(
        &self,
        sql: &str,
        current_db: &mut Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        let trimmed = sql.trim();
        debug!("Executing: {}", trimmed);

        if let Some(outcome) = Self::client_probe(trimmed) {
            return Ok(outcome);
        }

        let stmt = TinyParser::parse_one(trimmed).map_err(SqlError::parse_error)?;
        self.execute(&stmt, current_db)
    }

    /// Connector probe queries (`SELECT @@...`, `SET ...`, unrecognized
    /// SHOW forms) are acknowledged with a bare OK so stock client
    /// libraries can complete their connect sequence.
    fn client_probe(sql: &str) -> Option<QueryOutcome> {
        let lower = sql.to_lowercase();
        let probe = lower.starts_with("select @@")
            || lower.starts_with("select version()")
            || lower.starts_with("set ")
            || (lower.starts_with("show ")
                && !lower.starts_with("show databases")
                && !lower.starts_with("show tables"));
        probe.then(QueryOutcome::ok)
    }

    pub fn execute(
        &self,
        stmt: &Statement,
        current_db: &mut Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        match stmt {
            Statement::CreateTable(create) => self.execute_create_table(create, current_db),
            Statement::DropTable(drop) => self.execute_drop_table(drop, current_db),
            Statement::Insert(insert) => self.execute_insert(insert, current_db),
            Statement::Select(select) => self.execute_select(select, current_db),
            Statement::Use(db) => {
                *current_db = Some(db.clone());
                Ok(QueryOutcome::ok_with_info(format!(
                    "Database changed to: {}",
                    db
                )))
            }
            Statement::ShowDatabases => self.execute_show_databases(),
            Statement::ShowTables => self.execute_show_tables(current_db),
        }
    }

    fn resolve_schema(
        name: &TableName,
        current_db: &Option<String>,
    ) -> Result<String, SqlError> {
        name.schema
            .clone()
            .or_else(|| current_db.clone())
            .ok_or_else(SqlError::no_database_selected)
    }

    fn database(&self, db_name: &str) -> Result<Arc<Database>, SqlError> {
        self.engine
            .get_database(db_name)
            .ok_or_else(|| SqlError::unknown_database(db_name))
    }

    fn execute_create_table(
        &self,
        stmt: &CreateTableStatement,
        current_db: &Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        let db_name = Self::resolve_schema(&stmt.name, current_db)?;
        let db = self.engine.get_or_create_database(&db_name);

        let table_name = &stmt.name.table;
        if db.has_table(table_name) {
            return Err(SqlError::table_exists(table_name));
        }

        let mut columns = Vec::with_capacity(stmt.columns.len());
        for spec in &stmt.columns {
            let data_type = DataType::parse(&spec.data_type);
            let mut column = ColumnDef::new(spec.name.clone(), data_type);
            column.not_null = spec.not_null;
            column.primary_key = spec.primary_key;
            column.auto_increment = spec.auto_increment;
            column.default_value = spec
                .default
                .as_ref()
                .map(|lit| literal_to_value(lit, data_type));
            columns.push(column);
        }

        if !db.create_table(Table::new(table_name.clone(), columns)) {
            return Err(SqlError::table_exists(table_name));
        }

        info!("Created table {}.{}", db_name, table_name);
        Ok(QueryOutcome::ok())
    }

    fn execute_drop_table(
        &self,
        stmt: &DropTableStatement,
        current_db: &Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        let db_name = Self::resolve_schema(&stmt.name, current_db)?;
        let db = self.database(&db_name)?;

        if !db.drop_table(&stmt.name.table) {
            return Err(SqlError::unknown_table(&stmt.name.table));
        }

        info!("Dropped table {}.{}", db_name, stmt.name.table);
        Ok(QueryOutcome::ok())
    }

    fn execute_insert(
        &self,
        stmt: &InsertStatement,
        current_db: &Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        let db_name = Self::resolve_schema(&stmt.name, current_db)?;
        let db = self.database(&db_name)?;
        let table = db
            .get_table(&stmt.name.table)
            .ok_or_else(|| SqlError::no_such_table(&db_name, &stmt.name.table))?;

        let mut table = table.write();
        let mut last_insert_id = 0u64;
        let mut values = Vec::with_capacity(table.columns().len());

        if !stmt.columns.is_empty() {
            if stmt.columns.len() != stmt.values.len() {
                return Err(SqlError::column_count_mismatch());
            }
            for provided in &stmt.columns {
                if table.column_index(provided).is_none() {
                    return Err(SqlError::unknown_column(provided));
                }
            }

            // Omitted columns get the auto-increment value, then the
            // declared default, then NULL.
            let columns = table.columns().to_vec();
            for column in &columns {
                let provided = stmt
                    .columns
                    .iter()
                    .position(|name| *name == column.name);
                let value = match provided {
                    Some(idx) => literal_to_value(&stmt.values[idx], column.data_type),
                    None if column.auto_increment => {
                        let next = table.next_auto_increment();
                        last_insert_id = next as u64;
                        auto_increment_value(next, column.data_type)
                    }
                    None => column
                        .default_value
                        .clone()
                        .unwrap_or(Value::Null),
                };
                values.push(value);
            }
        } else {
            if stmt.values.len() != table.columns().len() {
                return Err(SqlError::column_count_mismatch());
            }
            for (column, lit) in table.columns().iter().zip(stmt.values.iter()) {
                values.push(literal_to_value(lit, column.data_type));
            }
        }

        table.insert_row(Row::new(values))?;

        debug!(
            "Inserted row into {}.{} ({} rows total)",
            db_name,
            stmt.name.table,
            table.row_count()
        );
        Ok(QueryOutcome::Ok {
            affected_rows: 1,
            last_insert_id,
            info: String::new(),
        })
    }

    fn execute_select(
        &self,
        stmt: &SelectStatement,
        current_db: &Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        let db_name = Self::resolve_schema(&stmt.name, current_db)?;
        let db = self.database(&db_name)?;
        let table = db
            .get_table(&stmt.name.table)
            .ok_or_else(|| SqlError::no_such_table(&db_name, &stmt.name.table))?;

        let table = table.read();

        let column_indices: Vec<usize> = match &stmt.projection {
            Projection::Wildcard => (0..table.columns().len()).collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .ok_or_else(|| SqlError::unknown_column(name))
                })
                .collect::<Result<_, _>>()?,
        };

        let result_columns: Vec<ColumnDef> = column_indices
            .iter()
            .map(|&i| table.columns()[i].clone())
            .collect();

        let mut filtered: Vec<&Row> = Vec::new();
        for row in table.rows() {
            let matches = match &stmt.selection {
                Some(expr) => evaluator::evaluate(expr, row, table.columns())?,
                None => true,
            };
            if matches {
                filtered.push(row);
            }
        }

        // OFFSET skips filtered rows, LIMIT truncates; -1 means unlimited.
        let offset = stmt.offset as usize;
        let selected: Vec<&Row> = if offset >= filtered.len() {
            Vec::new()
        } else {
            let rest = &filtered[offset..];
            if stmt.limit >= 0 {
                rest.iter().take(stmt.limit as usize).copied().collect()
            } else {
                rest.to_vec()
            }
        };

        let rows: Vec<Row> = selected
            .into_iter()
            .map(|row| {
                Row::new(
                    column_indices
                        .iter()
                        .map(|&i| row.values[i].clone())
                        .collect(),
                )
            })
            .collect();

        debug!(
            "SELECT from {}.{}: {} rows matched",
            db_name,
            stmt.name.table,
            rows.len()
        );
        Ok(QueryOutcome::ResultSet(QueryResultSet {
            database: db_name,
            table: table.name.clone(),
            columns: result_columns,
            rows,
        }))
    }

    fn execute_show_databases(&self) -> Result<QueryOutcome, SqlError> {
        let rows = self
            .engine
            .database_names()
            .into_iter()
            .map(|name| Row::new(vec![Value::Text(name)]))
            .collect();

        Ok(QueryOutcome::ResultSet(QueryResultSet {
            database: String::new(),
            table: String::new(),
            columns: vec![ColumnDef::new("Database", DataType::Varchar)],
            rows,
        }))
    }

    fn execute_show_tables(
        &self,
        current_db: &Option<String>,
    ) -> Result<QueryOutcome, SqlError> {
        let db_name = current_db
            .clone()
            .ok_or_else(SqlError::no_database_selected)?;
        let db = self.database(&db_name)?;

        let rows = db
            .table_names()
            .into_iter()
            .map(|name| Row::new(vec![Value::Text(name)]))
            .collect();

        Ok(QueryOutcome::ResultSet(QueryResultSet {
            database: String::new(),
            table: String::new(),
            columns: vec![ColumnDef::new(
                format!("Tables_in_{}", db_name),
                DataType::Varchar,
            )],
            rows,
        }))
    }
}

/// Convert a SQL literal to a cell value of the column's declared type.
/// Conversions that do not fit keep the closest representation rather than
/// failing, matching how the text protocol round-trips values.
fn literal_to_value(lit: &Literal, target: DataType) -> Value {
    match (lit, target) {
        (Literal::Null, _) => Value::Null,
        (Literal::Integer(i), DataType::Int) => match i32::try_from(*i) {
            Ok(narrow) => Value::Int(narrow),
            Err(_) => Value::BigInt(*i),
        },
        (Literal::Integer(i), DataType::BigInt) => Value::BigInt(*i),
        (Literal::Integer(i), DataType::Float) => Value::Float(*i as f32),
        (Literal::Integer(i), DataType::Double) => Value::Double(*i as f64),
        (Literal::Integer(i), DataType::Boolean) => Value::Bool(*i != 0),
        (Literal::Integer(i), _) => Value::Text(i.to_string()),
        (Literal::Float(f), DataType::Float) => Value::Float(*f as f32),
        (Literal::Float(f), DataType::Double) => Value::Double(*f),
        (Literal::Float(f), DataType::Varchar | DataType::Text) => Value::Text(f.to_string()),
        (Literal::Float(f), _) => Value::Double(*f),
        (Literal::Boolean(b), DataType::Boolean) => Value::Bool(*b),
        (Literal::Boolean(b), DataType::Varchar | DataType::Text) => {
            Value::Text(if *b { "TRUE" } else { "FALSE" }.to_string())
        }
        (Literal::Boolean(b), _) => Value::Int(*b as i32),
        (Literal::String(s), _) => Value::Text(s.clone()),
    }
}

fn auto_increment_value(next: i64, target: DataType) -> Value {
    match target {
        DataType::BigInt => Value::BigInt(next),
        _ => match i32::try_from(next) {
            Ok(narrow) => Value::Int(narrow),
            Err(_) => Value::BigInt(next),
        },
    }
}
