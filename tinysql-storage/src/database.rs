// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Database definition and operations

use crate::table::Table;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// A named collection of tables.
///
/// The table map is its own synchronization domain; table contents are
/// guarded by the per-table lock.
pub struct Database {
    pub name: String,
    tables: DashMap<String, Arc<RwLock<Table>>>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: DashMap::new(),
        }
    }

    /// Register a table. Returns false if the name is already taken.
    pub fn create_table(&self, table: Table) -> bool {
        let table_name = table.name.clone();
        if self.tables.contains_key(&table_name) {
            return false;
        }
        self.tables
            .insert(table_name.clone(), Arc::new(RwLock::new(table)));
        info!("Created table {} in database {}", table_name, self.name);
        true
    }

    /// Remove a table. Returns false if it does not exist.
    pub fn drop_table(&self, table_name: &str) -> bool {
        let removed = self.tables.remove(table_name).is_some();
        if removed {
            info!("Dropped table {} from database {}", table_name, self.name);
        }
        removed
    }

    pub fn get_table(&self, table_name: &str) -> Option<Arc<RwLock<Table>>> {
        self.tables.get(table_name).map(|entry| entry.value().clone())
    }

    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// All table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.tables.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}
