// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Storage engine: the root of the catalog

use crate::database::Database;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// The process-wide catalog: database name -> database.
///
/// Constructed once at startup and handed to each connection task as an
/// `Arc`; tests build their own fresh engines.
pub struct StorageEngine {
    databases: DashMap<String, Arc<Database>>,
}

impl StorageEngine {
    pub fn new() -> Self {
        let engine = Self {
            databases: DashMap::new(),
        };
        engine.create_database("mysql");
        engine.create_database("test");
        info!("Storage engine initialized with default databases: mysql, test");
        engine
    }

    /// Create a database. Returns false if it already exists.
    pub fn create_database(&self, db_name: &str) -> bool {
        if self.databases.contains_key(db_name) {
            return false;
        }
        self.databases
            .insert(db_name.to_string(), Arc::new(Database::new(db_name)));
        true
    }

    /// Drop a database. System databases are protected.
    pub fn drop_database(&self, db_name: &str) -> bool {
        if db_name == "mysql" || db_name == "information_schema" {
            warn!("Refusing to drop system database {}", db_name);
            return false;
        }
        self.databases.remove(db_name).is_some()
    }

    pub fn get_database(&self, db_name: &str) -> Option<Arc<Database>> {
        self.databases.get(db_name).map(|entry| entry.value().clone())
    }

    pub fn has_database(&self, db_name: &str) -> bool {
        self.databases.contains_key(db_name)
    }

    pub fn get_or_create_database(&self, db_name: &str) -> Arc<Database> {
        if let Some(db) = self.get_database(db_name) {
            return db;
        }
        self.create_database(db_name);
        self.get_database(db_name)
            .expect("database exists after creation")
    }

    /// All database names, sorted.
    pub fn database_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .databases
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}
