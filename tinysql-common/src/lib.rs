// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Common foundational types for the Tiny-SQL server
//!
//! This crate provides:
//! - Error types and result handling
//! - SQL-level errors carrying MySQL error codes and SQLSTATEs
//! - Column data types
//! - Server configuration

pub mod config;
pub mod error;
pub mod types;

pub use config::ServerConfig;
pub use error::{Result, SqlError, TinySqlError};
pub use types::DataType;
