// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Statement execution for the Tiny-SQL server
//!
//! Takes SQL text, obtains a statement tree from the parser, runs it against
//! the storage engine and produces a [`QueryOutcome`] the protocol layer can
//! encode. SQL-level failures come back as `SqlError` values carrying the
//! MySQL error code and SQLSTATE for the ERR packet.

pub mod evaluator;
pub mod executor;
pub mod result;

pub use executor::QueryExecutor;
pub use result::{QueryOutcome, QueryResultSet};
