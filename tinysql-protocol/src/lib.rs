// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! MySQL wire protocol implementation for the Tiny-SQL server
//!
//! Implements the server side of the MySQL 4.1+ client/server protocol:
//! packet framing, the initial handshake and `mysql_native_password`
//! authentication, the command phase, and result-set encoding. The
//! [`server`] module binds the TCP listener and runs one task per
//! connection.

pub mod auth;
pub mod codec;
pub mod connection;
pub mod constants;
pub mod handshake;
pub mod packet;
pub mod resultset;
pub mod server;
pub mod session;

pub use server::TinySqlServer;
