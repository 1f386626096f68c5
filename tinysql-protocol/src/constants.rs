// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! MySQL protocol constants

// Protocol version byte of the initial handshake
pub const PROTOCOL_VERSION: u8 = 10;

// Version string advertised in the initial handshake
pub const SERVER_VERSION: &str = "1.0.0-tiny-sql";

// Authentication plugin
pub const AUTH_PLUGIN_NAME: &str = "mysql_native_password";

// Length of the per-connection authentication challenge
pub const AUTH_PLUGIN_DATA_LEN: usize = 20;

// Capability flags
pub const CLIENT_LONG_PASSWORD: u32 = 0x0000_0001;
pub const CLIENT_CONNECT_WITH_DB: u32 = 0x0000_0008;
pub const CLIENT_PROTOCOL_41: u32 = 0x0000_0200;
pub const CLIENT_TRANSACTIONS: u32 = 0x0000_2000;
pub const CLIENT_SECURE_CONNECTION: u32 = 0x0000_8000;
pub const CLIENT_PLUGIN_AUTH: u32 = 0x0008_0000;
pub const CLIENT_CONNECT_ATTRS: u32 = 0x0010_0000;
pub const CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA: u32 = 0x0020_0000;
pub const CLIENT_DEPRECATE_EOF: u32 = 0x0100_0000;

/// Capabilities this server advertises in the initial handshake.
pub const SERVER_CAPABILITIES: u32 = CLIENT_LONG_PASSWORD
    | CLIENT_CONNECT_WITH_DB
    | CLIENT_PROTOCOL_41
    | CLIENT_TRANSACTIONS
    | CLIENT_SECURE_CONNECTION
    | CLIENT_PLUGIN_AUTH
    | CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA
    | CLIENT_DEPRECATE_EOF;

// Character set
pub const UTF8MB4_GENERAL_CI: u8 = 45;

// Command bytes
pub const COM_QUIT: u8 = 0x01;
pub const COM_INIT_DB: u8 = 0x02;
pub const COM_QUERY: u8 = 0x03;
pub const COM_PING: u8 = 0x0E;

// Status flags
pub const SERVER_STATUS_AUTOCOMMIT: u16 = 0x0002;

// Column types (protocol type bytes)
pub const MYSQL_TYPE_TINY: u8 = 0x01;
pub const MYSQL_TYPE_LONG: u8 = 0x03;
pub const MYSQL_TYPE_FLOAT: u8 = 0x04;
pub const MYSQL_TYPE_DOUBLE: u8 = 0x05;
pub const MYSQL_TYPE_LONGLONG: u8 = 0x08;
pub const MYSQL_TYPE_STRING: u8 = 0xFE;

// Column flags
pub const NOT_NULL_FLAG: u16 = 0x0001;
pub const PRI_KEY_FLAG: u16 = 0x0002;
pub const AUTO_INCREMENT_FLAG: u16 = 0x0200;
