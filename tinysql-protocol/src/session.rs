// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Per-connection session state

use crate::constants::AUTH_PLUGIN_DATA_LEN;

/// Where a connection is in the handshake/command lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    HandshakeSent,
    Authenticated,
    Closing,
    Closed,
}

/// Per-connection state: identity, phase, sequence counter, the challenge
/// sent in the handshake, and the current schema.
#[derive(Debug)]
pub struct Session {
    connection_id: u32,
    state: SessionState,
    sequence_id: u8,
    auth_plugin_data: [u8; AUTH_PLUGIN_DATA_LEN],
    username: String,
    current_database: Option<String>,
}

impl Session {
    pub fn new(connection_id: u32) -> Self {
        Self {
            connection_id,
            state: SessionState::Init,
            sequence_id: 0,
            auth_plugin_data: [0; AUTH_PLUGIN_DATA_LEN],
            username: String::new(),
            current_database: None,
        }
    }

    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn auth_plugin_data(&self) -> &[u8; AUTH_PLUGIN_DATA_LEN] {
        &self.auth_plugin_data
    }

    pub fn set_auth_plugin_data(&mut self, data: [u8; AUTH_PLUGIN_DATA_LEN]) {
        self.auth_plugin_data = data;
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    pub fn database_mut(&mut self) -> &mut Option<String> {
        &mut self.current_database
    }

    pub fn set_current_database(&mut self, db: impl Into<String>) {
        self.current_database = Some(db.into());
    }

    /// Anchor the response sequence on an inbound command packet: the first
    /// reply uses the client's sequence plus one.
    pub fn start_response(&mut self, client_sequence: u8) {
        self.sequence_id = client_sequence;
    }

    /// The sequence id for the next response packet.
    pub fn next_sequence_id(&mut self) -> u8 {
        self.sequence_id = self.sequence_id.wrapping_add(1);
        self.sequence_id
    }
}
