// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Handshake packets
//!
//! The server opens with a Handshake V10 packet (sequence 0), the client
//! answers with HandshakeResponse41 (sequence 1), and the server completes
//! with OK or ERR (sequence 2).

use crate::codec::{read_lenenc_bytes, read_null_terminated_string, write_null_terminated_str};
use crate::constants::*;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use rand::Rng;
use sha1::{Digest, Sha1};
use tinysql_common::{Result, TinySqlError};

/// Initial handshake packet sent by the server.
#[derive(Debug, Clone)]
pub struct InitialHandshake {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub auth_plugin_data: [u8; AUTH_PLUGIN_DATA_LEN],
    pub capability_flags: u32,
    pub character_set: u8,
    pub status_flags: u16,
    pub auth_plugin_name: String,
}

impl InitialHandshake {
    /// Create a handshake with a fresh random challenge.
    pub fn new(connection_id: u32) -> Self {
        let mut auth_plugin_data = [0u8; AUTH_PLUGIN_DATA_LEN];
        rand::rng().fill(&mut auth_plugin_data[..]);

        Self {
            protocol_version: PROTOCOL_VERSION,
            server_version: SERVER_VERSION.to_string(),
            connection_id,
            auth_plugin_data,
            capability_flags: SERVER_CAPABILITIES,
            character_set: UTF8MB4_GENERAL_CI,
            status_flags: SERVER_STATUS_AUTOCOMMIT,
            auth_plugin_name: AUTH_PLUGIN_NAME.to_string(),
        }
    }

    /// Encode the packet payload (Handshake V10 layout).
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        buf.put_u8(self.protocol_version);
        write_null_terminated_str(&mut buf, &self.server_version);
        buf.put_u32_le(self.connection_id);

        // First 8 bytes of the challenge, then a filler byte
        buf.put_slice(&self.auth_plugin_data[..8]);
        buf.put_u8(0x00);

        buf.put_u16_le((self.capability_flags & 0xFFFF) as u16);
        buf.put_u8(self.character_set);
        buf.put_u16_le(self.status_flags);
        buf.put_u16_le((self.capability_flags >> 16) as u16);

        // Challenge length including the trailing NUL
        buf.put_u8(AUTH_PLUGIN_DATA_LEN as u8 + 1);

        buf.put_bytes(0, 10);

        // Remaining 12 challenge bytes, NUL-terminated
        buf.put_slice(&self.auth_plugin_data[8..]);
        buf.put_u8(0x00);

        write_null_terminated_str(&mut buf, &self.auth_plugin_name);

        buf.freeze()
    }
}

/// HandshakeResponse41 sent by the client.
#[derive(Debug, Clone)]
pub struct HandshakeResponse41 {
    pub capability_flags: u32,
    pub max_packet_size: u32,
    pub character_set: u8,
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
    pub auth_plugin_name: Option<String>,
}

impl HandshakeResponse41 {
    pub fn decode(mut payload: Bytes) -> Result<Self> {
        if payload.len() < 32 {
            return Err(TinySqlError::InvalidPacket(
                "handshake response too short".to_string(),
            ));
        }

        let capability_flags = payload.get_u32_le();
        let max_packet_size = payload.get_u32_le();
        let character_set = payload.get_u8();
        payload.advance(23); // reserved

        let username = read_null_terminated_string(&mut payload)?;

        let auth_response = if capability_flags & CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA != 0 {
            read_lenenc_bytes(&mut payload)?
        } else if capability_flags & CLIENT_SECURE_CONNECTION != 0 {
            if !payload.has_remaining() {
                return Err(TinySqlError::InvalidPacket(
                    "missing auth response length".to_string(),
                ));
            }
            let len = payload.get_u8() as usize;
            if payload.remaining() < len {
                return Err(TinySqlError::InvalidPacket(
                    "truncated auth response".to_string(),
                ));
            }
            payload.copy_to_bytes(len).to_vec()
        } else {
            read_bytes_to_nul(&mut payload).ok_or_else(|| {
                TinySqlError::InvalidPacket("unterminated auth response".to_string())
            })?
        };

        // Both trailing fields tolerate a missing NUL at the packet end.
        let database = if capability_flags & CLIENT_CONNECT_WITH_DB != 0 {
            read_optional_to_nul(&mut payload)
        } else {
            None
        };

        let auth_plugin_name = if capability_flags & CLIENT_PLUGIN_AUTH != 0 {
            read_optional_to_nul(&mut payload)
        } else {
            None
        };

        // Any trailing connection attributes are discarded.

        Ok(Self {
            capability_flags,
            max_packet_size,
            character_set,
            username,
            auth_response,
            database,
            auth_plugin_name,
        })
    }
}

fn read_bytes_to_nul(buf: &mut Bytes) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    while buf.has_remaining() {
        let byte = buf.get_u8();
        if byte == 0 {
            return Some(bytes);
        }
        bytes.push(byte);
    }
    None
}

/// Read until NUL or the end of the buffer; empty reads become `None`.
fn read_optional_to_nul(buf: &mut Bytes) -> Option<String> {
    if !buf.has_remaining() {
        return None;
    }
    let mut bytes = Vec::new();
    while buf.has_remaining() {
        let byte = buf.get_u8();
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).to_string())
    }
}

/// The client-side scramble: `SHA1(password) XOR SHA1(salt || SHA1(SHA1(password)))`.
///
/// Empty passwords scramble to an empty response.
pub fn scramble_password(password: &str, salt: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }

    let hash1 = Sha1::digest(password.as_bytes());
    let hash2 = Sha1::digest(hash1);

    let mut hasher = Sha1::new();
    hasher.update(salt);
    hasher.update(hash2);
    let hash3 = hasher.finalize();

    hash1
        .iter()
        .zip(hash3.iter())
        .map(|(a, b)| a ^ b)
        .collect()
}
