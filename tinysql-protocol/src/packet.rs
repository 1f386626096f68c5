// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Packet framing and the generic response packets
//!
//! Wire format: 3 bytes payload length (little-endian), 1 byte sequence id,
//! then the payload. A packet with payload length `n` occupies exactly
//! `n + 4` bytes.

use crate::codec::{read_lenenc_int, write_lenenc_int};
use crate::constants::SERVER_STATUS_AUTOCOMMIT;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tinysql_common::{Result, TinySqlError};

pub const HEADER_SIZE: usize = 4;
pub const MAX_PAYLOAD_LEN: usize = 0xFF_FFFF;

/// One framed MySQL packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub sequence_id: u8,
    pub payload: Bytes,
}

impl Packet {
    pub fn new(sequence_id: u8, payload: Bytes) -> Self {
        Self {
            sequence_id,
            payload,
        }
    }

    /// Total on-wire size of the packet at the front of `buf`, or 0 when
    /// fewer than `4 + payload_length` bytes are buffered.
    pub fn check(buf: &BytesMut) -> usize {
        if buf.len() < HEADER_SIZE {
            return 0;
        }
        let len = (buf[0] as usize) | ((buf[1] as usize) << 8) | ((buf[2] as usize) << 16);
        if buf.len() < HEADER_SIZE + len {
            return 0;
        }
        HEADER_SIZE + len
    }

    /// Consume one complete packet from the front of `buf`, or return
    /// `None` when the frame is not yet complete.
    pub fn decode(buf: &mut BytesMut) -> Option<Self> {
        let total = Self::check(buf);
        if total == 0 {
            return None;
        }

        let len = total - HEADER_SIZE;
        let sequence_id = buf[3];
        buf.advance(HEADER_SIZE);
        let payload = buf.split_to(len).freeze();

        Some(Packet {
            sequence_id,
            payload,
        })
    }

    /// Frame this packet for the wire.
    pub fn encode(&self) -> BytesMut {
        debug_assert!(self.payload.len() <= MAX_PAYLOAD_LEN);

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        let len = self.payload.len() as u32;
        buf.put_u8((len & 0xFF) as u8);
        buf.put_u8(((len >> 8) & 0xFF) as u8);
        buf.put_u8(((len >> 16) & 0xFF) as u8);
        buf.put_u8(self.sequence_id);
        buf.put_slice(&self.payload);
        buf
    }
}

/// OK packet (header byte 0x00).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: u16,
    pub warnings: u16,
    pub info: String,
}

impl Default for OkPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl OkPacket {
    pub fn new() -> Self {
        Self {
            affected_rows: 0,
            last_insert_id: 0,
            status_flags: SERVER_STATUS_AUTOCOMMIT,
            warnings: 0,
            info: String::new(),
        }
    }

    pub fn with_rows(affected_rows: u64, last_insert_id: u64) -> Self {
        Self {
            affected_rows,
            last_insert_id,
            ..Self::new()
        }
    }

    pub fn encode(&self) -> Bytes {
        self.encode_with_header(0x00)
    }

    /// OK packet carrying the 0xFE header byte; replaces the trailing EOF
    /// of a result set when CLIENT_DEPRECATE_EOF is negotiated.
    pub fn encode_as_eof(&self) -> Bytes {
        self.encode_with_header(0xFE)
    }

    fn encode_with_header(&self, header: u8) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(header);
        write_lenenc_int(&mut buf, self.affected_rows);
        write_lenenc_int(&mut buf, self.last_insert_id);
        buf.put_u16_le(self.status_flags);
        buf.put_u16_le(self.warnings);
        if !self.info.is_empty() {
            buf.put_slice(self.info.as_bytes());
        }
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self> {
        if !payload.has_remaining() {
            return Err(TinySqlError::InvalidPacket("empty OK packet".to_string()));
        }
        let header = payload.get_u8();
        if header != 0x00 && header != 0xFE {
            return Err(TinySqlError::InvalidPacket(format!(
                "invalid OK packet header 0x{:02X}",
                header
            )));
        }

        let affected_rows = read_lenenc_int(&mut payload)?;
        let last_insert_id = read_lenenc_int(&mut payload)?;
        if payload.remaining() < 4 {
            return Err(TinySqlError::InvalidPacket(
                "truncated OK packet".to_string(),
            ));
        }
        let status_flags = payload.get_u16_le();
        let warnings = payload.get_u16_le();
        let info = String::from_utf8_lossy(&payload.copy_to_bytes(payload.remaining())).to_string();

        Ok(Self {
            affected_rows,
            last_insert_id,
            status_flags,
            warnings,
            info,
        })
    }
}

/// ERR packet (header byte 0xFF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrPacket {
    pub error_code: u16,
    pub sql_state: String,
    pub error_message: String,
}

impl ErrPacket {
    /// A non-5-character SQLSTATE is replaced with `HY000`.
    pub fn new(error_code: u16, sql_state: &str, error_message: impl Into<String>) -> Self {
        let sql_state = if sql_state.len() == 5 {
            sql_state.to_string()
        } else {
            "HY000".to_string()
        };
        Self {
            error_code,
            sql_state,
            error_message: error_message.into(),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(0xFF);
        buf.put_u16_le(self.error_code);
        buf.put_u8(b'#');
        buf.put_slice(self.sql_state.as_bytes());
        buf.put_slice(self.error_message.as_bytes());
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self> {
        if payload.remaining() < 9 {
            return Err(TinySqlError::InvalidPacket(
                "truncated ERR packet".to_string(),
            ));
        }
        let header = payload.get_u8();
        if header != 0xFF {
            return Err(TinySqlError::InvalidPacket(format!(
                "invalid ERR packet header 0x{:02X}",
                header
            )));
        }
        let error_code = payload.get_u16_le();
        let marker = payload.get_u8();
        if marker != b'#' {
            return Err(TinySqlError::InvalidPacket(
                "missing SQLSTATE marker".to_string(),
            ));
        }
        let sql_state =
            String::from_utf8_lossy(&payload.copy_to_bytes(5)).to_string();
        let error_message =
            String::from_utf8_lossy(&payload.copy_to_bytes(payload.remaining())).to_string();

        Ok(Self {
            error_code,
            sql_state,
            error_message,
        })
    }
}

impl From<&tinysql_common::SqlError> for ErrPacket {
    fn from(err: &tinysql_common::SqlError) -> Self {
        ErrPacket::new(err.code, &err.sql_state, err.message.clone())
    }
}

/// EOF packet (header byte 0xFE, payload shorter than 9 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EofPacket {
    pub warnings: u16,
    pub status_flags: u16,
}

impl Default for EofPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl EofPacket {
    pub fn new() -> Self {
        Self {
            warnings: 0,
            status_flags: SERVER_STATUS_AUTOCOMMIT,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(0xFE);
        buf.put_u16_le(self.warnings);
        buf.put_u16_le(self.status_flags);
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self> {
        if payload.remaining() != 5 {
            return Err(TinySqlError::InvalidPacket(
                "EOF packet must be 5 bytes".to_string(),
            ));
        }
        let header = payload.get_u8();
        if header != 0xFE {
            return Err(TinySqlError::InvalidPacket(format!(
                "invalid EOF packet header 0x{:02X}",
                header
            )));
        }
        Ok(Self {
            warnings: payload.get_u16_le(),
            status_flags: payload.get_u16_le(),
        })
    }

    /// An EOF is distinguished from a length-encoded value with the same
    /// lead byte by payload length.
    pub fn is_eof(payload: &[u8]) -> bool {
        !payload.is_empty() && payload[0] == 0xFE && payload.len() < 9
    }
}
