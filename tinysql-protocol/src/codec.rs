// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! MySQL wire codec helpers
//!
//! Length-encoded integers and strings, NUL-terminated strings, over
//! `bytes` cursors. Every read fails with a recoverable error when the
//! buffer holds fewer bytes than the encoding requires; a read never
//! consumes past the written end.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tinysql_common::{Result, TinySqlError};

fn underflow(what: &str) -> TinySqlError {
    TinySqlError::InvalidPacket(format!("buffer underflow reading {}", what))
}

/// Write a length-encoded integer.
///
/// `< 0xFB` one byte; `< 2^16` 0xFC + 2 bytes; `< 2^24` 0xFD + 3 bytes;
/// otherwise 0xFE + 8 bytes. All little-endian.
pub fn write_lenenc_int(buf: &mut BytesMut, value: u64) {
    if value < 251 {
        buf.put_u8(value as u8);
    } else if value < 65_536 {
        buf.put_u8(0xFC);
        buf.put_u16_le(value as u16);
    } else if value < 16_777_216 {
        buf.put_u8(0xFD);
        buf.put_uint_le(value, 3);
    } else {
        buf.put_u8(0xFE);
        buf.put_u64_le(value);
    }
}

/// Read a length-encoded integer.
///
/// 0xFB (NULL marker) and 0xFF are invalid lead bytes here; row decoding
/// handles 0xFB before calling this.
pub fn read_lenenc_int(buf: &mut Bytes) -> Result<u64> {
    if !buf.has_remaining() {
        return Err(underflow("length-encoded integer"));
    }

    let first = buf.get_u8();
    match first {
        0..=0xFA => Ok(first as u64),
        0xFC => {
            if buf.remaining() < 2 {
                return Err(underflow("2-byte length-encoded integer"));
            }
            Ok(buf.get_u16_le() as u64)
        }
        0xFD => {
            if buf.remaining() < 3 {
                return Err(underflow("3-byte length-encoded integer"));
            }
            Ok(buf.get_uint_le(3))
        }
        0xFE => {
            if buf.remaining() < 8 {
                return Err(underflow("8-byte length-encoded integer"));
            }
            Ok(buf.get_u64_le())
        }
        _ => Err(TinySqlError::InvalidPacket(format!(
            "invalid length-encoded integer lead byte 0x{:02X}",
            first
        ))),
    }
}

/// Write a length-encoded string (length prefix + raw bytes).
pub fn write_lenenc_bytes(buf: &mut BytesMut, data: &[u8]) {
    write_lenenc_int(buf, data.len() as u64);
    buf.put_slice(data);
}

pub fn write_lenenc_str(buf: &mut BytesMut, s: &str) {
    write_lenenc_bytes(buf, s.as_bytes());
}

/// Read a length-encoded string.
pub fn read_lenenc_bytes(buf: &mut Bytes) -> Result<Vec<u8>> {
    let len = read_lenenc_int(buf)? as usize;
    if buf.remaining() < len {
        return Err(underflow("length-encoded string"));
    }
    Ok(buf.copy_to_bytes(len).to_vec())
}

pub fn read_lenenc_str(buf: &mut Bytes) -> Result<String> {
    let bytes = read_lenenc_bytes(buf)?;
    String::from_utf8(bytes)
        .map_err(|e| TinySqlError::InvalidPacket(format!("invalid UTF-8: {}", e)))
}

/// Write a NUL-terminated string.
pub fn write_null_terminated_str(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

/// Read up to and including the NUL terminator.
pub fn read_null_terminated_string(buf: &mut Bytes) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        if !buf.has_remaining() {
            return Err(underflow("NUL-terminated string"));
        }
        let byte = buf.get_u8();
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    String::from_utf8(bytes)
        .map_err(|e| TinySqlError::InvalidPacket(format!("invalid UTF-8: {}", e)))
}

/// Consume the rest of the buffer as a UTF-8 string (lossy).
pub fn read_string_to_end(buf: &mut Bytes) -> String {
    let bytes = buf.copy_to_bytes(buf.remaining());
    String::from_utf8_lossy(&bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u64) -> (usize, u64) {
        let mut buf = BytesMut::new();
        write_lenenc_int(&mut buf, value);
        let encoded_len = buf.len();
        let mut bytes = buf.freeze();
        let decoded = read_lenenc_int(&mut bytes).unwrap();
        assert_eq!(bytes.remaining(), 0, "trailing bytes after {}", value);
        (encoded_len, decoded)
    }

    #[test]
    fn test_lenenc_int_boundaries() {
        // (value, expected encoded width)
        let cases: &[(u64, usize)] = &[
            (0, 1),
            (250, 1),
            (251, 3),
            (65_535, 3),
            (65_536, 4),
            (16_777_215, 4),
            (16_777_216, 9),
            (u32::MAX as u64, 9),
            (u64::MAX, 9),
        ];
        for &(value, width) in cases {
            let (encoded_len, decoded) = roundtrip(value);
            assert_eq!(encoded_len, width, "width of {}", value);
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_lenenc_int_invalid_lead_bytes() {
        for lead in [0xFBu8, 0xFF] {
            let mut bytes = Bytes::from(vec![lead]);
            assert!(read_lenenc_int(&mut bytes).is_err(), "lead 0x{:02X}", lead);
        }
    }

    #[test]
    fn test_lenenc_int_underflow() {
        let mut empty = Bytes::new();
        assert!(read_lenenc_int(&mut empty).is_err());

        // 0xFC announces two bytes but only one follows
        let mut short = Bytes::from(vec![0xFCu8, 0x01]);
        assert!(read_lenenc_int(&mut short).is_err());
    }

    #[test]
    fn test_lenenc_str_roundtrip() {
        let mut buf = BytesMut::new();
        write_lenenc_str(&mut buf, "hello world");
        let mut bytes = buf.freeze();
        assert_eq!(read_lenenc_str(&mut bytes).unwrap(), "hello world");
    }

    #[test]
    fn test_lenenc_str_underflow() {
        // length 5 announced, 3 bytes present
        let mut bytes = Bytes::from(vec![5u8, b'a', b'b', b'c']);
        assert!(read_lenenc_bytes(&mut bytes).is_err());
    }

    #[test]
    fn test_null_terminated_roundtrip() {
        let mut buf = BytesMut::new();
        write_null_terminated_str(&mut buf, "tiny");
        assert_eq!(buf.len(), 5);
        let mut bytes = buf.freeze();
        assert_eq!(read_null_terminated_string(&mut bytes).unwrap(), "tiny");
        assert_eq!(bytes.remaining(), 0);
    }

    #[test]
    fn test_null_terminated_missing_terminator() {
        let mut bytes = Bytes::from_static(b"no-nul");
        assert!(read_null_terminated_string(&mut bytes).is_err());
    }
}
