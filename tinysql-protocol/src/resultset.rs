// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Result set encoding
//!
//! A SELECT answer is: a column-count packet, one ColumnDefinition41 packet
//! per column, a delimiter, the rows, and a trailer. With classic clients
//! the delimiter and trailer are EOF packets; when CLIENT_DEPRECATE_EOF is
//! negotiated the delimiter is omitted and the trailer is an OK packet with
//! header byte 0xFE.

use crate::codec::{write_lenenc_int, write_lenenc_str};
use crate::constants::*;
use crate::packet::{EofPacket, OkPacket, Packet};
use bytes::{BufMut, Bytes, BytesMut};
use tinysql_common::DataType;
use tinysql_executor::QueryResultSet;
use tinysql_storage::ColumnDef;

/// ColumnDefinition41 packet contents.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub org_table: String,
    pub name: String,
    pub org_name: String,
    pub character_set: u16,
    pub column_length: u32,
    pub column_type: u8,
    pub flags: u16,
    pub decimals: u8,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: u8) -> Self {
        let name = name.into();
        Self {
            catalog: "def".to_string(),
            schema: String::new(),
            table: String::new(),
            org_table: String::new(),
            org_name: name.clone(),
            name,
            character_set: UTF8MB4_GENERAL_CI as u16,
            column_length: 255,
            column_type,
            flags: 0,
            decimals: 0,
        }
    }

    /// Build the wire definition for a table column.
    pub fn from_column(column: &ColumnDef, table: &str, schema: &str) -> Self {
        let mut flags = 0u16;
        if column.not_null {
            flags |= NOT_NULL_FLAG;
        }
        if column.primary_key {
            flags |= PRI_KEY_FLAG;
        }
        if column.auto_increment {
            flags |= AUTO_INCREMENT_FLAG;
        }

        Self {
            catalog: "def".to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
            org_table: table.to_string(),
            name: column.name.clone(),
            org_name: column.name.clone(),
            character_set: UTF8MB4_GENERAL_CI as u16,
            column_length: column_display_length(column.data_type),
            column_type: column_type_byte(column.data_type),
            flags,
            decimals: 0,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        write_lenenc_str(&mut buf, &self.catalog);
        write_lenenc_str(&mut buf, &self.schema);
        write_lenenc_str(&mut buf, &self.table);
        write_lenenc_str(&mut buf, &self.org_table);
        write_lenenc_str(&mut buf, &self.name);
        write_lenenc_str(&mut buf, &self.org_name);

        // Fixed-length tail: always 12 bytes
        write_lenenc_int(&mut buf, 0x0C);
        buf.put_u16_le(self.character_set);
        buf.put_u32_le(self.column_length);
        buf.put_u8(self.column_type);
        buf.put_u16_le(self.flags);
        buf.put_u8(self.decimals);
        buf.put_u16_le(0); // filler

        buf.freeze()
    }
}

/// Protocol type byte for a declared column type.
pub fn column_type_byte(data_type: DataType) -> u8 {
    match data_type {
        DataType::Int => MYSQL_TYPE_LONG,
        DataType::BigInt => MYSQL_TYPE_LONGLONG,
        DataType::Float => MYSQL_TYPE_FLOAT,
        DataType::Double => MYSQL_TYPE_DOUBLE,
        DataType::Varchar | DataType::Text => MYSQL_TYPE_STRING,
        DataType::Boolean => MYSQL_TYPE_TINY,
    }
}

/// Display width advertised for a column type.
pub fn column_display_length(data_type: DataType) -> u32 {
    match data_type {
        DataType::Int => 11,
        DataType::BigInt => 20,
        DataType::Float => 12,
        DataType::Double => 22,
        DataType::Boolean => 1,
        DataType::Varchar => 255,
        DataType::Text => 65_535,
    }
}

/// One row of the text protocol: each value a length-encoded string, NULL a
/// single 0xFB byte.
#[derive(Debug, Clone)]
pub struct TextResultRow {
    pub values: Vec<Option<String>>,
}

impl TextResultRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        for value in &self.values {
            match value {
                Some(v) => write_lenenc_str(&mut buf, v),
                None => buf.put_u8(0xFB),
            }
        }
        buf.freeze()
    }
}

/// A complete result set ready for packet assembly.
pub struct ResultSet {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<TextResultRow>,
}

impl ResultSet {
    /// Convert the executor's materialized rows into wire form.
    pub fn from_query(result: &QueryResultSet) -> Self {
        let columns = result
            .columns
            .iter()
            .map(|col| ColumnDefinition::from_column(col, &result.table, &result.database))
            .collect();

        let rows = result
            .rows
            .iter()
            .map(|row| TextResultRow::new(row.values.iter().map(|v| v.render()).collect()))
            .collect();

        Self { columns, rows }
    }

    /// Assemble the response packet sequence. `first_sequence_id` is the
    /// sequence id of the column-count packet; every following packet takes
    /// the next id.
    pub fn to_packets(&self, first_sequence_id: u8, deprecate_eof: bool) -> Vec<Packet> {
        let mut packets = Vec::with_capacity(self.columns.len() + self.rows.len() + 3);
        let mut sequence_id = first_sequence_id;
        let mut next = |seq: &mut u8| {
            let current = *seq;
            *seq = seq.wrapping_add(1);
            current
        };

        let mut count_payload = BytesMut::new();
        write_lenenc_int(&mut count_payload, self.columns.len() as u64);
        packets.push(Packet::new(next(&mut sequence_id), count_payload.freeze()));

        for column in &self.columns {
            packets.push(Packet::new(next(&mut sequence_id), column.encode()));
        }

        if !deprecate_eof {
            packets.push(Packet::new(next(&mut sequence_id), EofPacket::new().encode()));
        }

        for row in &self.rows {
            packets.push(Packet::new(next(&mut sequence_id), row.encode()));
        }

        if deprecate_eof {
            packets.push(Packet::new(
                next(&mut sequence_id),
                OkPacket::new().encode_as_eof(),
            ));
        } else {
            packets.push(Packet::new(next(&mut sequence_id), EofPacket::new().encode()));
        }

        packets
    }
}
