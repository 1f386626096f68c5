// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Per-connection protocol handler
//!
//! Drives one client through the handshake, authentication, and the command
//! phase. The inbound buffer is drained of every complete packet before the
//! socket is read again, so pipelined commands are all answered.

use crate::auth::Authenticator;
use crate::codec::read_string_to_end;
use crate::constants::*;
use crate::handshake::{HandshakeResponse41, InitialHandshake};
use crate::packet::{ErrPacket, OkPacket, Packet};
use crate::resultset::ResultSet;
use crate::session::{Session, SessionState};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tinysql_executor::{QueryExecutor, QueryOutcome};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

pub struct ClientConnection {
    stream: TcpStream,
    read_buffer: BytesMut,
    session: Session,
    executor: Arc<QueryExecutor>,
    client_capabilities: u32,
}

impl ClientConnection {
    pub fn new(stream: TcpStream, connection_id: u32, executor: Arc<QueryExecutor>) -> Self {
        Self {
            stream,
            read_buffer: BytesMut::with_capacity(8192),
            session: Session::new(connection_id),
            executor,
            client_capabilities: 0,
        }
    }

    /// Run the connection to completion.
    pub async fn handle(mut self) -> tinysql_common::Result<()> {
        let connection_id = self.session.connection_id();
        debug!("Connection {} established", connection_id);

        self.send_handshake().await?;

        loop {
            let packet = match self.read_packet().await {
                Ok(packet) => packet,
                Err(tinysql_common::TinySqlError::ConnectionClosed) => {
                    debug!("Connection {} closed by peer", connection_id);
                    self.session.set_state(SessionState::Closed);
                    return Ok(());
                }
                Err(e) => {
                    self.session.set_state(SessionState::Closed);
                    return Err(e);
                }
            };

            match self.session.state() {
                SessionState::HandshakeSent => {
                    if !self.handle_authentication(packet).await? {
                        self.session.set_state(SessionState::Closed);
                        return Ok(());
                    }
                }
                SessionState::Authenticated => {
                    self.handle_command(packet).await?;
                    if self.session.state() == SessionState::Closing {
                        info!("Connection {} quitting", connection_id);
                        self.session.set_state(SessionState::Closed);
                        return Ok(());
                    }
                }
                state => {
                    warn!(
                        "Connection {} received data in unexpected state {:?}",
                        connection_id, state
                    );
                    self.session.set_state(SessionState::Closed);
                    return Ok(());
                }
            }
        }
    }

    async fn send_handshake(&mut self) -> tinysql_common::Result<()> {
        let handshake = InitialHandshake::new(self.session.connection_id());
        self.session.set_auth_plugin_data(handshake.auth_plugin_data);

        let packet = Packet::new(0, handshake.encode());
        self.write_packet(&packet).await?;
        self.session.set_state(SessionState::HandshakeSent);
        Ok(())
    }

    /// Authenticate from a HandshakeResponse41. Returns false when the
    /// connection must close (the ERR has already been sent).
    async fn handle_authentication(&mut self, packet: Packet) -> tinysql_common::Result<bool> {
        self.session.start_response(packet.sequence_id);

        let response = match HandshakeResponse41::decode(packet.payload) {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Connection {}: bad handshake response: {}",
                    self.session.connection_id(),
                    e
                );
                let seq = self.session.next_sequence_id();
                let err = ErrPacket::new(1043, "08S01", "Bad handshake");
                self.write_packet(&Packet::new(seq, err.encode())).await?;
                return Ok(false);
            }
        };

        self.client_capabilities = response.capability_flags;
        debug!(
            "Connection {}: user '{}' authenticating, capabilities 0x{:08X}",
            self.session.connection_id(),
            response.username,
            response.capability_flags
        );

        let accepted = Authenticator::authenticate(
            &response.username,
            &response.auth_response,
            self.session.auth_plugin_data(),
        );

        if !accepted {
            let seq = self.session.next_sequence_id();
            let err = ErrPacket::new(
                1045,
                "28000",
                format!("Access denied for user '{}'", response.username),
            );
            self.write_packet(&Packet::new(seq, err.encode())).await?;
            return Ok(false);
        }

        self.session.set_username(&response.username);
        if let Some(db) = response.database {
            self.session.set_current_database(db);
        }
        self.session.set_state(SessionState::Authenticated);

        info!(
            "Connection {}: user '{}' authenticated",
            self.session.connection_id(),
            response.username
        );

        let seq = self.session.next_sequence_id();
        self.write_packet(&Packet::new(seq, OkPacket::new().encode()))
            .await?;
        Ok(true)
    }

    /// Dispatch one command packet by its first payload byte.
    async fn handle_command(&mut self, packet: Packet) -> tinysql_common::Result<()> {
        if packet.payload.is_empty() {
            return Err(tinysql_common::TinySqlError::InvalidPacket(
                "empty command packet".to_string(),
            ));
        }

        self.session.start_response(packet.sequence_id);

        let command = packet.payload[0];
        let mut rest = packet.payload.slice(1..);

        match command {
            COM_QUIT => {
                debug!("Connection {}: COM_QUIT", self.session.connection_id());
                self.session.set_state(SessionState::Closing);
            }
            COM_INIT_DB => {
                let db = read_string_to_end(&mut rest);
                debug!(
                    "Connection {}: COM_INIT_DB '{}'",
                    self.session.connection_id(),
                    db
                );
                self.session.set_current_database(db);
                self.send_ok(OkPacket::new()).await?;
            }
            COM_QUERY => {
                let query = read_string_to_end(&mut rest);
                info!(
                    "Connection {}: query from {}: {}",
                    self.session.connection_id(),
                    self.session.username(),
                    query.trim()
                );
                self.handle_query(&query).await?;
            }
            COM_PING => {
                debug!("Connection {}: COM_PING", self.session.connection_id());
                self.send_ok(OkPacket::new()).await?;
            }
            other => {
                warn!(
                    "Connection {}: unknown command 0x{:02X}",
                    self.session.connection_id(),
                    other
                );
                let seq = self.session.next_sequence_id();
                let err = ErrPacket::new(1047, "08S01", "Unknown command");
                self.write_packet(&Packet::new(seq, err.encode())).await?;
            }
        }

        Ok(())
    }

    async fn handle_query(&mut self, query: &str) -> tinysql_common::Result<()> {
        let outcome = self
            .executor
            .execute_sql(query, self.session.database_mut());

        match outcome {
            Ok(QueryOutcome::Ok {
                affected_rows,
                last_insert_id,
                info,
            }) => {
                let mut ok = OkPacket::with_rows(affected_rows, last_insert_id);
                ok.info = info;
                self.send_ok(ok).await
            }
            Ok(QueryOutcome::ResultSet(result)) => {
                let deprecate_eof =
                    self.client_capabilities & CLIENT_DEPRECATE_EOF != 0;
                let first_seq = self.session.next_sequence_id();
                let packets = ResultSet::from_query(&result).to_packets(first_seq, deprecate_eof);
                self.write_packets(&packets).await
            }
            Err(sql_error) => {
                debug!(
                    "Connection {}: query failed: {}",
                    self.session.connection_id(),
                    sql_error
                );
                let seq = self.session.next_sequence_id();
                let err = ErrPacket::from(&sql_error);
                self.write_packet(&Packet::new(seq, err.encode())).await
            }
        }
    }

    async fn send_ok(&mut self, ok: OkPacket) -> tinysql_common::Result<()> {
        let seq = self.session.next_sequence_id();
        self.write_packet(&Packet::new(seq, ok.encode())).await
    }

    /// Pop the next complete packet, reading from the socket only when the
    /// buffer has no complete frame left.
    async fn read_packet(&mut self) -> tinysql_common::Result<Packet> {
        loop {
            if let Some(packet) = Packet::decode(&mut self.read_buffer) {
                return Ok(packet);
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                return Err(tinysql_common::TinySqlError::ConnectionClosed);
            }
        }
    }

    async fn write_packet(&mut self, packet: &Packet) -> tinysql_common::Result<()> {
        self.stream.write_all(&packet.encode()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn write_packets(&mut self, packets: &[Packet]) -> tinysql_common::Result<()> {
        let mut buf = BytesMut::new();
        for packet in packets {
            buf.extend_from_slice(&packet.encode());
        }
        let buf: Bytes = buf.freeze();
        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
