// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! TCP server: accept loop and connection spawning

use crate::connection::ClientConnection;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tinysql_common::{Result, ServerConfig};
use tinysql_executor::QueryExecutor;
use tinysql_storage::StorageEngine;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{error, info, warn};

pub struct TinySqlServer {
    executor: Arc<QueryExecutor>,
    connection_counter: AtomicU32,
    config: ServerConfig,
}

impl TinySqlServer {
    pub fn new(engine: Arc<StorageEngine>, config: ServerConfig) -> Self {
        Self {
            executor: Arc::new(QueryExecutor::new(engine)),
            connection_counter: AtomicU32::new(1),
            config,
        }
    }

    /// Bind the listening socket with SO_REUSEADDR.
    pub fn bind(&self) -> Result<TcpListener> {
        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .map_err(|e| tinysql_common::TinySqlError::Config(format!("{}", e)))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(1024)?;

        info!("MySQL server listening on {}", addr);
        Ok(listener)
    }

    /// Accept connections until the task is dropped. Each connection runs
    /// in its own task with TCP_NODELAY set.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (socket, peer) = listener.accept().await?;
            if let Err(e) = socket.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
            }

            let connection_id = self.connection_counter.fetch_add(1, Ordering::SeqCst);
            let executor = self.executor.clone();

            info!("Connection {} accepted from {}", connection_id, peer);

            tokio::spawn(async move {
                let connection = ClientConnection::new(socket, connection_id, executor);
                if let Err(e) = connection.handle().await {
                    error!("Connection {} error: {}", connection_id, e);
                }
            });
        }
    }

    /// Bind and serve.
    pub async fn start(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_construction() {
        let engine = Arc::new(StorageEngine::new());
        let server = TinySqlServer::new(engine, ServerConfig::default());
        assert_eq!(server.connection_counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let engine = Arc::new(StorageEngine::new());
        let config = ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };
        let server = TinySqlServer::new(engine, config);
        let listener = server.bind().unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
