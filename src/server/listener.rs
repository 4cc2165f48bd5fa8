use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use anyhow::Context;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::RequestHandler;

/// Owns the listening socket and the set of live connections.
pub struct Server {
    config: ServerConfig,
    handler: Arc<dyn RequestHandler>,
    listener: Option<TcpListener>,
    clients: Vec<Connection>,
}

impl Server {
    pub fn new(config: ServerConfig, handler: Arc<dyn RequestHandler>) -> Self {
        Self {
            config,
            handler,
            listener: None,
            clients: Vec::new(),
        }
    }

    /// Binds the listening socket, closing any prior one first.
    ///
    /// A failed bind (typically the port already being in use) is
    /// propagated to the caller; the server never retries on its own.
    pub fn listen(&mut self) -> anyhow::Result<()> {
        self.close();

        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .with_context(|| format!("invalid listen address {}", self.config.listen_addr()))?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket
            .bind(&addr.into())
            .with_context(|| format!("failed to bind {}", addr))?;
        socket.listen(self.config.backlog as i32)?;
        socket.set_nonblocking(true)?;

        let listener: TcpListener = socket.into();
        info!("Listening on {}", listener.local_addr()?);

        self.listener = Some(listener);
        Ok(())
    }

    /// The bound address, once `listen` has succeeded. Useful when the
    /// configured port is 0 and the OS picked one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Number of live connections (for monitoring).
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// One non-blocking step: accept at most one pending peer, then
    /// advance every live connection exactly once, dropping the
    /// finished ones.
    pub fn advance(&mut self) {
        if self.listener.is_none() {
            return;
        }

        self.accept_client();
        self.advance_clients();
    }

    fn accept_client(&mut self) {
        let Some(listener) = self.listener.as_ref() else {
            return;
        };

        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("Accepted connection from {}", peer);
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!("Failed to set {} non-blocking: {}", peer, e);
                    return;
                }
                self.clients
                    .push(Connection::new(stream, Arc::clone(&self.handler)));
            }
            // No pending peer this tick
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("Accept failed: {}", e),
        }
    }

    fn advance_clients(&mut self) {
        self.clients.retain_mut(|client| client.advance());
    }

    /// Closes the listening socket and every live connection.
    /// Idempotent.
    pub fn close(&mut self) {
        self.listener = None;

        for client in &mut self.clients {
            client.close();
        }
        self.clients.clear();
    }
}
