use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use bytes::{Buf, BytesMut};

use crate::http::codec;
use crate::server::RequestHandler;

/// Bytes read from the socket per advance step.
const RECV_CHUNK: usize = 1024;

/// One accepted peer: its socket plus the read and write buffers that
/// carry partial messages across ticks.
pub struct Connection {
    stream: Option<TcpStream>,
    read_buf: BytesMut,
    write_buf: BytesMut,
    handler: Arc<dyn RequestHandler>,
}

impl Connection {
    pub fn new(stream: TcpStream, handler: Arc<dyn RequestHandler>) -> Self {
        Self {
            stream: Some(stream),
            read_buf: BytesMut::with_capacity(4096),
            write_buf: BytesMut::new(),
            handler,
        }
    }

    /// Drives this connection one non-blocking step.
    ///
    /// Returns `false` once the connection is finished and should be
    /// dropped by its owner: the peer closed, an I/O error occurred, or
    /// the single reply has been fully flushed.
    pub fn advance(&mut self) -> bool {
        if self.stream.is_none() {
            return false;
        }

        self.try_read() && self.try_write()
    }

    fn try_read(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };

        let mut chunk = [0u8; RECV_CHUNK];
        match stream.read(&mut chunk) {
            // Zero bytes means the peer closed its end
            Ok(0) => {
                self.close();
                false
            }
            Ok(n) => {
                self.read_buf.extend_from_slice(&chunk[..n]);
                if let Some((request, consumed)) = codec::parse_request(&self.read_buf) {
                    self.read_buf.advance(consumed);
                    let reply = self.handler.handle(&request);
                    self.write_buf.extend_from_slice(&reply);
                }
                true
            }
            // Not readable this tick
            Err(e) if e.kind() == ErrorKind::WouldBlock => true,
            Err(e) => {
                tracing::debug!("read error, dropping connection: {}", e);
                self.close();
                false
            }
        }
    }

    fn try_write(&mut self) -> bool {
        if self.write_buf.is_empty() {
            return true;
        }

        let Some(stream) = self.stream.as_mut() else {
            return false;
        };

        match stream.write(&self.write_buf) {
            Ok(n) => {
                // Partial sends are normal; the remainder stays queued
                self.write_buf.advance(n);
                if self.write_buf.is_empty() {
                    // One request, one reply, then done
                    self.close();
                    return false;
                }
                true
            }
            // Not writable this tick
            Err(e) if e.kind() == ErrorKind::WouldBlock => true,
            Err(e) => {
                tracing::debug!("write error, dropping connection: {}", e);
                self.close();
                false
            }
        }
    }

    /// Releases the socket and clears both buffers. Terminal and safe
    /// to call more than once.
    pub fn close(&mut self) {
        self.stream = None;
        self.read_buf.clear();
        self.write_buf.clear();
    }
}
