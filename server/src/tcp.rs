//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Tokio TCP transport

use crate::{ClientStream, ConsoleConfig, Transport, TransportError, TransportResult};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::{debug, instrument, trace};

/// Pending connections queued by the listener; the console serves a single client.
const LISTEN_BACKLOG: u32 = 1;

/// TCP listener for the console.
#[derive(Debug)]
pub struct TcpTransport {
    bind_address: SocketAddr,
    write_timeout: Duration,
    listener: Option<TcpListener>,
}

impl TcpTransport {
    /// Creates a transport that binds `bind_address` when opened.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            write_timeout: Duration::from_secs(5),
            listener: None,
        }
    }

    /// Creates a transport from the console configuration.
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            bind_address: config.bind_address,
            write_timeout: config.write_timeout,
            listener: None,
        }
    }

    /// True while the listener is open.
    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    type Client = TcpClient;

    #[instrument(skip(self), fields(bind_address = %self.bind_address))]
    async fn open(&mut self) -> TransportResult<()> {
        let socket = if self.bind_address.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(self.bind_address)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;
        debug!(local_addr = ?listener.local_addr().ok(), "Listener open");
        self.listener = Some(listener);
        Ok(())
    }

    async fn accept(&mut self, wait: Duration) -> TransportResult<TcpClient> {
        let listener = self.listener.as_ref().ok_or(TransportError::NotOpen)?;
        match timeout(wait, listener.accept()).await {
            Err(_) => Err(TransportError::WouldBlock),
            Ok(Err(err)) => Err(err.into()),
            Ok(Ok((stream, peer))) => {
                stream.set_nodelay(true)?;
                Ok(TcpClient::new(stream, peer, self.write_timeout))
            }
        }
    }

    async fn close(&mut self) {
        if self.listener.take().is_some() {
            debug!(bind_address = %self.bind_address, "Listener closed");
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }
}

/// An accepted TCP client.
#[derive(Debug)]
pub struct TcpClient {
    stream: TcpStream,
    peer: SocketAddr,
    recv_timeout: Duration,
    write_timeout: Duration,
}

impl TcpClient {
    fn new(stream: TcpStream, peer: SocketAddr, write_timeout: Duration) -> Self {
        Self {
            stream,
            peer,
            recv_timeout: Duration::from_millis(100),
            write_timeout,
        }
    }
}

#[async_trait]
impl ClientStream for TcpClient {
    fn set_recv_timeout(&mut self, timeout: Duration) -> TransportResult<()> {
        if timeout.is_zero() {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "receive timeout must be greater than 0",
            )));
        }
        self.recv_timeout = timeout;
        Ok(())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        match timeout(self.recv_timeout, self.stream.read(buf)).await {
            Err(_) => Err(TransportError::WouldBlock),
            Ok(Ok(0)) if !buf.is_empty() => Err(TransportError::Closed),
            Ok(Ok(n)) => Ok(n),
            Ok(Err(err)) => Err(err.into()),
        }
    }

    async fn send(&mut self, buf: &[u8]) -> TransportResult<usize> {
        match timeout(self.write_timeout, self.stream.write(buf)).await {
            Err(_) => {
                trace!(peer = %self.peer, "Send timed out");
                Ok(0)
            }
            Ok(result) => Ok(result?),
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.shutdown().await {
            trace!(peer = %self.peer, %err, "Shutdown after close");
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
