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

//! Transport traits used by the console lifecycle

use crate::TransportResult;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;

/// A listening endpoint that hands out one client connection at a time.
///
/// Implementations report an empty accept queue as
/// [`TransportError::WouldBlock`](crate::TransportError::WouldBlock) rather than waiting
/// indefinitely, so the lifecycle can keep ticking.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Connection type produced by [`Transport::accept`]
    type Client: ClientStream;

    /// Opens the listener.
    async fn open(&mut self) -> TransportResult<()>;

    /// Waits at most `wait` for a client to connect.
    async fn accept(&mut self, wait: Duration) -> TransportResult<Self::Client>;

    /// Closes the listener. Closing an endpoint that is not open does nothing.
    async fn close(&mut self);

    /// Address the listener is bound to, once open.
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// A connected client.
#[async_trait]
pub trait ClientStream: Send + 'static {
    /// Sets how long [`ClientStream::recv`] waits before reporting would-block.
    fn set_recv_timeout(&mut self, timeout: Duration) -> TransportResult<()>;

    /// Receives up to `buf.len()` bytes.
    ///
    /// Returns [`TransportError::WouldBlock`](crate::TransportError::WouldBlock) when the
    /// receive timeout expires and [`TransportError::Closed`](crate::TransportError::Closed)
    /// once the peer has closed the connection.
    async fn recv(&mut self, buf: &mut [u8]) -> TransportResult<usize>;

    /// Performs a single send, returning how many bytes the transport accepted.
    async fn send(&mut self, buf: &[u8]) -> TransportResult<usize>;

    /// Shuts the connection down.
    async fn close(&mut self);

    /// Remote address, if known.
    fn peer_addr(&self) -> Option<SocketAddr>;
}
