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

//! Per-client connection state

use crate::{ClientStream, ConsoleError, ConsoleMetrics, ConsoleResult, TransportError};
use bytes::BytesMut;
use consolenet_telnetcodec::{OptionStore, TelnetEncoder, TelnetFrame, TelnetParser, WindowSize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::codec::Encoder;
use tracing::{debug, info, instrument, trace};

/// Result of reading one byte from the client.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Inbound {
    /// A console data byte
    Data(u8),
    /// A byte consumed by the Telnet protocol
    Absorbed,
    /// Nothing arrived before the receive timeout
    Quiet,
}

/// Everything the server knows about the connected client.
///
/// Created fresh for every accepted connection and dropped by Deinit.
pub struct ConnectionRecord<S> {
    stream: S,
    parser: TelnetParser,
    encoder: TelnetEncoder,
    outbound: BytesMut,
    peer_addr: Option<SocketAddr>,
    created_at: Instant,
    metrics: Arc<ConsoleMetrics>,
    max_tx: usize,
    max_rx: usize,
    authenticated: bool,
}

impl<S: ClientStream> ConnectionRecord<S> {
    /// Wraps an accepted client, assuming `window` until the client reports its size.
    pub fn new(stream: S, window: WindowSize, metrics: Arc<ConsoleMetrics>) -> Self {
        let peer_addr = stream.peer_addr();
        Self {
            stream,
            parser: TelnetParser::new(window),
            encoder: TelnetEncoder::new(),
            outbound: BytesMut::with_capacity(256),
            peer_addr,
            created_at: Instant::now(),
            metrics,
            max_tx: 0,
            max_rx: 0,
            authenticated: false,
        }
    }

    /// Sets the receive timeout used by [`ConnectionRecord::read_input`].
    pub fn set_recv_timeout(&mut self, timeout: Duration) -> ConsoleResult<()> {
        Ok(self.stream.set_recv_timeout(timeout)?)
    }

    /// Sends the baseline negotiation for a new connection.
    ///
    /// Every negotiation goes out as its own three-byte write, and its option state is
    /// recorded only after the whole frame was sent.
    #[instrument(skip(self), fields(peer = ?self.peer_addr))]
    pub async fn force_baseline(&mut self) -> ConsoleResult<()> {
        for negotiation in self.parser.baseline() {
            self.encoder.encode(negotiation.frame(), &mut self.outbound)?;
            let frame = self.outbound.split();
            self.send_all(&frame).await?;
            self.parser.record(negotiation);
        }
        Ok(())
    }

    /// Reads one byte, runs it through the parser and sends any negotiation replies.
    pub async fn read_input(&mut self) -> ConsoleResult<Inbound> {
        let mut byte = [0u8; 1];
        match self.stream.recv(&mut byte).await {
            Ok(0) | Err(TransportError::WouldBlock) => return Ok(Inbound::Quiet),
            Ok(count) => self.record_rx(count),
            Err(err) => return Err(err.into()),
        }
        let data = self.parser.feed(byte[0]);
        self.flush_replies().await?;
        Ok(match data {
            Some(byte) => Inbound::Data(byte),
            None => Inbound::Absorbed,
        })
    }

    /// Writes console data, escaping IAC, and returns the number of bytes sent.
    pub async fn write_data(&mut self, data: &[u8]) -> ConsoleResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        self.encoder.encode(data, &mut self.outbound)?;
        let frame = self.outbound.split();
        self.send_all(&frame).await?;
        Ok(frame.len())
    }

    /// Sends `IAC GA`.
    pub async fn send_go_ahead(&mut self) -> ConsoleResult<()> {
        self.encoder.encode(TelnetFrame::GoAhead, &mut self.outbound)?;
        let frame = self.outbound.split();
        self.send_all(&frame).await
    }

    async fn flush_replies(&mut self) -> ConsoleResult<()> {
        if self.parser.has_replies() {
            let replies = self.parser.take_replies();
            self.send_all(&replies).await?;
        }
        Ok(())
    }

    /// Sends `bytes` in a single write; anything less than the whole buffer is fatal.
    async fn send_all(&mut self, bytes: &[u8]) -> ConsoleResult<()> {
        let written = self.stream.send(bytes).await?;
        self.record_tx(written);
        if written != bytes.len() {
            return Err(ConsoleError::ShortWrite {
                expected: bytes.len(),
                written,
            });
        }
        trace!(written, "Sent");
        Ok(())
    }

    fn record_tx(&mut self, count: usize) {
        self.max_tx = self.max_tx.max(count);
        self.metrics.bytes_sent(count);
    }

    fn record_rx(&mut self, count: usize) {
        self.max_rx = self.max_rx.max(count);
        self.metrics.bytes_received(count);
    }

    /// Shuts the client down.
    pub async fn close(mut self) {
        self.stream.close().await;
        info!(
            peer = ?self.peer_addr,
            duration_ms = self.created_at.elapsed().as_millis() as u64,
            max_tx = self.max_tx,
            max_rx = self.max_rx,
            "Client disconnected"
        );
    }

    /// Terminal size negotiated with the client.
    pub fn window_size(&self) -> WindowSize {
        self.parser.window_size()
    }

    /// Negotiated option states.
    pub fn options(&self) -> &OptionStore {
        self.parser.options()
    }

    /// True when the parser is not in the middle of a command sequence.
    pub fn is_idle(&self) -> bool {
        self.parser.is_idle()
    }

    /// True when output must be followed by `IAC GA`.
    pub fn go_ahead_required(&self) -> bool {
        self.parser.go_ahead_required()
    }

    /// Remote address.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Largest single send on this connection.
    pub fn max_tx(&self) -> usize {
        self.max_tx
    }

    /// Largest single receive on this connection.
    pub fn max_rx(&self) -> usize {
        self.max_rx
    }

    /// True once the client has logged in.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Marks the client as logged in.
    pub fn set_authenticated(&mut self, authenticated: bool) {
        debug!(peer = ?self.peer_addr, authenticated, "Authentication state changed");
        self.authenticated = authenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClient;
    use consolenet_telnetcodec::{TelnetOption, Verb, consts};

    fn record(client: &MockClient) -> ConnectionRecord<MockClient> {
        ConnectionRecord::new(
            client.clone(),
            WindowSize::default(),
            Arc::new(ConsoleMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_baseline_sent_frame_by_frame() {
        let client = MockClient::new();
        let mut conn = record(&client);
        conn.force_baseline().await.unwrap();
        assert_eq!(client.sends(), vec![3, 3, 3, 3, 3]);
        assert_eq!(
            client.sent(),
            vec![
                consts::IAC, consts::DONT, consts::option::ECHO,
                consts::IAC, consts::WILL, consts::option::ECHO,
                consts::IAC, consts::DO, consts::option::SGA,
                consts::IAC, consts::WILL, consts::option::SGA,
                consts::IAC, consts::DO, consts::option::NAWS,
            ]
        );
        assert_eq!(conn.max_tx(), 3);
        assert_eq!(conn.options().get(TelnetOption::Echo), Ok(Verb::Will));
        assert_eq!(conn.options().get(TelnetOption::NAWS), Ok(Verb::Do));
    }

    #[tokio::test]
    async fn test_read_input_classifies_bytes() {
        let client = MockClient::new();
        client.push(&[b'a', consts::IAC, consts::DO, consts::option::ECHO]);
        let mut conn = record(&client);

        assert_eq!(conn.read_input().await.unwrap(), Inbound::Data(b'a'));
        assert_eq!(conn.read_input().await.unwrap(), Inbound::Absorbed);
        assert!(!conn.is_idle());
        assert_eq!(conn.read_input().await.unwrap(), Inbound::Absorbed);
        assert_eq!(conn.read_input().await.unwrap(), Inbound::Absorbed);
        assert!(conn.is_idle());
        assert_eq!(conn.read_input().await.unwrap(), Inbound::Quiet);

        assert_eq!(
            client.sent(),
            vec![consts::IAC, consts::WILL, consts::option::ECHO]
        );
        assert_eq!(conn.max_rx(), 1);
    }

    #[tokio::test]
    async fn test_read_error_propagates() {
        let client = MockClient::new();
        client.push_error(TransportError::Closed);
        let mut conn = record(&client);
        let err = conn.read_input().await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Transport(TransportError::Closed)
        ));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_short_write_is_fatal() {
        let client = MockClient::new();
        client.limit_send(2);
        let mut conn = record(&client);
        let err = conn.force_baseline().await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::ShortWrite {
                expected: 3,
                written: 2
            }
        ));
        assert_eq!(client.sends(), vec![2]);
        // A frame that did not go out completely is not recorded
        assert_eq!(conn.options(), &OptionStore::new());
    }

    #[tokio::test]
    async fn test_write_data_escapes_iac() {
        let client = MockClient::new();
        let mut conn = record(&client);
        assert_eq!(conn.write_data(b"x\xFFy").await.unwrap(), 4);
        assert_eq!(conn.write_data(b"").await.unwrap(), 0);
        conn.send_go_ahead().await.unwrap();
        assert_eq!(client.sent(), b"x\xFF\xFFy\xFF\xF9".to_vec());
    }

    #[tokio::test]
    async fn test_close_shuts_client() {
        let client = MockClient::new();
        let conn = record(&client);
        conn.close().await;
        assert!(client.is_closed());
    }
}
