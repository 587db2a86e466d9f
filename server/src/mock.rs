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

//! Scripted in-memory transport for unit tests

use crate::{ClientStream, Transport, TransportError, TransportResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum RecvStep {
    Bytes(Vec<u8>),
    WouldBlock,
    Error(TransportError),
}

#[derive(Default)]
struct ClientState {
    script: VecDeque<RecvStep>,
    sent: Vec<u8>,
    sends: Vec<usize>,
    send_limit: Option<usize>,
    recv_timeout: Option<Duration>,
    closed: bool,
}

/// Client whose inbound bytes are scripted and whose outbound bytes are recorded.
///
/// Clones share state, so a test keeps one clone after handing the other to the server.
/// An exhausted script reads as would-block.
#[derive(Clone, Default)]
pub(crate) struct MockClient {
    state: Arc<Mutex<ClientState>>,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, bytes: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(RecvStep::Bytes(bytes.to_vec()));
    }

    pub(crate) fn push_would_block(&self) {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(RecvStep::WouldBlock);
    }

    pub(crate) fn push_error(&self, err: TransportError) {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(RecvStep::Error(err));
    }

    pub(crate) fn limit_send(&self, limit: usize) {
        self.state.lock().unwrap().send_limit = Some(limit);
    }

    pub(crate) fn sent(&self) -> Vec<u8> {
        self.state.lock().unwrap().sent.clone()
    }

    pub(crate) fn sends(&self) -> Vec<usize> {
        self.state.lock().unwrap().sends.clone()
    }

    pub(crate) fn recv_timeout(&self) -> Option<Duration> {
        self.state.lock().unwrap().recv_timeout
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[async_trait]
impl ClientStream for MockClient {
    fn set_recv_timeout(&mut self, timeout: Duration) -> TransportResult<()> {
        self.state.lock().unwrap().recv_timeout = Some(timeout);
        Ok(())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        let mut state = self.state.lock().unwrap();
        match state.script.pop_front() {
            None | Some(RecvStep::WouldBlock) => Err(TransportError::WouldBlock),
            Some(RecvStep::Error(err)) => Err(err),
            Some(RecvStep::Bytes(mut bytes)) => {
                let count = bytes.len().min(buf.len());
                buf[..count].copy_from_slice(&bytes[..count]);
                let rest = bytes.split_off(count);
                if !rest.is_empty() {
                    state.script.push_front(RecvStep::Bytes(rest));
                }
                Ok(count)
            }
        }
    }

    async fn send(&mut self, buf: &[u8]) -> TransportResult<usize> {
        let mut state = self.state.lock().unwrap();
        let count = state.send_limit.map_or(buf.len(), |limit| buf.len().min(limit));
        state.sent.extend_from_slice(&buf[..count]);
        state.sends.push(count);
        Ok(count)
    }

    async fn close(&mut self) {
        self.state.lock().unwrap().closed = true;
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(SocketAddr::from(([192, 0, 2, 7], 49152)))
    }
}

enum AcceptStep {
    Client(MockClient),
    Error(TransportError),
}

#[derive(Default)]
struct TransportState {
    open_failures: usize,
    accepts: VecDeque<AcceptStep>,
    open: bool,
    opens: usize,
    closes: usize,
}

/// Listener that hands out scripted clients.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_opens(&self, count: usize) {
        self.state.lock().unwrap().open_failures = count;
    }

    pub(crate) fn push_client(&self, client: &MockClient) {
        self.state
            .lock()
            .unwrap()
            .accepts
            .push_back(AcceptStep::Client(client.clone()));
    }

    pub(crate) fn push_accept_error(&self, err: TransportError) {
        self.state
            .lock()
            .unwrap()
            .accepts
            .push_back(AcceptStep::Error(err));
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    pub(crate) fn opens(&self) -> usize {
        self.state.lock().unwrap().opens
    }

    pub(crate) fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Client = MockClient;

    async fn open(&mut self) -> TransportResult<()> {
        let mut state = self.state.lock().unwrap();
        state.opens += 1;
        if state.open_failures > 0 {
            state.open_failures -= 1;
            return Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::AddrInUse,
            )));
        }
        state.open = true;
        Ok(())
    }

    async fn accept(&mut self, _wait: Duration) -> TransportResult<MockClient> {
        let mut state = self.state.lock().unwrap();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        match state.accepts.pop_front() {
            None => Err(TransportError::WouldBlock),
            Some(AcceptStep::Client(client)) => Ok(client),
            Some(AcceptStep::Error(err)) => Err(err),
        }
    }

    async fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.open {
            state.open = false;
            state.closes += 1;
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.state
            .lock()
            .unwrap()
            .open
            .then(|| SocketAddr::from(([127, 0, 0, 1], 2323)))
    }
}
