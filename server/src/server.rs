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

//! Console lifecycle

use crate::{
    AuthStatus, Authenticator, CommandInterpreter, ConnectionRecord, ConsoleConfig, ConsoleError,
    ConsoleMetrics, ConsoleResult, Inbound, LifecycleState, MetricsSnapshot, OutputBuffer,
    ServerReport, ServerStatus, Transport,
};
use consolenet_telnetcodec::consts;
use metrics::gauge;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// What the tick loop does after a state step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Run the next state within the same tick
    Continue(LifecycleState),
    /// End the tick in the next state
    Yield(LifecycleState),
}

/// Single-client Telnet console.
///
/// The server is a state machine advanced by [`ConsoleServer::tick`]. Every tick is bounded
/// by the transport timeouts, so the caller decides how the machine is scheduled: drive it
/// by hand, or hand it to [`ConsoleServer::spawn`].
///
/// # Example
///
/// ```no_run
/// use consolenet_server::{ConsoleBuffer, ConsoleConfig, ConsoleServer, OutputBuffer, TcpTransport};
/// use consolenet_telnetcodec::WindowSize;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConsoleConfig::new("0.0.0.0:2323".parse()?);
/// let transport = TcpTransport::from_config(&config);
/// let echo = |byte: u8, _window: WindowSize, output: &mut dyn OutputBuffer| output.write(&[byte]);
/// let server = ConsoleServer::new(config, transport, echo, ConsoleBuffer::default())?;
/// let handle = server.spawn();
/// // ...
/// handle.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConsoleServer<T: Transport, I, B> {
    config: ConsoleConfig,
    transport: T,
    interpreter: I,
    output: B,
    state: LifecycleState,
    status: ServerStatus,
    connection: Option<ConnectionRecord<T::Client>>,
    authenticator: Authenticator,
    metrics: Arc<ConsoleMetrics>,
    reports: watch::Sender<ServerReport>,
}

impl<T, I, B> ConsoleServer<T, I, B>
where
    T: Transport,
    I: CommandInterpreter,
    B: OutputBuffer,
{
    /// Creates a server in the Init state.
    pub fn new(config: ConsoleConfig, transport: T, interpreter: I, output: B) -> ConsoleResult<Self> {
        config.validate().map_err(ConsoleError::Config)?;
        let authenticator = Authenticator::new(
            config.identity.as_bytes(),
            config.secret.as_bytes(),
            config.echo_secret,
        );
        let (reports, _) = watch::channel(ServerReport::default());
        Ok(Self {
            config,
            transport,
            interpreter,
            output,
            state: LifecycleState::Init,
            status: ServerStatus::default(),
            connection: None,
            authenticator,
            metrics: Arc::new(ConsoleMetrics::new()),
            reports,
        })
    }

    /// Advances the lifecycle until a state yields, returning the state reached.
    pub async fn tick(&mut self) -> LifecycleState {
        let mut state = self.state;
        loop {
            let step = match state {
                LifecycleState::Deinit => self.deinit().await,
                LifecycleState::Init => self.init().await,
                LifecycleState::Waiting => self.wait_for_client().await,
                LifecycleState::Options => self.negotiate().await,
                LifecycleState::Authenticate => self.authenticate().await,
                LifecycleState::Running => self.run().await,
            };
            match step {
                Step::Continue(next) => {
                    self.transition(next);
                    state = next;
                }
                Step::Yield(next) => {
                    self.transition(next);
                    break;
                }
            }
        }
        self.reports.send_replace(self.report());
        self.state
    }

    fn transition(&mut self, next: LifecycleState) {
        if next != self.state {
            debug!(from = %self.state, to = %next, "Lifecycle transition");
            self.state = next;
        }
    }

    async fn deinit(&mut self) -> Step {
        if let Some(conn) = self.connection.take() {
            conn.close().await;
            gauge!("consolenet.client.connected").set(0.0);
        }
        self.transport.close().await;
        self.status.clear();
        self.authenticator.reset();
        Step::Yield(LifecycleState::Init)
    }

    async fn init(&mut self) -> Step {
        if let Err(err) = self.transport.open().await {
            error!(%err, "Failed to open listener");
            tokio::time::sleep(self.config.retry_delay).await;
            return Step::Yield(LifecycleState::Deinit);
        }
        self.connection = None;
        self.status.server_up = true;
        info!(local_addr = ?self.transport.local_addr(), "Console listening");
        Step::Continue(LifecycleState::Waiting)
    }

    async fn wait_for_client(&mut self) -> Step {
        let client = match self.transport.accept(self.config.accept_wait).await {
            Ok(client) => client,
            Err(err) if err.is_transient() => {
                trace!(%err, "No client");
                return Step::Yield(LifecycleState::Waiting);
            }
            Err(err) => return self.fault(err.into()),
        };

        let mut conn =
            ConnectionRecord::new(client, self.config.terminal_size, Arc::clone(&self.metrics));
        self.metrics.connection_opened();
        info!(peer = ?conn.peer_addr(), "Client connected");

        let prepared = match conn.set_recv_timeout(self.config.negotiation_timeout) {
            Ok(()) => conn.force_baseline().await,
            Err(err) => Err(err),
        };
        self.connection = Some(conn);
        self.status.client_connected = true;
        gauge!("consolenet.client.connected").set(1.0);
        match prepared {
            Ok(()) => Step::Continue(LifecycleState::Options),
            Err(err) => self.fault(err),
        }
    }

    async fn negotiate(&mut self) -> Step {
        let Some(conn) = self.connection.as_mut() else {
            return Step::Yield(LifecycleState::Deinit);
        };
        match conn.read_input().await {
            Err(err) => self.recover(err),
            Ok(Inbound::Absorbed) => Step::Yield(LifecycleState::Options),
            Ok(Inbound::Quiet) if !conn.is_idle() => Step::Yield(LifecycleState::Options),
            Ok(inbound) => {
                if let Inbound::Data(byte) = inbound {
                    warn!(byte, "Data received during option negotiation");
                }
                debug!(window = %conn.window_size(), "Option negotiation complete");
                match conn.set_recv_timeout(self.config.read_timeout) {
                    Ok(()) => Step::Continue(LifecycleState::Authenticate),
                    Err(err) => self.recover(err),
                }
            }
        }
    }

    async fn authenticate(&mut self) -> Step {
        let Some(conn) = self.connection.as_mut() else {
            return Step::Yield(LifecycleState::Deinit);
        };
        if self.config.authenticate {
            match self.authenticator.authenticate(conn).await {
                Ok(AuthStatus::Pending) => return Step::Yield(LifecycleState::Authenticate),
                Ok(AuthStatus::Failure) => return self.fault(ConsoleError::AuthenticationFailed),
                Err(err) => return self.recover(err),
                Ok(AuthStatus::Success) => {
                    conn.set_authenticated(true);
                    self.status.authenticated = true;
                    info!(peer = ?conn.peer_addr(), "Client authenticated");
                }
            }
        }
        match Self::drain_output(conn, &mut self.output).await {
            Ok(_) => Step::Continue(LifecycleState::Running),
            Err(err) => self.fault(err),
        }
    }

    async fn run(&mut self) -> Step {
        let Some(conn) = self.connection.as_mut() else {
            return Step::Yield(LifecycleState::Deinit);
        };
        match conn.read_input().await {
            Err(err) => self.recover(err),
            Ok(Inbound::Absorbed) => Step::Yield(LifecycleState::Running),
            Ok(Inbound::Quiet) => match Self::drain_output(conn, &mut self.output).await {
                Ok(sent) if sent > 0 && conn.go_ahead_required() => {
                    match conn.send_go_ahead().await {
                        Ok(()) => Step::Yield(LifecycleState::Running),
                        Err(err) => self.recover(err),
                    }
                }
                Ok(_) => Step::Yield(LifecycleState::Running),
                Err(err) => self.recover(err),
            },
            Ok(Inbound::Data(consts::GS)) => {
                info!(peer = ?conn.peer_addr(), "Client requested disconnect");
                Step::Yield(LifecycleState::Deinit)
            }
            Ok(Inbound::Data(byte)) => {
                self.interpreter
                    .process(byte, conn.window_size(), &mut self.output);
                match Self::drain_output(conn, &mut self.output).await {
                    Ok(_) => Step::Yield(LifecycleState::Running),
                    Err(err) => self.recover(err),
                }
            }
        }
    }

    async fn drain_output(conn: &mut ConnectionRecord<T::Client>, output: &mut B) -> ConsoleResult<usize> {
        if output.pending() == 0 {
            return Ok(0);
        }
        let pending = output.drain();
        conn.write_data(&pending).await
    }

    /// Retries the current state after a transient error, tears down after anything else.
    fn recover(&mut self, err: ConsoleError) -> Step {
        if err.is_fatal() {
            return self.fault(err);
        }
        debug!(state = %self.state, %err, "Transient client error");
        Step::Yield(self.state)
    }

    fn fault(&mut self, err: ConsoleError) -> Step {
        match err {
            ConsoleError::AuthenticationFailed => {
                warn!(state = %self.state, "Authentication failed");
                self.metrics.auth_failure();
            }
            err => {
                error!(state = %self.state, %err, "Connection fault");
                self.metrics.connection_error();
            }
        }
        Step::Yield(LifecycleState::Deinit)
    }

    /// Flushes pending output to a running client and tears everything down.
    pub async fn shutdown(&mut self) {
        if self.state == LifecycleState::Running {
            if let Some(conn) = self.connection.as_mut() {
                if let Err(err) = Self::drain_output(conn, &mut self.output).await {
                    debug!(%err, "Final flush failed");
                }
            }
        }
        self.deinit().await;
        self.transition(LifecycleState::Deinit);
        self.reports.send_replace(self.report());
    }

    /// Runs the tick loop on a tokio task until [`ConsoleHandle::stop`] is called.
    pub fn spawn(mut self) -> ConsoleHandle {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown_notify = Arc::new(Notify::new());
        let reports = self.reports.subscribe();
        let metrics = Arc::clone(&self.metrics);

        let task = tokio::spawn({
            let running = Arc::clone(&running);
            let shutdown_notify = Arc::clone(&shutdown_notify);
            async move {
                info!("Console task started");
                while running.load(Ordering::SeqCst) {
                    tokio::select! {
                        _ = self.tick() => {}
                        _ = shutdown_notify.notified() => break,
                    }
                    tokio::task::yield_now().await;
                }
                self.shutdown().await;
                info!("Console task terminated");
            }
        });

        ConsoleHandle {
            running,
            shutdown_notify,
            task: Some(task),
            reports,
            metrics,
        }
    }

    /// Snapshot of the lifecycle, connection and option state.
    pub fn report(&self) -> ServerReport {
        let conn = self.connection.as_ref();
        ServerReport {
            state: self.state,
            status: self.status,
            local_addr: self.transport.local_addr(),
            peer_addr: conn.and_then(ConnectionRecord::peer_addr),
            max_tx: self.metrics.max_tx(),
            max_rx: self.metrics.max_rx(),
            window: conn.map_or(self.config.terminal_size, ConnectionRecord::window_size),
            options: conn
                .map(|conn| conn.options().iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Current status flags.
    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// The attached client, if any.
    pub fn connection(&self) -> Option<&ConnectionRecord<T::Client>> {
        self.connection.as_ref()
    }

    /// Transfer statistics.
    pub fn metrics(&self) -> Arc<ConsoleMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Server configuration.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

impl<T: Transport, I, B> std::fmt::Debug for ConsoleServer<T, I, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleServer")
            .field("bind_address", &self.config.bind_address)
            .field("state", &self.state)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Control handle for a spawned [`ConsoleServer`].
#[derive(Debug)]
pub struct ConsoleHandle {
    running: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
    task: Option<JoinHandle<()>>,
    reports: watch::Receiver<ServerReport>,
    metrics: Arc<ConsoleMetrics>,
}

impl ConsoleHandle {
    /// Check if the console task is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Report published at the end of the latest tick
    pub fn report(&self) -> ServerReport {
        self.reports.borrow().clone()
    }

    /// Waits until a published report satisfies `predicate`
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&ServerReport) -> bool,
    ) -> ConsoleResult<ServerReport> {
        self.reports
            .wait_for(predicate)
            .await
            .map(|report| (*report).clone())
            .map_err(|_| ConsoleError::Task("console task ended".to_string()))
    }

    /// Transfer statistics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stops the tick loop and waits for the final flush and teardown.
    pub async fn stop(mut self) -> ConsoleResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(ConsoleError::Task("console task not running".to_string()));
        }
        info!("Stopping console");
        self.shutdown_notify.notify_one();
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|err| ConsoleError::Task(err.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for ConsoleHandle {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            warn!("ConsoleHandle dropped while still running");
            self.shutdown_notify.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockClient, MockTransport};
    use crate::{ConsoleBuffer, TransportError};
    use consolenet_telnetcodec::{TelnetOption, Verb, WindowSize};
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing_test::traced_test;

    type Seen = Arc<Mutex<Vec<(u8, WindowSize)>>>;

    const BASELINE: [u8; 15] = [
        consts::IAC, consts::DONT, consts::option::ECHO,
        consts::IAC, consts::WILL, consts::option::ECHO,
        consts::IAC, consts::DO, consts::option::SGA,
        consts::IAC, consts::WILL, consts::option::SGA,
        consts::IAC, consts::DO, consts::option::NAWS,
    ];

    fn upper_case(seen: &Seen) -> impl CommandInterpreter + use<> {
        let seen = Arc::clone(seen);
        move |byte: u8, window: WindowSize, output: &mut dyn OutputBuffer| {
            seen.lock().unwrap().push((byte, window));
            output.write(&[byte.to_ascii_uppercase()]);
        }
    }

    fn server(
        config: ConsoleConfig,
        transport: &MockTransport,
        output: &ConsoleBuffer,
    ) -> (ConsoleServer<MockTransport, impl CommandInterpreter + use<>, ConsoleBuffer>, Seen) {
        let seen = Seen::default();
        let server = ConsoleServer::new(config, transport.clone(), upper_case(&seen), output.clone())
            .unwrap();
        (server, seen)
    }

    fn connected(
        config: ConsoleConfig,
    ) -> (
        ConsoleServer<MockTransport, impl CommandInterpreter + use<>, ConsoleBuffer>,
        MockTransport,
        MockClient,
        Seen,
    ) {
        let transport = MockTransport::new();
        let client = MockClient::new();
        transport.push_client(&client);
        let (server, seen) = server(config, &transport, &ConsoleBuffer::new(256));
        (server, transport, client, seen)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ConsoleConfig::default().with_credentials("", "secret");
        let result = ConsoleServer::new(
            config,
            MockTransport::new(),
            |_: u8, _: WindowSize, _: &mut dyn OutputBuffer| {},
            ConsoleBuffer::default(),
        );
        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[tokio::test]
    async fn test_init_opens_listener_then_waits() {
        let transport = MockTransport::new();
        let (mut server, _) = server(ConsoleConfig::default(), &transport, &ConsoleBuffer::default());
        assert_eq!(server.state(), LifecycleState::Init);

        assert_eq!(server.tick().await, LifecycleState::Waiting);
        assert!(transport.is_open());
        assert!(server.status().server_up);
        assert!(!server.status().client_connected);
        assert!(server.report().local_addr.is_some());

        assert_eq!(server.tick().await, LifecycleState::Waiting);
        assert_eq!(transport.opens(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_failure_backs_off_through_deinit() {
        let transport = MockTransport::new();
        transport.fail_opens(1);
        let (mut server, _) = server(ConsoleConfig::default(), &transport, &ConsoleBuffer::default());

        assert_eq!(server.tick().await, LifecycleState::Deinit);
        assert!(!server.status().server_up);
        assert_eq!(server.tick().await, LifecycleState::Init);
        assert_eq!(server.tick().await, LifecycleState::Waiting);
        assert_eq!(transport.opens(), 2);
        assert!(server.status().server_up);
    }

    #[tokio::test]
    async fn test_accept_errors() {
        let transport = MockTransport::new();
        transport.push_accept_error(TransportError::Aborted);
        transport.push_accept_error(TransportError::Io(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        )));
        let (mut server, _) = server(ConsoleConfig::default(), &transport, &ConsoleBuffer::default());

        assert_eq!(server.tick().await, LifecycleState::Waiting);
        assert_eq!(server.tick().await, LifecycleState::Deinit);
        assert_eq!(server.tick().await, LifecycleState::Init);
        assert!(!transport.is_open());
        assert_eq!(transport.closes(), 1);
    }

    #[tokio::test]
    async fn test_quiet_negotiation_moves_to_authenticate() {
        let config = ConsoleConfig::default().with_authentication(true);
        let (mut server, _, client, _) = connected(config);

        assert_eq!(server.tick().await, LifecycleState::Authenticate);
        assert!(server.status().client_connected);
        assert!(!server.status().authenticated);
        assert_eq!(client.recv_timeout(), Some(Duration::from_millis(70)));

        let mut expected = BASELINE.to_vec();
        expected.extend_from_slice(b"User: ");
        assert_eq!(client.sent(), expected);
    }

    #[tokio::test]
    async fn test_negotiation_waits_for_complete_sequence() {
        let (mut server, _, client, _) = connected(ConsoleConfig::default());
        client.push(&[consts::IAC, consts::DO]);

        assert_eq!(server.tick().await, LifecycleState::Options);
        assert_eq!(server.tick().await, LifecycleState::Options);
        // Quiet in the middle of a command keeps negotiating
        assert_eq!(server.tick().await, LifecycleState::Options);
        assert_eq!(client.recv_timeout(), Some(Duration::from_millis(100)));

        client.push(&[consts::option::ECHO]);
        assert_eq!(server.tick().await, LifecycleState::Options);
        assert_eq!(server.tick().await, LifecycleState::Running);
        assert!(
            client
                .sent()
                .ends_with(&[consts::IAC, consts::WILL, consts::option::ECHO])
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_data_during_negotiation_ends_phase() {
        let (mut server, _, client, seen) = connected(ConsoleConfig::default());
        client.push(b"x");

        assert_eq!(server.tick().await, LifecycleState::Running);
        assert!(logs_contain("Data received during option negotiation"));
        assert!(server.status().client_connected);
        assert_eq!(client.recv_timeout(), Some(Duration::from_millis(70)));

        for _ in 0..3 {
            assert_eq!(server.tick().await, LifecycleState::Running);
        }
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(client.sent(), BASELINE.to_vec());
    }

    #[tokio::test]
    async fn test_transient_read_error_is_retried() {
        let (mut server, _, client, seen) = connected(ConsoleConfig::default());
        assert_eq!(server.tick().await, LifecycleState::Running);

        client.push_error(TransportError::Aborted);
        client.push(b"k");
        assert_eq!(server.tick().await, LifecycleState::Running);
        assert_eq!(server.tick().await, LifecycleState::Running);
        assert_eq!(*seen.lock().unwrap(), vec![(b'k', WindowSize::default())]);
        assert_eq!(server.metrics().snapshot().connection_errors, 0);
        assert!(!client.is_closed());
    }

    #[tokio::test]
    async fn test_authentication_disabled_flushes_buffered_output() {
        let transport = MockTransport::new();
        let client = MockClient::new();
        transport.push_client(&client);
        let mut output = ConsoleBuffer::new(256);
        OutputBuffer::write(&mut output, b"boot ok\r\n");
        let (mut server, _) = server(ConsoleConfig::default(), &transport, &output);

        assert_eq!(server.tick().await, LifecycleState::Running);
        let mut expected = BASELINE.to_vec();
        expected.extend_from_slice(b"boot ok\r\n");
        assert_eq!(client.sent(), expected);
        assert!(!server.status().authenticated);
    }

    #[tokio::test]
    async fn test_authentication_success_reaches_running() {
        let config = ConsoleConfig::default().with_authentication(true);
        let (mut server, _, client, _) = connected(config);
        // One quiet read ends negotiation, the next leaves the login pending
        client.push_would_block();
        client.push_would_block();
        client.push(b"TestUser\rTestPass\r");

        assert_eq!(server.tick().await, LifecycleState::Authenticate);
        assert_eq!(server.tick().await, LifecycleState::Running);
        assert!(server.status().authenticated);
        assert!(server.connection().unwrap().is_authenticated());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_authentication_failure_tears_down() {
        let config = ConsoleConfig::default().with_authentication(true);
        let (mut server, transport, client, _) = connected(config);
        client.push_would_block();
        client.push_would_block();
        client.push(b"intruder\r");

        assert_eq!(server.tick().await, LifecycleState::Authenticate);
        assert_eq!(server.tick().await, LifecycleState::Deinit);
        assert_eq!(server.metrics().snapshot().auth_failures, 1);
        assert!(logs_contain("Authentication failed"));

        assert_eq!(server.tick().await, LifecycleState::Init);
        assert!(client.is_closed());
        assert!(!transport.is_open());
        assert!(server.connection().is_none());
    }

    #[tokio::test]
    async fn test_running_forwards_input_with_window_size() {
        let (mut server, _, client, seen) = connected(ConsoleConfig::default());
        client.push(&[
            consts::IAC, consts::SB, consts::option::NAWS, 0, 100, 0, 40, consts::IAC, consts::SE,
        ]);
        client.push_would_block();
        client.push(b"a");

        for _ in 0..20 {
            server.tick().await;
        }
        assert_eq!(server.state(), LifecycleState::Running);
        assert_eq!(*seen.lock().unwrap(), vec![(b'a', WindowSize::new(100, 40))]);
        assert!(client.sent().ends_with(b"A"));
        assert_eq!(server.report().window, WindowSize::new(100, 40));
    }

    #[tokio::test]
    async fn test_disconnect_character() {
        let (mut server, _, client, seen) = connected(ConsoleConfig::default());
        assert_eq!(server.tick().await, LifecycleState::Running);

        client.push(&[consts::GS]);
        assert_eq!(server.tick().await, LifecycleState::Deinit);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(server.tick().await, LifecycleState::Init);
        assert!(client.is_closed());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_transport_error_in_running_returns_to_init() {
        let (mut server, transport, client, _) = connected(ConsoleConfig::default());
        assert_eq!(server.tick().await, LifecycleState::Running);

        client.push_error(TransportError::Io(std::io::Error::from(
            std::io::ErrorKind::ConnectionReset,
        )));
        assert_eq!(server.tick().await, LifecycleState::Deinit);
        assert!(logs_contain("Connection fault"));

        assert_eq!(server.tick().await, LifecycleState::Init);
        assert!(server.connection().is_none());
        assert_eq!(server.status(), ServerStatus::default());
        assert!(client.is_closed());

        assert_eq!(server.tick().await, LifecycleState::Waiting);
        assert!(transport.is_open());
        assert_eq!(server.metrics().snapshot().connection_errors, 1);
    }

    #[tokio::test]
    async fn test_short_write_during_baseline_is_fatal() {
        let (mut server, _, client, _) = connected(ConsoleConfig::default());
        client.limit_send(2);
        assert_eq!(server.tick().await, LifecycleState::Deinit);
        assert_eq!(client.sends(), vec![2]);
        assert_eq!(server.metrics().snapshot().connection_errors, 1);
    }

    #[tokio::test]
    async fn test_report_describes_client() {
        let (mut server, _, client, _) = connected(ConsoleConfig::default());
        client.push(&[consts::IAC, consts::WILL, consts::option::TTYPE]);
        for _ in 0..5 {
            server.tick().await;
        }

        let report = server.report();
        assert_eq!(report.state, LifecycleState::Running);
        assert!(report.status.client_connected);
        assert_eq!(report.peer_addr, Some(SocketAddr::from(([192, 0, 2, 7], 49152))));
        assert_eq!(report.max_tx, 3);
        assert_eq!(report.max_rx, 1);
        assert!(report.options.contains(&(TelnetOption::TTYPE, Verb::Dont)));
        assert!(report.options.contains(&(TelnetOption::Echo, Verb::Will)));
        assert!(report.to_string().contains("24/TType=DONT"));
    }

    #[tokio::test]
    async fn test_spawn_and_stop() {
        let (server, transport, client, _) = connected(ConsoleConfig::default());
        let mut handle = server.spawn();

        let report = handle
            .wait_for(|report| report.state == LifecycleState::Running)
            .await
            .unwrap();
        assert!(report.status.client_connected);
        assert!(handle.is_running());

        handle.stop().await.unwrap();
        assert!(client.is_closed());
        assert!(!transport.is_open());
    }
}
