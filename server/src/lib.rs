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

//! Telnet Console Server
//!
//! Serves a single device console over Telnet. One client at a time is accepted, its
//! options are negotiated, an optional login is checked, and then its keystrokes are fed to
//! a [`CommandInterpreter`] while everything written to the [`OutputBuffer`] is sent back.
//!
//! # Architecture
//!
//! ```text
//! ConsoleServer (lifecycle: deinit → init → waiting → options → authenticate → running)
//!     ↓
//! ConnectionRecord → TelnetParser (consolenet-telnetcodec)
//!     ↓
//! Transport / ClientStream (TcpTransport)
//! ```
//!
//! The server never blocks for longer than its configured timeouts. Every call to
//! [`ConsoleServer::tick`] advances the lifecycle and returns, so it can be driven by hand or
//! by the task started with [`ConsoleServer::spawn`].
//!
//! # Example
//!
//! ```no_run
//! use consolenet_server::{ConsoleBuffer, ConsoleConfig, ConsoleServer, OutputBuffer, TcpTransport};
//! use consolenet_telnetcodec::WindowSize;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConsoleConfig::new("0.0.0.0:2323".parse()?).with_authentication(true);
//!     let transport = TcpTransport::from_config(&config);
//!     let echo = |byte: u8, _: WindowSize, output: &mut dyn OutputBuffer| output.write(&[byte]);
//!     let handle = ConsoleServer::new(config, transport, echo, ConsoleBuffer::default())?.spawn();
//!     tokio::signal::ctrl_c().await?;
//!     handle.stop().await?;
//!     Ok(())
//! }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod auth;
mod config;
mod connection;
mod console;
mod error;
mod metrics;
#[cfg(test)]
mod mock;
mod server;
mod tcp;
mod transport;
mod types;

pub use self::auth::{AuthStatus, Authenticator, LineEdit, LineEditor, MAX_LINE_LENGTH};
pub use self::config::{ConsoleConfig, DEFAULT_PORT};
pub use self::connection::{ConnectionRecord, Inbound};
pub use self::console::{CommandInterpreter, ConsoleBuffer, DEFAULT_CONSOLE_CAPACITY, OutputBuffer};
pub use self::error::{ConsoleError, ConsoleResult, TransportError, TransportResult};
pub use self::metrics::{ConsoleMetrics, MetricsSnapshot};
pub use self::server::{ConsoleHandle, ConsoleServer};
pub use self::tcp::{TcpClient, TcpTransport};
pub use self::transport::{ClientStream, Transport};
pub use self::types::{LifecycleState, ServerReport, ServerStatus};
