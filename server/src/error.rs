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

//! Error types for the console server

use thiserror::Error;

/// Result type for console operations
pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

/// Result type for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors reported by a [`Transport`](crate::Transport) or [`ClientStream`](crate::ClientStream).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Nothing happened before the timeout; retry later
    #[error("Operation would block")]
    WouldBlock,

    /// A pending connection was aborted before it could be accepted
    #[error("Connection aborted")]
    Aborted,

    /// The peer closed the connection
    #[error("Connection closed")]
    Closed,

    /// The listening endpoint has not been opened
    #[error("Endpoint not open")]
    NotOpen,

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

impl TransportError {
    /// Check if the error is transient
    ///
    /// Transient errors leave the endpoint usable; the operation is simply retried on a
    /// later tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::WouldBlock | TransportError::Aborted)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                TransportError::WouldBlock
            }
            std::io::ErrorKind::ConnectionAborted => TransportError::Aborted,
            std::io::ErrorKind::UnexpectedEof => TransportError::Closed,
            _ => TransportError::Io(err),
        }
    }
}

/// Console server error types
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Error from the network transport
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol error from the codec layer
    #[error("Protocol error: {0}")]
    Protocol(#[from] consolenet_telnetcodec::CodecError),

    /// The transport accepted fewer bytes than a complete frame
    #[error("Short write: {written} of {expected} bytes sent")]
    ShortWrite {
        /// Bytes the frame required
        expected: usize,
        /// Bytes actually sent
        written: usize,
    },

    /// The client failed to authenticate
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The configuration was rejected
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The console task ended abnormally
    #[error("Console task failed: {0}")]
    Task(String),
}

impl ConsoleError {
    /// Check if the error tears down the connection
    ///
    /// Everything except a transient transport error is fatal to the current connection.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConsoleError::Transport(err) if err.is_transient())
    }
}
