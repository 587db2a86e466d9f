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

//! Console server configuration

use crate::auth::MAX_LINE_LENGTH;
use consolenet_telnetcodec::WindowSize;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default Telnet port
pub const DEFAULT_PORT: u16 = 23;

/// Console server configuration
///
/// Use the builder pattern methods to customize the configuration.
///
/// # Example
///
/// ```
/// use consolenet_server::ConsoleConfig;
/// use std::time::Duration;
///
/// let config = ConsoleConfig::default()
///     .with_authentication(true)
///     .with_credentials("operator", "s3cret")
///     .with_read_timeout(Duration::from_millis(50));
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Address the listener binds to
    pub bind_address: SocketAddr,

    /// How long a single accept attempt waits for a client
    pub accept_wait: Duration,

    /// Receive timeout while options are being negotiated
    ///
    /// A quiet period of this length ends the negotiation phase.
    pub negotiation_timeout: Duration,

    /// Receive timeout once the console is running
    ///
    /// Pending console output is flushed every time a read times out.
    pub read_timeout: Duration,

    /// Timeout for a single write to the client
    pub write_timeout: Duration,

    /// Delay before retrying after the listener failed to open
    pub retry_delay: Duration,

    /// Terminal size assumed until the client reports one
    pub terminal_size: WindowSize,

    /// Require a login before the console is reachable
    pub authenticate: bool,

    /// Expected login identity
    pub identity: String,

    /// Expected login secret
    pub secret: String,

    /// Echo the secret while it is typed
    pub echo_secret: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            accept_wait: Duration::from_millis(100),
            negotiation_timeout: Duration::from_millis(100),
            read_timeout: Duration::from_millis(70),
            write_timeout: Duration::from_secs(5),
            retry_delay: Duration::from_millis(100),
            terminal_size: WindowSize::default(),
            authenticate: false,
            identity: "TestUser".to_string(),
            secret: "TestPass".to_string(),
            echo_secret: false,
        }
    }
}

impl ConsoleConfig {
    /// Create a new configuration with the given bind address
    ///
    /// All other settings will use their default values.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the accept wait duration
    pub fn with_accept_wait(mut self, wait: Duration) -> Self {
        self.accept_wait = wait;
        self
    }

    /// Set the negotiation phase receive timeout
    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    /// Set the steady-state receive timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout duration
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the listener retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the default terminal size
    pub fn with_terminal_size(mut self, cols: u16, rows: u16) -> Self {
        self.terminal_size = WindowSize::new(cols, rows);
        self
    }

    /// Enable or disable the login prompt
    pub fn with_authentication(mut self, enabled: bool) -> Self {
        self.authenticate = enabled;
        self
    }

    /// Set the expected login identity and secret
    pub fn with_credentials(mut self, identity: impl Into<String>, secret: impl Into<String>) -> Self {
        self.identity = identity.into();
        self.secret = secret.into();
        self
    }

    /// Echo or hide the secret while it is typed
    pub fn with_echo_secret(mut self, echo: bool) -> Self {
        self.echo_secret = echo;
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.accept_wait.is_zero() {
            return Err("accept_wait must be greater than 0".to_string());
        }

        if self.negotiation_timeout.is_zero() {
            return Err("negotiation_timeout must be greater than 0".to_string());
        }

        if self.read_timeout.is_zero() {
            return Err("read_timeout must be greater than 0".to_string());
        }

        if self.write_timeout.is_zero() {
            return Err("write_timeout must be greater than 0".to_string());
        }

        if self.retry_delay.is_zero() {
            return Err("retry_delay must be greater than 0".to_string());
        }

        if self.terminal_size.cols == 0 || self.terminal_size.rows == 0 {
            return Err("terminal_size dimensions must be greater than 0".to_string());
        }

        for (name, value) in [("identity", &self.identity), ("secret", &self.secret)] {
            if value.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
            if value.len() > MAX_LINE_LENGTH {
                return Err(format!(
                    "{} must be at most {} characters",
                    name, MAX_LINE_LENGTH
                ));
            }
            if !value.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
                return Err(format!("{} must be printable ASCII", name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.bind_address.port(), 23);
        assert_eq!(config.negotiation_timeout, Duration::from_millis(100));
        assert_eq!(config.read_timeout, Duration::from_millis(70));
        assert_eq!(config.terminal_size, WindowSize::new(80, 24));
        assert!(!config.authenticate);
        assert!(!config.echo_secret);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ConsoleConfig::new("127.0.0.1:2323".parse().unwrap())
            .with_authentication(true)
            .with_credentials("admin", "hunter2")
            .with_terminal_size(132, 43)
            .with_read_timeout(Duration::from_millis(20));

        assert_eq!(config.bind_address.port(), 2323);
        assert!(config.authenticate);
        assert_eq!(config.identity, "admin");
        assert_eq!(config.secret, "hunter2");
        assert_eq!(config.terminal_size, WindowSize::new(132, 43));
        assert_eq!(config.read_timeout, Duration::from_millis(20));
    }

    #[test]
    fn test_validation() {
        let mut config = ConsoleConfig::default();

        // Invalid: zero timeout
        config.read_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        // Invalid: secret longer than a login line
        config.read_timeout = Duration::from_millis(70);
        config.secret = "x".repeat(MAX_LINE_LENGTH + 1);
        assert!(config.validate().is_err());

        // Invalid: empty identity
        config.secret = "TestPass".to_string();
        config.identity = String::new();
        assert!(config.validate().is_err());

        // Invalid: zero rows
        config.identity = "TestUser".to_string();
        config.terminal_size = WindowSize::new(80, 0);
        assert!(config.validate().is_err());
    }
}
