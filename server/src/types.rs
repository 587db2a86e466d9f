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

//! Lifecycle state and status reporting types

use consolenet_telnetcodec::{TelnetOption, Verb, WindowSize, consts};
use std::fmt;
use std::net::SocketAddr;

/// Console lifecycle state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Tear down the client and listener
    #[default]
    Deinit = 0,
    /// Open the listener
    Init = 1,
    /// Waiting for a client to connect
    Waiting = 2,
    /// Negotiating options with a new client
    Options = 3,
    /// Running the login prompt
    Authenticate = 4,
    /// Relaying console traffic
    Running = 5,
}

impl LifecycleState {
    /// Convert to u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deinit => write!(f, "deinit"),
            Self::Init => write!(f, "init"),
            Self::Waiting => write!(f, "waiting"),
            Self::Options => write!(f, "options"),
            Self::Authenticate => write!(f, "authenticate"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Status flags raised by the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerStatus {
    /// The listener is open
    pub server_up: bool,
    /// A client is attached
    pub client_connected: bool,
    /// The attached client has logged in
    pub authenticated: bool,
}

impl ServerStatus {
    /// Lower every flag
    pub fn clear(&mut self) {
        *self = ServerStatus::default();
    }
}

/// Point-in-time view of the console server
#[derive(Debug, Clone, Default)]
pub struct ServerReport {
    /// Lifecycle state
    pub state: LifecycleState,
    /// Status flags
    pub status: ServerStatus,
    /// Address the listener is bound to
    pub local_addr: Option<SocketAddr>,
    /// Attached client
    pub peer_addr: Option<SocketAddr>,
    /// Largest single send
    pub max_tx: u64,
    /// Largest single receive
    pub max_rx: u64,
    /// Negotiated terminal size
    pub window: WindowSize,
    /// Negotiated option states of the attached client
    pub options: Vec<(TelnetOption, Verb)>,
}

impl fmt::Display for ServerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status.server_up {
            match self.local_addr {
                Some(addr) => write!(f, "TNET_S {}", addr)?,
                None => write!(f, "TNET_S")?,
            }
            writeln!(
                f,
                "\tFSM={} ({})  [maxTX={}  maxRX={}] [MaxX={}  MaxY={}]",
                self.state.as_u8(),
                self.state,
                self.max_tx,
                self.max_rx,
                self.window.cols,
                self.window.rows
            )?;
        }
        if self.status.client_connected {
            match self.peer_addr {
                Some(addr) => write!(f, "TNET_C {}", addr)?,
                None => write!(f, "TNET_C")?,
            }
            writeln!(f, "\tauthenticated={}", self.status.authenticated)?;
            write!(f, "TNET_O\t")?;
            for (option, state) in &self.options {
                let code = option.to_u8();
                if code < consts::option::ECHO {
                    continue;
                }
                if code == 17 || code == 33 {
                    write!(f, "\n\t")?;
                }
                write!(f, "{}/{}={} ", code, option.name(), state)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
