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

//! Device Console Example
//!
//! Serves a small line-oriented command shell as a Telnet console:
//! - Listens on port 2323 (override with the first argument)
//! - Requires the login `TestUser` / `TestPass`
//! - Writes a heartbeat to the console log every ten seconds
//! - `Ctrl+]` (GS) disconnects the client
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example console_server -- 127.0.0.1:2323
//! telnet localhost 2323
//! ```

use consolenet_server::{
    CommandInterpreter, ConsoleBuffer, ConsoleConfig, ConsoleServer, OutputBuffer, TcpTransport,
};
use consolenet_telnetcodec::WindowSize;
use consolenet_telnetcodec::consts::{BS, CR, DEL};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const PROMPT: &[u8] = b"> ";

/// Line-buffered command shell
struct Shell {
    line: Vec<u8>,
    started: Instant,
}

impl Shell {
    fn new() -> Self {
        Self {
            line: Vec::new(),
            started: Instant::now(),
        }
    }

    fn execute(&self, command: &str, window: WindowSize, output: &mut dyn OutputBuffer) {
        let reply = match command {
            "" => String::new(),
            "help" => "commands: help, size, uptime\r\n".to_string(),
            "size" => format!("terminal {}x{}\r\n", window.cols, window.rows),
            "uptime" => format!("up {}s\r\n", self.started.elapsed().as_secs()),
            other => format!("unknown command: {}\r\n", other),
        };
        output.write(reply.as_bytes());
        output.write(PROMPT);
    }
}

impl CommandInterpreter for Shell {
    fn process(&mut self, input: u8, window: WindowSize, output: &mut dyn OutputBuffer) {
        match input {
            CR => {
                output.write(b"\r\n");
                let line = String::from_utf8_lossy(&self.line).trim().to_string();
                self.line.clear();
                self.execute(&line, window, output);
            }
            BS | DEL => {
                if self.line.pop().is_some() {
                    output.write(b"\x08 \x08");
                }
            }
            0x20..=0x7E => {
                self.line.push(input);
                output.write(&[input]);
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:2323".to_string());
    let config = ConsoleConfig::new(address.parse()?).with_authentication(true);
    config.validate()?;

    println!("Starting console on {}", config.bind_address);
    println!("Connect with: telnet {} {}", config.bind_address.ip(), config.bind_address.port());
    println!("Press Ctrl+C to stop the server\n");

    let console = ConsoleBuffer::default();
    let transport = TcpTransport::from_config(&config);
    let handle = ConsoleServer::new(config, transport, Shell::new(), console.clone())?.spawn();

    let heartbeat = tokio::spawn({
        let mut console = console.clone();
        async move {
            let mut interval = tokio::time::interval(Duration::from_secs(10));
            let mut beats = 0u64;
            loop {
                interval.tick().await;
                beats += 1;
                let line = format!("[heartbeat {}]\r\n", beats);
                OutputBuffer::write(&mut console, line.as_bytes());
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    println!("\nShutting down console...");
    heartbeat.abort();

    let snapshot = handle.metrics();
    handle.stop().await?;
    println!(
        "Console stopped after {} connection(s), {} bytes sent",
        snapshot.total_connections, snapshot.bytes_sent
    );
    Ok(())
}
