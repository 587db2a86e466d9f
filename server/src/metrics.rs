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

//! Lock-free transfer statistics for the console server

use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free console statistics
///
/// Shared between the console task and its [`ConsoleHandle`](crate::ConsoleHandle).
/// Every update is also forwarded to the `metrics` facade under the `consolenet.` prefix.
#[derive(Debug)]
pub struct ConsoleMetrics {
    total_connections: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    // Largest single send and receive
    max_tx: AtomicU64,
    max_rx: AtomicU64,
    auth_failures: AtomicU64,
    connection_errors: AtomicU64,
    started_at: Instant,
}

impl Default for ConsoleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            max_tx: AtomicU64::new(0),
            max_rx: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            connection_errors: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Record an accepted client
    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        counter!("consolenet.connections.total").increment(1);
    }

    /// Record a completed send of `count` bytes
    pub fn bytes_sent(&self, count: usize) {
        let count = count as u64;
        self.bytes_sent.fetch_add(count, Ordering::Relaxed);
        self.max_tx.fetch_max(count, Ordering::Relaxed);
        counter!("consolenet.bytes.sent").increment(count);
    }

    /// Record a receive of `count` bytes
    pub fn bytes_received(&self, count: usize) {
        let count = count as u64;
        self.bytes_received.fetch_add(count, Ordering::Relaxed);
        self.max_rx.fetch_max(count, Ordering::Relaxed);
        counter!("consolenet.bytes.received").increment(count);
    }

    /// Record a rejected login
    pub fn auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
        counter!("consolenet.auth.failures").increment(1);
    }

    /// Record a connection torn down by an I/O fault
    pub fn connection_error(&self) {
        self.connection_errors.fetch_add(1, Ordering::Relaxed);
        counter!("consolenet.errors.connection").increment(1);
    }

    /// Largest single send so far
    pub fn max_tx(&self) -> u64 {
        self.max_tx.load(Ordering::Relaxed)
    }

    /// Largest single receive so far
    pub fn max_rx(&self) -> u64 {
        self.max_rx.load(Ordering::Relaxed)
    }

    /// Get a point-in-time view of all statistics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            max_tx: self.max_tx.load(Ordering::Relaxed),
            max_rx: self.max_rx.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            connection_errors: self.connection_errors.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

/// A snapshot of console statistics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Clients accepted since start
    pub total_connections: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Largest single send
    pub max_tx: u64,
    /// Largest single receive
    pub max_rx: u64,
    /// Rejected logins
    pub auth_failures: u64,
    /// Connections lost to I/O faults
    pub connection_errors: u64,
    /// Time since the server was created
    pub uptime: Duration,
}
