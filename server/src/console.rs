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

//! Command interpreter and console output seams

use bytes::Bytes;
use consolenet_telnetcodec::WindowSize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default capacity of a [`ConsoleBuffer`], in bytes.
pub const DEFAULT_CONSOLE_CAPACITY: usize = 4096;

/// Sink for console output, drained by the server whenever the client is quiet.
pub trait OutputBuffer: Send + 'static {
    /// Appends output.
    fn write(&mut self, data: &[u8]);

    /// Removes and returns everything written so far.
    fn drain(&mut self) -> Bytes;

    /// Number of bytes waiting to be drained.
    fn pending(&self) -> usize;
}

/// Consumes console input one byte at a time.
///
/// Any closure taking `(byte, window, output)` is an interpreter.
pub trait CommandInterpreter: Send + 'static {
    /// Handles one input byte typed on a terminal of size `window`.
    fn process(&mut self, input: u8, window: WindowSize, output: &mut dyn OutputBuffer);
}

impl<F> CommandInterpreter for F
where
    F: FnMut(u8, WindowSize, &mut dyn OutputBuffer) + Send + 'static,
{
    fn process(&mut self, input: u8, window: WindowSize, output: &mut dyn OutputBuffer) {
        self(input, window, output)
    }
}

#[derive(Debug)]
struct Ring {
    data: VecDeque<u8>,
    capacity: usize,
    overwritten: u64,
}

/// Bounded console output ring.
///
/// Clones share the same storage, so background producers can keep writing while the
/// server owns the draining side. When full, the oldest bytes are overwritten.
#[derive(Clone, Debug)]
pub struct ConsoleBuffer {
    ring: Arc<Mutex<Ring>>,
}

impl ConsoleBuffer {
    /// Creates an empty buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(Ring {
                data: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                overwritten: 0,
            })),
        }
    }

    /// Total bytes lost to overflow since creation.
    pub fn overwritten(&self) -> u64 {
        self.lock().overwritten
    }

    /// Maximum number of bytes held.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.ring
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        ConsoleBuffer::new(DEFAULT_CONSOLE_CAPACITY)
    }
}

impl OutputBuffer for ConsoleBuffer {
    fn write(&mut self, data: &[u8]) {
        let mut ring = self.lock();
        let capacity = ring.capacity;
        let data = if data.len() > capacity {
            ring.overwritten += (data.len() - capacity) as u64;
            &data[data.len() - capacity..]
        } else {
            data
        };
        let overflow = (ring.data.len() + data.len()).saturating_sub(capacity);
        if overflow > 0 {
            ring.data.drain(..overflow);
            ring.overwritten += overflow as u64;
        }
        ring.data.extend(data);
    }

    fn drain(&mut self) -> Bytes {
        let mut ring = self.lock();
        let drained: Vec<u8> = ring.data.drain(..).collect();
        Bytes::from(drained)
    }

    fn pending(&self) -> usize {
        self.lock().data.len()
    }
}

impl std::io::Write for ConsoleBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        OutputBuffer::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
