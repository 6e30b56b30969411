//! In-memory serial port and clock
//!
//! `MockSerial` plays the display side of the link: bytes pushed with
//! [`MockSerial::feed`] are immediately readable, and replies queued with
//! [`MockSerial::queue_reply`] are released one per written command, which is
//! how the real display answers `get` requests. `MockClock` advances by a
//! fixed step every time it is read so timeout loops always terminate.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::{Clock, SerialPort};

/// Receive buffer capacity
pub const MOCK_RX_CAPACITY: usize = 1024;

/// Transmit capture capacity
pub const MOCK_TX_CAPACITY: usize = 2048;

/// Maximum size of a single scripted reply
pub const MOCK_REPLY_CAPACITY: usize = 320;

/// Maximum number of scripted replies waiting at once
pub const MOCK_MAX_REPLIES: usize = 8;

/// Error returned by a mock write when failures are injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MockError {
    /// Write failure requested by the test
    Injected,
    /// Transmit capture buffer is full
    TxFull,
}

/// Scripted serial port
#[derive(Default)]
pub struct MockSerial {
    rx: Deque<u8, MOCK_RX_CAPACITY>,
    tx: Vec<u8, MOCK_TX_CAPACITY>,
    replies: Deque<Vec<u8, MOCK_REPLY_CAPACITY>, MOCK_MAX_REPLIES>,
    fail_writes: bool,
}

impl MockSerial {
    /// Create an empty port
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available to the reader right away
    ///
    /// Bytes that do not fit in the receive buffer are dropped, like an
    /// overrun on real hardware.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.rx.push_back(byte).is_err() {
                break;
            }
        }
    }

    /// Queue a reply released by the next written command
    ///
    /// An empty slice means the next command gets no answer.
    pub fn queue_reply(&mut self, bytes: &[u8]) {
        let mut reply = Vec::new();
        let _ = reply.extend_from_slice(&bytes[..bytes.len().min(MOCK_REPLY_CAPACITY)]);
        let _ = self.replies.push_back(reply);
    }

    /// Queue "no answer" for the next written command
    pub fn queue_silence(&mut self) {
        self.queue_reply(&[]);
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Everything written so far
    pub fn sent(&self) -> &[u8] {
        &self.tx
    }

    /// Written commands with their terminators stripped
    pub fn commands(&self) -> impl Iterator<Item = &[u8]> {
        self.tx.split(|&b| b == 0xFF).filter(|cmd| !cmd.is_empty())
    }

    /// Forget captured output
    pub fn clear_sent(&mut self) {
        self.tx.clear();
    }

    /// Number of unread bytes
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl SerialPort for MockSerial {
    type Error = MockError;

    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.rx.front().copied()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError::Injected);
        }
        self.tx
            .extend_from_slice(data)
            .map_err(|_| MockError::TxFull)?;

        if let Some(reply) = self.replies.pop_front() {
            self.feed(&reply);
        }
        Ok(())
    }
}

/// Self-advancing clock
#[derive(Debug)]
pub struct MockClock {
    now: Cell<u64>,
    step: u64,
}

impl MockClock {
    /// Clock that advances `step_ms` on every reading
    pub fn new(step_ms: u64) -> Self {
        Self {
            now: Cell::new(0),
            step: step_ms,
        }
    }

    /// Move time forward without reading it
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    /// Current time without advancing
    pub fn peek(&self) -> u64 {
        self.now.get()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}
