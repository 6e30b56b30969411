//! Discovery line assembly
//!
//! Transcript lines arrive interleaved with binary frames and may be split
//! across several polls, so bytes are collected here until `\n`.
//!
//! A line opened by `c` can only be a sentinel. It stays open while its
//! bytes spell a prefix of `component list begin` or `component list end`;
//! the first byte that does not fit is left in the port for frame
//! classification. Rows are only opened inside a transcript and take every
//! byte up to the newline.

use heapless::Vec;
use nextion_protocol::discovery::{LIST_BEGIN, LIST_END};

/// Longest transcript line accepted
pub const MAX_LINE_LEN: usize = 96;

/// Outcome of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEvent {
    /// Line still open
    Pending,
    /// Newline seen; the line is ready in [`LineAssembler::line`]
    Complete,
    /// Line exceeded `MAX_LINE_LEN`; the rest is skipped up to the newline
    Overflow,
    /// Newline ending a line that had overflowed
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Collecting,
    Skipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Sentinel,
    Row,
}

/// Incremental line buffer
pub(crate) struct LineAssembler {
    buf: Vec<u8, MAX_LINE_LEN>,
    state: State,
    shape: Shape,
}

impl LineAssembler {
    pub(crate) const fn new() -> Self {
        Self {
            buf: Vec::new(),
            state: State::Idle,
            shape: Shape::Row,
        }
    }

    /// Returns true once a line has started and not yet ended
    pub(crate) fn is_open(&self) -> bool {
        self.state != State::Idle
    }

    /// Returns true if `byte` can open a transcript line
    ///
    /// Sentinels start with `c`; rows start with the page number and are
    /// only expected while a transcript is being collected.
    pub(crate) fn starts_line(byte: u8, collecting: bool) -> bool {
        byte == b'c' || (collecting && byte.is_ascii_digit())
    }

    /// Returns true if `byte` can continue the open line
    pub(crate) fn accepts(&self, byte: u8) -> bool {
        if self.state != State::Collecting || self.shape == Shape::Row {
            return true;
        }
        let len = self.buf.len();
        [LIST_BEGIN, LIST_END].iter().any(|sentinel| {
            let sentinel = sentinel.as_bytes();
            match sentinel.get(len) {
                Some(&expected) => self.buf[..] == sentinel[..len] && byte == expected,
                None => {
                    self.buf.starts_with(sentinel) && matches!(byte, b'\r' | b' ' | b'\n')
                }
            }
        })
    }

    pub(crate) fn push(&mut self, byte: u8) -> LineEvent {
        if self.state == State::Idle {
            self.buf.clear();
            self.shape = if byte == b'c' { Shape::Sentinel } else { Shape::Row };
        }
        match (self.state, byte) {
            (State::Skipping, b'\n') => {
                self.reset();
                LineEvent::Discarded
            }
            (State::Skipping, _) => LineEvent::Pending,
            (_, b'\n') => {
                self.state = State::Idle;
                LineEvent::Complete
            }
            _ => {
                self.state = State::Collecting;
                if self.buf.push(byte).is_err() {
                    self.buf.clear();
                    self.state = State::Skipping;
                    return LineEvent::Overflow;
                }
                LineEvent::Pending
            }
        }
    }

    /// The completed line, if it is valid UTF-8
    pub(crate) fn line(&self) -> Option<&str> {
        core::str::from_utf8(&self.buf).ok()
    }

    pub(crate) fn reset(&mut self) {
        self.buf.clear();
        self.state = State::Idle;
    }
}
