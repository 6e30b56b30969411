//! Blocking query engine
//!
//! A query writes `get <target>.<attr>` and then owns the serial port until
//! the matching reply (or a timeout) ends it. Replies carry no request id, so
//! only one query can be outstanding: [`Query`] holds the port by exclusive
//! borrow, which keeps the event poll from running while it exists.
//!
//! Reply waits use two windows from [`Config`]:
//! - `timeout_ms` bounds the search for the reply tag and the text body
//! - `grace_ms` bounds each frame tail (numeric payload, terminator bytes)

use heapless::String;
use nextion_hal::{Clock, SerialPort};
use nextion_protocol::frame::{self, MAX_TEXT_LEN, TAG_NUMBER, TAG_STRING, TERMINATOR};
use nextion_protocol::{Command, Target};

use crate::config::Config;
use crate::error::ErrorCode;

/// Command sent to check that a display is listening
pub const PROBE_COMMAND: &str = "connect";

/// Value reported by text reads that failed
pub const TEXT_SENTINEL: &str = "";

/// Value reported by numeric reads that failed
pub const NUMBER_SENTINEL: i32 = -1;

/// Text reply storage
///
/// Each payload byte becomes one `char`, so bytes above 0x7F take two bytes
/// of UTF-8.
pub type TextValue = String<{ 2 * MAX_TEXT_LEN }>;

/// Encode `command` and write it with its terminator
pub(crate) fn transmit<S: SerialPort>(port: &mut S, command: &Command<'_>) -> Result<(), ErrorCode> {
    let bytes = command.encode_to_vec()?;
    port.write_all(&bytes).map_err(|_| ErrorCode::SerialError)
}

/// An in-flight synchronous request
pub struct Query<'q, S, C> {
    port: &'q mut S,
    clock: &'q C,
    config: &'q Config,
}

impl<'q, S: SerialPort, C: Clock> Query<'q, S, C> {
    pub(crate) fn new(port: &'q mut S, clock: &'q C, config: &'q Config) -> Self {
        Self {
            port,
            clock,
            config,
        }
    }

    /// Check that the display answers at all
    ///
    /// Stale input is dropped first, then any reply to [`PROBE_COMMAND`]
    /// within `connect_timeout_ms` counts as connected. The reply itself is
    /// discarded.
    pub fn probe(&mut self) -> Result<(), ErrorCode> {
        let stale = self.port.discard_input();
        if stale > 0 {
            trace!("probe: dropped {} stale bytes", stale);
        }

        transmit(self.port, &Command::Raw(PROBE_COMMAND))?;

        let start = self.clock.now_ms();
        loop {
            if self.port.available() > 0 {
                self.port.discard_input();
                return Ok(());
            }
            if self.clock.elapsed_since(start) >= u64::from(self.config.connect_timeout_ms) {
                return Err(ErrorCode::NotConnected);
            }
        }
    }

    /// Read a string attribute
    pub fn get_text(mut self, target: Target<'_>, attr: &str) -> Result<TextValue, ErrorCode> {
        self.request(target, attr)?;

        let start = self.clock.now_ms();
        self.await_tag(TAG_STRING, start)?;

        let mut text = TextValue::new();
        let mut len = 0usize;
        loop {
            let byte = self
                .read_within(start, self.config.timeout_ms)
                .ok_or(ErrorCode::Timeout)?;
            if byte == TERMINATOR[0] {
                break;
            }
            if len == MAX_TEXT_LEN {
                warn!("text reply exceeds {} bytes", MAX_TEXT_LEN);
                return Err(ErrorCode::BufferOverflow);
            }
            len += 1;
            text.push(char::from(byte))
                .map_err(|_| ErrorCode::BufferOverflow)?;
        }

        self.await_terminator(TERMINATOR.len() - 1)?;
        Ok(text)
    }

    /// Read a numeric attribute
    pub fn get_number(mut self, target: Target<'_>, attr: &str) -> Result<i32, ErrorCode> {
        self.request(target, attr)?;

        let start = self.clock.now_ms();
        self.await_tag(TAG_NUMBER, start)?;

        let tail = self.clock.now_ms();
        let mut value = [0u8; 4];
        for byte in value.iter_mut() {
            *byte = self
                .read_within(tail, self.config.grace_ms)
                .ok_or(ErrorCode::Timeout)?;
        }

        self.await_terminator(TERMINATOR.len())?;
        Ok(frame::decode_number(value))
    }

    fn request(&mut self, target: Target<'_>, attr: &str) -> Result<(), ErrorCode> {
        self.probe()?;
        transmit(self.port, &Command::get(target, attr))
    }

    /// Drop bytes until `tag` is read or the query timeout expires
    fn await_tag(&mut self, tag: u8, start: u64) -> Result<(), ErrorCode> {
        let mut skipped = 0usize;
        loop {
            match self.read_within(start, self.config.timeout_ms) {
                Some(byte) if byte == tag => break,
                Some(_) => skipped += 1,
                None => return Err(ErrorCode::Timeout),
            }
        }
        if skipped > 0 {
            debug!("query skipped {} bytes before reply", skipped);
        }
        Ok(())
    }

    /// Require `count` terminator bytes within the grace window
    fn await_terminator(&mut self, count: usize) -> Result<(), ErrorCode> {
        let start = self.clock.now_ms();
        for _ in 0..count {
            match self.read_within(start, self.config.grace_ms) {
                Some(byte) if byte == TERMINATOR[0] => {}
                Some(_) => return Err(ErrorCode::InvalidResponse),
                None => return Err(ErrorCode::Timeout),
            }
        }
        Ok(())
    }

    fn read_within(&mut self, start: u64, window_ms: u32) -> Option<u8> {
        loop {
            if let Some(byte) = self.port.read_byte() {
                return Some(byte);
            }
            if self.clock.elapsed_since(start) >= u64::from(window_ms) {
                return None;
            }
        }
    }
}
