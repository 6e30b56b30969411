//! Event poll
//!
//! The inbound stream mixes binary frames with the text lines of the
//! discovery transcript. Each step peeks at the next byte:
//! - an open row takes every byte up to `\n`; an open sentinel only the
//!   bytes that still spell one
//! - `c`, or a digit while a transcript is being collected, opens a line
//! - a known frame tag is handled once its whole frame is buffered
//! - anything else is dropped one byte at a time
//!
//! The poll never waits: a frame that is only partly received stays in
//! the port for the next call. Text replies have no fixed length, so one
//! that arrives without its terminator is skipped across polls.

use nextion_hal::{Clock, SerialPort};
use nextion_protocol::frame::{self, FrameKind, TERMINATOR, TOUCH_FRAME_LEN};
use nextion_protocol::SystemEvent;

use super::Nextion;
use crate::directory::Ingest;
use crate::error::ErrorCode;
use crate::line::{LineAssembler, LineEvent};

/// Result of one poll step
enum Step {
    /// Nothing more can be processed right now
    Idle,
    /// Bytes consumed, no complete unit yet
    Partial,
    /// One frame or line handled
    Handled,
    /// One frame or line handled with an error
    Failed(ErrorCode),
}

impl<'h, S: SerialPort, C: Clock> Nextion<'h, S, C> {
    /// Process every complete frame and line currently buffered
    ///
    /// Returns the number of frames and lines handled. The error cell holds
    /// the last error seen during this call, or `Success`.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        let mut error = None;

        loop {
            match self.step() {
                Step::Idle => break,
                Step::Partial => {}
                Step::Handled => handled += 1,
                Step::Failed(e) => {
                    handled += 1;
                    error = Some(e);
                }
            }
        }

        self.last_error = error.unwrap_or(ErrorCode::Success);
        handled
    }

    fn step(&mut self) -> Step {
        if let Some(run) = self.draining {
            return self.drain_text_reply(run);
        }

        if self.line.is_open() {
            let Some(byte) = self.port.peek_byte() else {
                return Step::Idle;
            };
            if !self.line.accepts(byte) {
                // Only the bytes that fit a sentinel were taken
                self.line.reset();
                warn!("dropped partial sentinel before {=u8:#x}", byte);
                return Step::Failed(ErrorCode::InvalidResponse);
            }
            self.port.read_byte();
            return self.line_byte(byte);
        }

        let Some(tag) = self.port.peek_byte() else {
            return Step::Idle;
        };

        if LineAssembler::starts_line(tag, self.ingester.is_active()) {
            self.port.read_byte();
            return self.line_byte(tag);
        }

        let kind = match FrameKind::from_tag(tag) {
            Ok(kind) => kind,
            Err(e) => {
                self.port.read_byte();
                warn!("dropped byte {=u8:#x}", tag);
                return Step::Failed(e.into());
            }
        };

        if self.port.available() < kind.min_len() {
            return Step::Idle;
        }

        match kind {
            FrameKind::Touch => self.touch_frame(),
            FrameKind::StringReply => {
                self.port.read_byte();
                self.drain_text_reply(0)
            }
            FrameKind::NumberReply => {
                for _ in 0..kind.min_len() {
                    self.port.read_byte();
                }
                debug!("dropped unsolicited numeric reply");
                Step::Handled
            }
            FrameKind::System(event) => {
                self.system_frame(event);
                Step::Handled
            }
        }
    }

    fn touch_frame(&mut self) -> Step {
        let mut raw = [0u8; TOUCH_FRAME_LEN];
        for byte in raw.iter_mut() {
            // Length was checked by the caller
            *byte = self.port.read_byte().unwrap_or(0);
        }

        match frame::decode_touch(&raw) {
            Ok(event) => {
                if self.config.debug {
                    debug!(
                        "touch page={} id={} kind={:?}",
                        event.page_id,
                        event.component_id,
                        event.kind
                    );
                }
                if let Some(handler) = self.on_touch.as_mut() {
                    handler(event);
                }
                Step::Handled
            }
            Err(e) => {
                warn!("touch frame rejected: {:?}", e);
                Step::Failed(e.into())
            }
        }
    }

    fn system_frame(&mut self, event: SystemEvent) {
        self.port.read_byte();
        for _ in 0..TERMINATOR.len() {
            if self.port.peek_byte() != Some(TERMINATOR[0]) {
                break;
            }
            self.port.read_byte();
        }

        if self.config.debug {
            debug!("system event {:?}", event);
        }
        if let Some(handler) = self.on_system.as_mut() {
            handler(event);
        }
    }

    /// Skip a text reply body up to its terminator
    ///
    /// `run` counts the `0xFF` bytes already seen. A reply that is not fully
    /// buffered keeps the drain open for the next poll.
    fn drain_text_reply(&mut self, mut run: usize) -> Step {
        while let Some(byte) = self.port.read_byte() {
            run = if byte == TERMINATOR[0] { run + 1 } else { 0 };
            if run == TERMINATOR.len() {
                self.draining = None;
                debug!("dropped unsolicited text reply");
                return Step::Handled;
            }
        }
        self.draining = Some(run);
        Step::Idle
    }

    fn line_byte(&mut self, byte: u8) -> Step {
        match self.line.push(byte) {
            LineEvent::Pending => Step::Partial,
            LineEvent::Overflow => {
                warn!("transcript line too long, discarded");
                Step::Failed(ErrorCode::BufferOverflow)
            }
            LineEvent::Discarded => Step::Partial,
            LineEvent::Complete => self.complete_line(),
        }
    }

    fn complete_line(&mut self) -> Step {
        let Some(line) = self.line.line() else {
            warn!("transcript line is not UTF-8");
            return Step::Failed(ErrorCode::InvalidResponse);
        };

        match self.ingester.ingest(line, &mut self.directory) {
            Ingest::Opened => {
                if self.config.debug {
                    debug!("component list begin");
                }
            }
            Ingest::Added(_) => {
                if self.config.debug {
                    debug!("component: {=str}", line.trim());
                }
            }
            Ingest::Malformed(e) => warn!("skipped row {=str}: {:?}", line.trim(), e),
            Ingest::Rejected(e) => warn!("skipped row {=str}: {:?}", line.trim(), e),
            Ingest::Stray => trace!("ignored line {=str}", line.trim()),
            Ingest::Committed { count } => {
                self.loaded = true;
                info!("component list loaded: {} components", count);
                if self.config.debug {
                    self.log_component_list();
                }
                if let Some(handler) = self.on_component_list.as_mut() {
                    handler(true);
                }
            }
            Ingest::Failed => {
                let generation = self.ingester.next_generation();
                self.directory.restart(generation);
                self.loaded = false;
                warn!("component list exceeds capacity, not loaded");
                if let Some(handler) = self.on_component_list.as_mut() {
                    handler(false);
                }
                return Step::Failed(ErrorCode::BufferOverflow);
            }
        }
        Step::Handled
    }
}
