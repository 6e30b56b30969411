//! Nextion Serial Display Protocol
//!
//! This crate describes the bytes exchanged between a microcontroller and a
//! Nextion HMI display. It is pure data: no I/O, no timing. The driver crate
//! owns the serial port and decides when to read and write.
//!
//! # Protocol Overview
//!
//! Outbound, every instruction is ASCII text followed by a fixed terminator:
//! ```text
//! ┌──────────────────────────────┬────────────────┐
//! │ COMMAND (ASCII)              │ 0xFF 0xFF 0xFF │
//! └──────────────────────────────┴────────────────┘
//! ```
//!
//! Inbound, the display sends binary frames identified by their first byte:
//! ```text
//! 0x65 page id event FF FF FF      touch event
//! 0x70 text... FF FF FF            string reply to `get`
//! 0x71 b0 b1 b2 b3 FF FF FF        numeric reply (i32, little-endian)
//! 0x86 / 0x87                      entered sleep / woke up
//! ```
//!
//! Component discovery is a separate, line-oriented text transcript sent by
//! the display's own firmware on the same stream (see [`discovery`]).
//!
//! There is no checksum, sequence number or flow control.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod discovery;
pub mod events;
pub mod frame;

pub use command::{attr, Command, CommandError, Page, Target, MAX_COMMAND_SIZE};
pub use discovery::{ComponentKind, ComponentRow, DiscoveryLine, RowError};
pub use events::{SystemEvent, TouchEvent, TouchKind};
pub use frame::{FrameError, FrameKind, TERMINATOR};
