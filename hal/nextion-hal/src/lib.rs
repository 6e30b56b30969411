//! Nextion Hardware Abstraction Layer
//!
//! This crate defines the two collaborators the display driver needs from the
//! board: a duplex byte stream connected to the display and a millisecond
//! clock. Board crates implement these on top of their UART peripheral and
//! timer; the driver never touches pins, baud rates or interrupts itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / host loop                │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nextion-driver (poll, query, directory)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nextion-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  board UART   │       │  MockSerial   │
//! │  + timer      │       │  + MockClock  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialPort`] - Buffered duplex byte stream
//! - [`clock::Clock`] - Monotonic millisecond clock

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod clock;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod serial;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockClock, MockSerial};
pub use serial::SerialPort;
