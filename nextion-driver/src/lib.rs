//! Nextion display protocol engine
//!
//! This crate drives a Nextion HMI display over a serial link:
//!
//! - Command encoding and transmission (setters, page changes, system commands)
//! - A non-blocking event poll that demultiplexes touch events, sleep/wake
//!   notifications and the component discovery transcript
//! - Blocking `get` queries bounded by configurable timeouts
//! - A directory of discovered components with lookup by name and by
//!   page/id, used to address components safely
//!
//! Board bring-up (UART pins, baud rate) is left to the caller, who hands the
//! driver anything implementing [`nextion_hal::SerialPort`] and
//! [`nextion_hal::Clock`].
//!
//! # Usage
//!
//! ```ignore
//! let mut display = Nextion::new(uart, timer, Config::default());
//! display.on_touch(&mut on_touch);
//! display.begin();
//!
//! loop {
//!     display.poll();
//!     display.set_number_by_name("n0", reading)?;
//! }
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod config;
pub mod directory;
pub mod driver;
pub mod error;
mod line;
pub mod query;

pub use config::Config;
pub use directory::{
    Component, ComponentHandle, ComponentName, Directory, DirectoryError, MAX_COMPONENTS,
    MAX_NAME_LEN,
};
pub use driver::{ComponentListHandler, Nextion, SystemHandler, TouchHandler};
pub use error::ErrorCode;
pub use query::{Query, TextValue, NUMBER_SENTINEL, PROBE_COMMAND, TEXT_SENTINEL};

pub use nextion_protocol::{
    ComponentKind, Command, Page, SystemEvent, Target, TouchEvent, TouchKind,
};
