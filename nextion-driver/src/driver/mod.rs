//! The display driver
//!
//! [`Nextion`] owns the serial port, the clock, the component directory and
//! the last-error cell. Its operations fall in three groups:
//! - fire-and-forget commands (this module)
//! - the non-blocking event poll ([`Nextion::poll`], in `poll`)
//! - directory-aware "smart" accessors (in `smart`)
//!
//! Every public operation leaves its outcome in the error cell, readable
//! through [`Nextion::last_error`]. Fallible operations also return it.

mod poll;
mod smart;

use nextion_hal::{Clock, SerialPort};
use nextion_protocol::{attr, Command, Page, SystemEvent, Target, TouchEvent};

use crate::config::Config;
use crate::directory::{Directory, Ingester};
use crate::error::ErrorCode;
use crate::line::LineAssembler;
use crate::query::{self, Query, TextValue, NUMBER_SENTINEL, PROBE_COMMAND};

/// Touch handler slot
pub type TouchHandler<'h> = &'h mut dyn FnMut(TouchEvent);

/// Sleep/wake handler slot
pub type SystemHandler<'h> = &'h mut dyn FnMut(SystemEvent);

/// Discovery completion handler slot (`true` when the list loaded)
pub type ComponentListHandler<'h> = &'h mut dyn FnMut(bool);

/// Nextion display driver
///
/// Handlers are borrowed for `'h`; registering a new one replaces the
/// previous one.
pub struct Nextion<'h, S, C> {
    port: S,
    clock: C,
    config: Config,
    last_error: ErrorCode,
    directory: Directory,
    loaded: bool,
    ingester: Ingester,
    line: LineAssembler,
    /// Terminator bytes seen so far while skipping an unsolicited text reply
    draining: Option<usize>,
    on_touch: Option<TouchHandler<'h>>,
    on_system: Option<SystemHandler<'h>>,
    on_component_list: Option<ComponentListHandler<'h>>,
}

impl<'h, S: SerialPort, C: Clock> Nextion<'h, S, C> {
    /// Create a driver over an initialized port
    pub fn new(port: S, clock: C, config: Config) -> Self {
        Self {
            port,
            clock,
            config,
            last_error: ErrorCode::Success,
            directory: Directory::new(),
            loaded: false,
            ingester: Ingester::new(),
            line: LineAssembler::new(),
            draining: None,
            on_touch: None,
            on_system: None,
            on_component_list: None,
        }
    }

    /// Drop stale input and ask for the component list
    ///
    /// The display must have finished booting; the caller owns that delay.
    pub fn begin(&mut self) -> Result<(), ErrorCode> {
        let stale = self.port.discard_input();
        self.line.reset();
        self.draining = None;
        info!("display driver started, dropped {} stale bytes", stale);
        self.request_component_list()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enable or disable transcript logging
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
        self.last_error = ErrorCode::Success;
    }

    /// Change the query reply timeout
    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.config.timeout_ms = timeout_ms;
        self.last_error = ErrorCode::Success;
    }

    /// Underlying port
    pub fn port(&self) -> &S {
        &self.port
    }

    /// Underlying port, mutably
    ///
    /// Bytes read through this bypass the event poll.
    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }

    /// Give back the port and the clock
    pub fn release(self) -> (S, C) {
        (self.port, self.clock)
    }

    // ---- Error cell ----

    /// Outcome of the most recent operation
    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Reset the error cell to `Success`
    pub fn clear_error(&mut self) {
        self.last_error = ErrorCode::Success;
    }

    fn record<T>(&mut self, result: Result<T, ErrorCode>) -> Result<T, ErrorCode> {
        self.last_error = match &result {
            Ok(_) => ErrorCode::Success,
            Err(e) => *e,
        };
        result
    }

    // ---- Handlers ----

    /// Register the touch handler
    pub fn on_touch(&mut self, handler: TouchHandler<'h>) {
        self.on_touch = Some(handler);
    }

    /// Register the sleep/wake handler
    pub fn on_system_event(&mut self, handler: SystemHandler<'h>) {
        self.on_system = Some(handler);
    }

    /// Register the discovery completion handler
    pub fn on_component_list(&mut self, handler: ComponentListHandler<'h>) {
        self.on_component_list = Some(handler);
    }

    // ---- Commands ----

    /// Send one command
    pub fn send(&mut self, command: &Command<'_>) -> Result<(), ErrorCode> {
        let result = query::transmit(&mut self.port, command);
        match result {
            Ok(()) if self.config.debug => debug!("TX: {:?}", command),
            Ok(()) => {}
            Err(e) => warn!("TX failed: {:?}", e),
        }
        self.record(result)
    }

    /// Send arbitrary instruction text
    pub fn send_raw(&mut self, text: &str) -> Result<(), ErrorCode> {
        self.send(&Command::Raw(text))
    }

    /// Set a component's `txt`
    pub fn set_text(&mut self, target: Target<'_>, value: &str) -> Result<(), ErrorCode> {
        self.send(&Command::set_text(target, value))
    }

    /// Set a component's `val`
    pub fn set_number(&mut self, target: Target<'_>, value: i32) -> Result<(), ErrorCode> {
        self.send(&Command::set_number(target, value))
    }

    /// Assign any numeric attribute
    pub fn set_attribute(&mut self, target: Target<'_>, attr: &str, value: i32) -> Result<(), ErrorCode> {
        self.send(&Command::SetNumber {
            target,
            attr,
            value,
        })
    }

    /// Show or hide a component
    pub fn set_visible(&mut self, target: Target<'_>, visible: bool) -> Result<(), ErrorCode> {
        self.send(&Command::Visible { target, visible })
    }

    /// Enable or disable touch on a component
    pub fn set_touch_enabled(&mut self, target: Target<'_>, enabled: bool) -> Result<(), ErrorCode> {
        self.send(&Command::TouchEnable { target, enabled })
    }

    /// Set a component's `ena` flag
    pub fn set_enabled(&mut self, target: Target<'_>, enabled: bool) -> Result<(), ErrorCode> {
        self.set_attribute(target, attr::ENA, i32::from(enabled))
    }

    /// Set background color (RGB565)
    pub fn set_background_color(&mut self, target: Target<'_>, color: u16) -> Result<(), ErrorCode> {
        self.set_attribute(target, attr::BCO, i32::from(color))
    }

    /// Set font color (RGB565)
    pub fn set_font_color(&mut self, target: Target<'_>, color: u16) -> Result<(), ErrorCode> {
        self.set_attribute(target, attr::PCO, i32::from(color))
    }

    /// Simulate a press or release
    pub fn click(&mut self, target: Target<'_>, pressed: bool) -> Result<(), ErrorCode> {
        self.send(&Command::Click { target, pressed })
    }

    /// Redraw a component
    pub fn refresh(&mut self, target: Target<'_>) -> Result<(), ErrorCode> {
        self.send(&Command::Refresh { target })
    }

    /// Switch page
    pub fn page(&mut self, page: Page<'_>) -> Result<(), ErrorCode> {
        self.send(&Command::Page(page))
    }

    /// Put the display to sleep
    pub fn sleep(&mut self) -> Result<(), ErrorCode> {
        self.send(&Command::Sleep(true))
    }

    /// Wake the display
    pub fn wake(&mut self) -> Result<(), ErrorCode> {
        self.send(&Command::Sleep(false))
    }

    /// Reboot the display
    pub fn reset(&mut self) -> Result<(), ErrorCode> {
        self.send(&Command::Reset)
    }

    /// Set backlight level, 0-100
    pub fn set_brightness(&mut self, level: u8) -> Result<(), ErrorCode> {
        self.send(&Command::Dim(level))
    }

    // ---- Queries ----

    /// Queries drop buffered input, so partial poll state goes with it
    fn query(&mut self) -> Query<'_, S, C> {
        self.line.reset();
        self.draining = None;
        Query::new(&mut self.port, &self.clock, &self.config)
    }

    /// Returns true if the display answers [`PROBE_COMMAND`]
    pub fn is_connected(&mut self) -> bool {
        let result = self.query().probe();
        if self.config.debug {
            debug!("probe '{}': {:?}", PROBE_COMMAND, result);
        }
        self.record(result).is_ok()
    }

    /// Read a component's `txt`
    pub fn get_text(&mut self, target: Target<'_>) -> Result<TextValue, ErrorCode> {
        let result = self.query().get_text(target, attr::TXT);
        self.record(result)
    }

    /// Read a component's `val`
    pub fn get_number(&mut self, target: Target<'_>) -> Result<i32, ErrorCode> {
        self.get_attribute_number(target, attr::VAL)
    }

    /// Read any numeric attribute
    pub fn get_attribute_number(&mut self, target: Target<'_>, attr: &str) -> Result<i32, ErrorCode> {
        let result = self.query().get_number(target, attr);
        self.record(result)
    }

    /// Read a component's visibility
    pub fn get_visible(&mut self, target: Target<'_>) -> Result<bool, ErrorCode> {
        self.get_attribute_number(target, attr::VIS)
            .map(|vis| vis != 0)
    }

    /// [`get_text`](Self::get_text), with an empty string on failure
    pub fn get_text_or_sentinel(&mut self, target: Target<'_>) -> TextValue {
        self.get_text(target).unwrap_or_default()
    }

    /// [`get_number`](Self::get_number), with [`NUMBER_SENTINEL`] on failure
    pub fn get_number_or_sentinel(&mut self, target: Target<'_>) -> i32 {
        self.get_number(target).unwrap_or(NUMBER_SENTINEL)
    }
}
