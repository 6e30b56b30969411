//! Driver configuration
//!
//! Fixed at construction; the timeouts can be adjusted later through the
//! driver's setters.

/// Default wait for a `get` reply
pub const DEFAULT_TIMEOUT_MS: u32 = 500;

/// Default wait for any answer to the connectivity probe
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 300;

/// Default grace window for frame tails (terminators, payload bytes)
pub const DEFAULT_GRACE_MS: u32 = 100;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Log the command and discovery transcript
    pub debug: bool,
    /// Wait for a query reply's leading byte (ms)
    pub timeout_ms: u32,
    /// Wait for any reply to the connectivity probe (ms)
    pub connect_timeout_ms: u32,
    /// Wait for the remainder of a reply once its leading byte arrived (ms)
    pub grace_ms: u32,
    /// Command that asks the display to print its component list
    ///
    /// `None` when the HMI project prints the list on its own after boot.
    pub discovery_command: Option<&'static str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            grace_ms: DEFAULT_GRACE_MS,
            discovery_command: None,
        }
    }
}

impl Config {
    /// Enable or disable transcript logging
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the query reply timeout
    pub const fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the connectivity probe timeout
    pub const fn with_connect_timeout_ms(mut self, connect_timeout_ms: u32) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Set the frame tail grace window
    pub const fn with_grace_ms(mut self, grace_ms: u32) -> Self {
        self.grace_ms = grace_ms;
        self
    }

    /// Send `command` whenever a component list is requested
    pub const fn with_discovery_command(mut self, command: &'static str) -> Self {
        self.discovery_command = Some(command);
        self
    }
}
