//! Outbound command encoding
//!
//! Commands are the display's own instruction language:
//! - `<obj>.<attr>=<value>` assigns an attribute (text values are quoted)
//! - `get <obj>.<attr>` asks for a typed reply
//! - `page`, `click`, `vis`, `tsw`, `ref` act on pages and objects
//! - `sleep=`, `dim=`, `rest` control the panel itself
//!
//! Every command is terminated by three `0xFF` bytes. String payloads are
//! sent verbatim: an embedded `"` is not escaped and will cut the value short
//! on the display side.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::frame::TERMINATOR;

/// Maximum encoded command size including the terminator
pub const MAX_COMMAND_SIZE: usize = 256;

/// Highest backlight level accepted by `dim=`
pub const MAX_DIM: u8 = 100;

/// Well-known component attribute names
pub mod attr {
    /// Text content
    pub const TXT: &str = "txt";
    /// Numeric value
    pub const VAL: &str = "val";
    /// Visibility
    pub const VIS: &str = "vis";
    /// Background color (RGB565)
    pub const BCO: &str = "bco";
    /// Font color (RGB565)
    pub const PCO: &str = "pco";
    /// Enabled flag
    pub const ENA: &str = "ena";
}

/// Errors that can occur while encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Buffer too small for command text plus terminator
    BufferTooSmall,
}

/// Object a command acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target<'a> {
    /// Object name as defined in the HMI project (`t0`, `b1`, ...)
    Name(&'a str),
    /// Page/id address, rendered as `p[<page>].b[<id>]`
    Address { page: u8, id: u8 },
}

impl<'a> Target<'a> {
    /// Address an object by name
    pub const fn name(name: &'a str) -> Self {
        Target::Name(name)
    }

    /// Address an object by page and component id
    pub const fn address(page: u8, id: u8) -> Self {
        Target::Address { page, id }
    }
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Name(name) => f.write_str(name),
            Target::Address { page, id } => write!(f, "p[{}].b[{}]", page, id),
        }
    }
}

/// Page selector for `page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page<'a> {
    /// Page number
    Id(u8),
    /// Page name
    Name(&'a str),
}

/// Instructions sent to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Assign a string attribute
    SetText {
        target: Target<'a>,
        attr: &'a str,
        value: &'a str,
    },
    /// Assign a numeric attribute
    SetNumber {
        target: Target<'a>,
        attr: &'a str,
        value: i32,
    },
    /// Request an attribute value
    Get { target: Target<'a>, attr: &'a str },
    /// Switch the displayed page
    Page(Page<'a>),
    /// Simulate a press (`true`) or release (`false`)
    Click { target: Target<'a>, pressed: bool },
    /// Show or hide an object
    Visible { target: Target<'a>, visible: bool },
    /// Enable or disable touch on an object
    TouchEnable { target: Target<'a>, enabled: bool },
    /// Redraw an object
    Refresh { target: Target<'a> },
    /// Enter (`true`) or leave (`false`) sleep mode
    Sleep(bool),
    /// Set backlight level (0-100, clamped)
    Dim(u8),
    /// Reboot the display
    Reset,
    /// Arbitrary instruction text
    Raw(&'a str),
}

impl<'a> Command<'a> {
    /// `<target>.txt="<value>"`
    pub const fn set_text(target: Target<'a>, value: &'a str) -> Self {
        Command::SetText {
            target,
            attr: attr::TXT,
            value,
        }
    }

    /// `<target>.val=<value>`
    pub const fn set_number(target: Target<'a>, value: i32) -> Self {
        Command::SetNumber {
            target,
            attr: attr::VAL,
            value,
        }
    }

    /// `get <target>.<attr>`
    pub const fn get(target: Target<'a>, attr: &'a str) -> Self {
        Command::Get { target, attr }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written, terminator included.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CommandError> {
        let mut writer = SliceWriter { buf: buffer, pos: 0 };
        write!(writer, "{}", self).map_err(|_| CommandError::BufferTooSmall)?;
        writer
            .push(&TERMINATOR)
            .map_err(|_| CommandError::BufferTooSmall)?;
        Ok(writer.pos)
    }

    /// Encode this command into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_COMMAND_SIZE>, CommandError> {
        let mut buffer = [0u8; MAX_COMMAND_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| CommandError::BufferTooSmall)?;
        Ok(vec)
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetText {
                target,
                attr,
                value,
            } => write!(f, "{}.{}=\"{}\"", target, attr, value),
            Command::SetNumber {
                target,
                attr,
                value,
            } => write!(f, "{}.{}={}", target, attr, value),
            Command::Get { target, attr } => write!(f, "get {}.{}", target, attr),
            Command::Page(Page::Id(id)) => write!(f, "page {}", id),
            Command::Page(Page::Name(name)) => write!(f, "page {}", name),
            Command::Click { target, pressed } => {
                write!(f, "click {},{}", target, u8::from(*pressed))
            }
            Command::Visible { target, visible } => {
                write!(f, "vis {},{}", target, u8::from(*visible))
            }
            Command::TouchEnable { target, enabled } => {
                write!(f, "tsw {},{}", target, u8::from(*enabled))
            }
            Command::Refresh { target } => write!(f, "ref {}", target),
            Command::Sleep(sleep) => write!(f, "sleep={}", u8::from(*sleep)),
            Command::Dim(level) => write!(f, "dim={}", (*level).min(MAX_DIM)),
            Command::Reset => f.write_str("rest"),
            Command::Raw(text) => f.write_str(text),
        }
    }
}

/// `fmt::Write` over a fixed byte slice
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl SliceWriter<'_> {
    fn push(&mut self, bytes: &[u8]) -> fmt::Result {
        let end = self.pos + bytes.len();
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s.as_bytes())
    }
}
