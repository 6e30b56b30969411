//! Component discovery transcript
//!
//! The HMI project prints its object table as text lines on the same serial
//! stream as the binary frames:
//!
//! ```text
//! component list begin
//! 0,1,b0,button
//! 0,2,t0,text
//! 1,5,volume,z
//! component list end
//! ```
//!
//! Rows are `page,id,name,type`. Only the first three commas split fields,
//! so the type column may itself contain commas. Every field is trimmed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Line opening a transcript
pub const LIST_BEGIN: &str = "component list begin";

/// Line closing a transcript
pub const LIST_END: &str = "component list end";

/// Normalized component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComponentKind {
    Button,
    Text,
    Number,
    Gauge,
    Progress,
    Slider,
    #[default]
    Unknown,
}

impl ComponentKind {
    /// Normalize a vendor type label
    ///
    /// The display reports either full names or single letters (`b`, `t`,
    /// `n`, `g`, `j`, `z`); letters are keyed on the first character.
    pub fn from_vendor(label: &str) -> Self {
        let label = label.trim();
        match label {
            "button" => return ComponentKind::Button,
            "text" => return ComponentKind::Text,
            "number" => return ComponentKind::Number,
            "gauge" => return ComponentKind::Gauge,
            "progress" => return ComponentKind::Progress,
            "slider" => return ComponentKind::Slider,
            _ => {}
        }
        match label.bytes().next() {
            Some(b'b') => ComponentKind::Button,
            Some(b't') => ComponentKind::Text,
            Some(b'n') => ComponentKind::Number,
            Some(b'g') => ComponentKind::Gauge,
            Some(b'j') => ComponentKind::Progress,
            Some(b'z') => ComponentKind::Slider,
            _ => ComponentKind::Unknown,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Button => "button",
            ComponentKind::Text => "text",
            ComponentKind::Number => "number",
            ComponentKind::Gauge => "gauge",
            ComponentKind::Progress => "progress",
            ComponentKind::Slider => "slider",
            ComponentKind::Unknown => "unknown",
        }
    }

    /// Returns true for components with a string `txt` attribute
    pub fn is_textual(self) -> bool {
        matches!(self, ComponentKind::Text | ComponentKind::Button)
    }

    /// Returns true for components with a numeric `val` attribute
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ComponentKind::Number | ComponentKind::Gauge | ComponentKind::Progress
        )
    }
}

/// Reasons a transcript row is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RowError {
    /// Fewer than three commas
    MissingField,
    /// Page column is not a number in 0-255
    BadPageId,
    /// Id column is not a number in 0-255
    BadComponentId,
    /// Name column is blank
    EmptyName,
}

/// One `page,id,name,type` row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ComponentRow<'a> {
    pub page_id: u8,
    pub component_id: u8,
    pub name: &'a str,
    pub kind: ComponentKind,
}

impl<'a> ComponentRow<'a> {
    /// Parse a row
    pub fn parse(line: &'a str) -> Result<Self, RowError> {
        let mut fields = line.splitn(4, ',');
        let (Some(page), Some(id), Some(name), Some(kind)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(RowError::MissingField);
        };

        let page_id = page.trim().parse().map_err(|_| RowError::BadPageId)?;
        let component_id = id.trim().parse().map_err(|_| RowError::BadComponentId)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RowError::EmptyName);
        }

        Ok(Self {
            page_id,
            component_id,
            name,
            kind: ComponentKind::from_vendor(kind),
        })
    }
}

/// A classified transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoveryLine<'a> {
    /// `component list begin`
    Begin,
    /// `component list end`
    End,
    /// A component row
    Row(ComponentRow<'a>),
}

impl<'a> DiscoveryLine<'a> {
    /// Classify one line (without its newline)
    pub fn parse(line: &'a str) -> Result<Self, RowError> {
        match line.trim() {
            LIST_BEGIN => Ok(DiscoveryLine::Begin),
            LIST_END => Ok(DiscoveryLine::End),
            row => ComponentRow::parse(row).map(DiscoveryLine::Row),
        }
    }

    /// Returns true for the begin/end markers
    pub fn is_sentinel(&self) -> bool {
        matches!(self, DiscoveryLine::Begin | DiscoveryLine::End)
    }
}
