//! Asynchronous events reported by the display

use crate::frame::{TAG_SLEEP, TAG_TOUCH, TAG_WAKE, TERMINATOR, TOUCH_FRAME_LEN};

/// Touch event type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchKind {
    /// Finger lifted
    Release,
    /// Finger down
    Press,
    /// Value outside the documented range, passed through untouched
    Other(u8),
}

// Wire format values
const EVENT_RELEASE: u8 = 0x00;
const EVENT_PRESS: u8 = 0x01;

impl From<u8> for TouchKind {
    fn from(byte: u8) -> Self {
        match byte {
            EVENT_RELEASE => TouchKind::Release,
            EVENT_PRESS => TouchKind::Press,
            other => TouchKind::Other(other),
        }
    }
}

impl TouchKind {
    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            TouchKind::Release => EVENT_RELEASE,
            TouchKind::Press => EVENT_PRESS,
            TouchKind::Other(byte) => byte,
        }
    }
}

/// A touch on a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchEvent {
    /// Page the component lives on
    pub page_id: u8,
    /// Component id within the page
    pub component_id: u8,
    /// Press or release
    pub kind: TouchKind,
}

impl TouchEvent {
    /// Create a touch event
    pub const fn new(page_id: u8, component_id: u8, kind: TouchKind) -> Self {
        Self {
            page_id,
            component_id,
            kind,
        }
    }

    /// Returns true for a press
    pub fn is_press(&self) -> bool {
        self.kind == TouchKind::Press
    }

    /// Encode as a complete frame (for testing or simulation)
    pub fn to_frame(&self) -> [u8; TOUCH_FRAME_LEN] {
        let mut frame = [0u8; TOUCH_FRAME_LEN];
        frame[0] = TAG_TOUCH;
        frame[1] = self.page_id;
        frame[2] = self.component_id;
        frame[3] = self.kind.to_byte();
        frame[4..].copy_from_slice(&TERMINATOR);
        frame
    }
}

/// Panel power notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemEvent {
    /// Display entered sleep mode
    Sleep,
    /// Display woke from sleep
    Wake,
}

impl SystemEvent {
    /// Parse an event from its frame tag
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TAG_SLEEP => Some(SystemEvent::Sleep),
            TAG_WAKE => Some(SystemEvent::Wake),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            SystemEvent::Sleep => TAG_SLEEP,
            SystemEvent::Wake => TAG_WAKE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::decode_touch;

    #[test]
    fn test_touch_kind_from_byte() {
        assert_eq!(TouchKind::from(0), TouchKind::Release);
        assert_eq!(TouchKind::from(1), TouchKind::Press);
        assert_eq!(TouchKind::from(7), TouchKind::Other(7));
        assert_eq!(TouchKind::Other(7).to_byte(), 7);
    }

    #[test]
    fn test_touch_frame() {
        let event = TouchEvent::new(1, 4, TouchKind::Release);
        let frame = event.to_frame();
        assert_eq!(frame, [0x65, 1, 4, 0, 0xFF, 0xFF, 0xFF]);
        assert_eq!(decode_touch(&frame), Ok(event));
        assert!(!event.is_press());
    }

    #[test]
    fn test_system_event_bytes() {
        assert_eq!(SystemEvent::from_byte(0x86), Some(SystemEvent::Sleep));
        assert_eq!(SystemEvent::from_byte(0x87), Some(SystemEvent::Wake));
        assert_eq!(SystemEvent::from_byte(0x65), None);
        assert_eq!(SystemEvent::Wake.to_byte(), 0x87);
    }
}
