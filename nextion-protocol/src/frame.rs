//! Inbound frame grammar
//!
//! Frames from the display carry no length field: the leading type byte
//! decides how many bytes follow.
//! - TOUCH (0x65): page, component, event, terminator (7 bytes total)
//! - STRING (0x70): text of any length, terminator
//! - NUMBER (0x71): 4-byte little-endian i32, terminator (8 bytes total)
//! - SLEEP (0x86) / WAKE (0x87): no payload, optional terminator

use heapless::Vec;

use crate::events::{SystemEvent, TouchEvent};

/// Terminator ending every outbound command and most inbound frames
pub const TERMINATOR: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Touch event frame tag
pub const TAG_TOUCH: u8 = 0x65;
/// String reply frame tag
pub const TAG_STRING: u8 = 0x70;
/// Numeric reply frame tag
pub const TAG_NUMBER: u8 = 0x71;
/// Display entered sleep
pub const TAG_SLEEP: u8 = 0x86;
/// Display woke up
pub const TAG_WAKE: u8 = 0x87;

/// Complete touch frame size (tag + page + id + event + terminator)
pub const TOUCH_FRAME_LEN: usize = 7;

/// Complete numeric reply size (tag + 4 value bytes + terminator)
pub const NUMBER_FRAME_LEN: usize = 8;

/// Maximum text payload accepted in a string reply
pub const MAX_TEXT_LEN: usize = 256;

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Leading byte is not a known frame tag
    UnknownTag(u8),
    /// Frame did not end with `FF FF FF`
    BadTerminator,
    /// Text payload exceeds `MAX_TEXT_LEN`
    TextTooLong,
}

/// Frame categories recognised by their leading byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Touch press/release
    Touch,
    /// Reply to `get` for a string attribute
    StringReply,
    /// Reply to `get` for a numeric attribute
    NumberReply,
    /// Sleep/wake notification
    System(SystemEvent),
}

impl FrameKind {
    /// Classify a leading byte
    pub fn from_tag(tag: u8) -> Result<Self, FrameError> {
        match tag {
            TAG_TOUCH => Ok(FrameKind::Touch),
            TAG_STRING => Ok(FrameKind::StringReply),
            TAG_NUMBER => Ok(FrameKind::NumberReply),
            TAG_SLEEP => Ok(FrameKind::System(SystemEvent::Sleep)),
            TAG_WAKE => Ok(FrameKind::System(SystemEvent::Wake)),
            other => Err(FrameError::UnknownTag(other)),
        }
    }

    /// Smallest number of bytes a complete frame of this kind occupies
    pub fn min_len(self) -> usize {
        match self {
            FrameKind::Touch => TOUCH_FRAME_LEN,
            FrameKind::StringReply => 1 + TERMINATOR.len(),
            FrameKind::NumberReply => NUMBER_FRAME_LEN,
            FrameKind::System(_) => 1,
        }
    }
}

/// Decode the value bytes of a numeric reply
pub fn decode_number(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// Decode a complete touch frame
pub fn decode_touch(frame: &[u8; TOUCH_FRAME_LEN]) -> Result<TouchEvent, FrameError> {
    if frame[0] != TAG_TOUCH {
        return Err(FrameError::UnknownTag(frame[0]));
    }
    if frame[4..] != TERMINATOR {
        return Err(FrameError::BadTerminator);
    }
    Ok(TouchEvent::new(frame[1], frame[2], frame[3].into()))
}

/// Build a numeric reply frame (for testing or simulation)
pub fn encode_number_reply(value: i32) -> [u8; NUMBER_FRAME_LEN] {
    let mut frame = [0xFF; NUMBER_FRAME_LEN];
    frame[0] = TAG_NUMBER;
    frame[1..5].copy_from_slice(&value.to_le_bytes());
    frame
}

/// Build a string reply frame (for testing or simulation)
pub fn encode_text_reply(text: &str) -> Result<Vec<u8, { MAX_TEXT_LEN + 4 }>, FrameError> {
    if text.len() > MAX_TEXT_LEN {
        return Err(FrameError::TextTooLong);
    }
    let mut frame = Vec::new();
    frame.push(TAG_STRING).map_err(|_| FrameError::TextTooLong)?;
    frame
        .extend_from_slice(text.as_bytes())
        .map_err(|_| FrameError::TextTooLong)?;
    frame
        .extend_from_slice(&TERMINATOR)
        .map_err(|_| FrameError::TextTooLong)?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TouchKind;
    use proptest::prelude::*;

    #[test]
    fn test_classify_tags() {
        assert_eq!(FrameKind::from_tag(0x65), Ok(FrameKind::Touch));
        assert_eq!(FrameKind::from_tag(0x70), Ok(FrameKind::StringReply));
        assert_eq!(FrameKind::from_tag(0x71), Ok(FrameKind::NumberReply));
        assert_eq!(
            FrameKind::from_tag(0x86),
            Ok(FrameKind::System(SystemEvent::Sleep))
        );
        assert_eq!(
            FrameKind::from_tag(0x87),
            Ok(FrameKind::System(SystemEvent::Wake))
        );
        assert_eq!(FrameKind::from_tag(0x99), Err(FrameError::UnknownTag(0x99)));
    }

    #[test]
    fn test_min_len() {
        assert_eq!(FrameKind::Touch.min_len(), 7);
        assert_eq!(FrameKind::NumberReply.min_len(), 8);
        assert_eq!(FrameKind::StringReply.min_len(), 4);
        assert_eq!(FrameKind::System(SystemEvent::Wake).min_len(), 1);
    }

    #[test]
    fn test_decode_touch() {
        let frame = [0x65, 0x00, 0x03, 0x01, 0xFF, 0xFF, 0xFF];
        let event = decode_touch(&frame).unwrap();
        assert_eq!(event.page_id, 0);
        assert_eq!(event.component_id, 3);
        assert_eq!(event.kind, TouchKind::Press);
    }

    #[test]
    fn test_decode_touch_bad_terminator() {
        let frame = [0x65, 0x00, 0x03, 0x01, 0xFF, 0x00, 0xFF];
        assert_eq!(decode_touch(&frame), Err(FrameError::BadTerminator));
    }

    #[test]
    fn test_decode_number_little_endian() {
        assert_eq!(decode_number([0x2A, 0x00, 0x00, 0x00]), 42);
        assert_eq!(decode_number([0xFF, 0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(decode_number([0x00, 0x01, 0x00, 0x00]), 256);
    }

    #[test]
    fn test_encode_text_reply() {
        let frame = encode_text_reply("Hi").unwrap();
        assert_eq!(&frame[..], &[0x70, b'H', b'i', 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_text_reply_too_long() {
        let long = "a".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(encode_text_reply(&long), Err(FrameError::TextTooLong));
    }

    proptest! {
        #[test]
        fn prop_number_reply_decodes(value in any::<i32>()) {
            let frame = encode_number_reply(value);
            prop_assert_eq!(frame[0], TAG_NUMBER);
            prop_assert_eq!(&frame[5..], &TERMINATOR[..]);
            prop_assert_eq!(decode_number([frame[1], frame[2], frame[3], frame[4]]), value);
        }
    }
}
