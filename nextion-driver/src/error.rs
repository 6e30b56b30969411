//! Error taxonomy
//!
//! The driver keeps one last-error cell. Every public operation writes it
//! before returning, and fallible operations also return the same code in
//! their `Result`.

use nextion_protocol::{CommandError, FrameError, RowError};

use crate::directory::DirectoryError;

/// Outcome of the most recent driver operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// Operation completed
    #[default]
    Success,
    /// No reply, or reply incomplete, within the allowed time
    Timeout,
    /// Bytes on the wire did not match the protocol
    InvalidResponse,
    /// A reply, command or table exceeded its fixed capacity
    BufferOverflow,
    /// Display did not answer the connectivity probe
    NotConnected,
    /// Name or page/id not present in the component directory
    ComponentNotFound,
    /// Transport rejected a write
    SerialError,
}

impl ErrorCode {
    /// Returns true for `Success`
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }

    /// Short uppercase label for log output
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::BufferOverflow => "BUFFER_OVERFLOW",
            ErrorCode::NotConnected => "NOT_CONNECTED",
            ErrorCode::ComponentNotFound => "COMPONENT_NOT_FOUND",
            ErrorCode::SerialError => "SERIAL_ERROR",
        }
    }
}

impl From<CommandError> for ErrorCode {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::BufferTooSmall => ErrorCode::BufferOverflow,
        }
    }
}

impl From<FrameError> for ErrorCode {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::UnknownTag(_) | FrameError::BadTerminator => ErrorCode::InvalidResponse,
            FrameError::TextTooLong => ErrorCode::BufferOverflow,
        }
    }
}

impl From<RowError> for ErrorCode {
    fn from(_: RowError) -> Self {
        ErrorCode::InvalidResponse
    }
}

impl From<DirectoryError> for ErrorCode {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Full | DirectoryError::NameTooLong => ErrorCode::BufferOverflow,
            DirectoryError::DuplicateName | DirectoryError::DuplicateId => {
                ErrorCode::InvalidResponse
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_success() {
        assert_eq!(ErrorCode::default(), ErrorCode::Success);
        assert!(ErrorCode::default().is_success());
        assert!(!ErrorCode::Timeout.is_success());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(
            ErrorCode::from(CommandError::BufferTooSmall),
            ErrorCode::BufferOverflow
        );
        assert_eq!(
            ErrorCode::from(FrameError::BadTerminator),
            ErrorCode::InvalidResponse
        );
        assert_eq!(
            ErrorCode::from(RowError::MissingField),
            ErrorCode::InvalidResponse
        );
        assert_eq!(ErrorCode::from(DirectoryError::Full), ErrorCode::BufferOverflow);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ErrorCode::NotConnected.as_str(), "NOT_CONNECTED");
        assert_eq!(ErrorCode::ComponentNotFound.as_str(), "COMPONENT_NOT_FOUND");
    }
}
