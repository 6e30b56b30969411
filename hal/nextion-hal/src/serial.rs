//! Serial stream abstraction
//!
//! The display driver reads its input one byte at a time and classifies
//! frames by peeking at the leading byte, so the port must expose its
//! receive buffer rather than a blocking `read(&mut [u8])`.

/// Buffered duplex serial port connected to the display
///
/// Reads never block: they only return bytes that have already been
/// received and buffered by the implementation (typically an interrupt or
/// DMA driven ring buffer).
pub trait SerialPort {
    /// Error type for transmit operations
    type Error;

    /// Number of received bytes ready to be read
    fn available(&self) -> usize;

    /// Take the next buffered byte, if any
    fn read_byte(&mut self) -> Option<u8>;

    /// Look at the next buffered byte without consuming it
    fn peek_byte(&self) -> Option<u8>;

    /// Write all bytes to the display
    ///
    /// Blocks until the data has been handed to the transmitter or an
    /// error occurs.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Discard everything currently buffered
    ///
    /// Returns the number of bytes dropped.
    fn discard_input(&mut self) -> usize {
        let mut dropped = 0;
        while self.read_byte().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl<T: SerialPort + ?Sized> SerialPort for &mut T {
    type Error = T::Error;

    fn available(&self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn peek_byte(&self) -> Option<u8> {
        (**self).peek_byte()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(data)
    }
}
