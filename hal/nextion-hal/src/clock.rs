//! Elapsed-time clock

/// Monotonic millisecond clock
///
/// Only differences between readings are meaningful. Implementations
/// usually wrap the board's system timer (`embassy_time::Instant` or a
/// SysTick counter).
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `start`
    fn elapsed_since(&self, start: u64) -> u64 {
        self.now_ms().saturating_sub(start)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
