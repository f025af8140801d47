//! Time source for decision pacing and energy accounting.

/// Monotonic millisecond clock.
///
/// Injected so tests can simulate hours of operation instantly.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
