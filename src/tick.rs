//! Millisecond tick source
//!
//! A periodic timer calls [`TickCounter::inc`] from its own context; the GUI
//! loop reads the time elapsed since its last read through a [`TickCursor`].
//! The counter wraps at `u32::MAX` and elapsed time is computed with wrapping
//! arithmetic, so a wrap between two reads is harmless.
//!
//! ```
//! use dual_eye_display::tick::{TickCounter, TickCursor};
//!
//! static TICKS: TickCounter = TickCounter::new();
//!
//! let mut cursor = TickCursor::new(&TICKS);
//! TICKS.inc(1);
//! TICKS.inc(1);
//! assert_eq!(cursor.elapsed(&TICKS), 2);
//! assert_eq!(cursor.elapsed(&TICKS), 0);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Milliseconds since the tick source started
#[derive(Debug)]
pub struct TickCounter {
    ms: AtomicU32,
}

impl TickCounter {
    /// Counter at zero
    pub const fn new() -> Self {
        Self {
            ms: AtomicU32::new(0),
        }
    }

    /// Advance by `period_ms`; safe to call from a timer callback
    pub fn inc(&self, period_ms: u32) {
        self.ms.fetch_add(period_ms, Ordering::Release);
    }

    /// Current count
    pub fn now(&self) -> u32 {
        self.ms.load(Ordering::Acquire)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader position on a [`TickCounter`]
#[derive(Clone, Copy, Debug)]
pub struct TickCursor {
    last: u32,
}

impl TickCursor {
    /// Start reading from the counter's current value
    pub fn new(counter: &TickCounter) -> Self {
        Self {
            last: counter.now(),
        }
    }

    /// Milliseconds since the previous call
    pub fn elapsed(&mut self, counter: &TickCounter) -> u32 {
        let now = counter.now();
        let elapsed = now.wrapping_sub(self.last);
        self.last = now;
        elapsed
    }
}
