use std::{
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::TimeSource;

#[derive(Debug)]
struct Anchor {
    start: Instant,
    start_millis: u64,
}

/// A monotonic time source expressed in wall-clock milliseconds.
///
/// At construction the clock captures one `Instant` and the corresponding
/// `SystemTime` reading. Every later call returns
/// `start_millis + (Instant::now() - start)`, so NTP slews, DST changes or a
/// manual `date -s` after construction never move it backwards.
///
/// Clones share the same anchor, so every clone reports the same timeline.
///
/// # Example
///
/// ```
/// use flakegen::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new();
/// let a = clock.current_millis();
/// std::thread::sleep(std::time::Duration::from_millis(2));
/// let b = clock.current_millis();
/// assert!(b >= a);
/// ```
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<Anchor>,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new clock to the current system time.
    ///
    /// A system clock set before 1970 anchors the clock at zero.
    pub fn new() -> Self {
        let start = Instant::now();
        let start_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self::anchored_at(start, start_millis)
    }

    /// Anchors a clock to an explicit `(Instant, wall-clock ms)` pair.
    pub fn anchored_at(start: Instant, start_millis: u64) -> Self {
        Self {
            inner: Arc::new(Anchor {
                start,
                start_millis,
            }),
        }
    }

    /// The wall-clock millisecond value captured at construction.
    pub fn start_millis(&self) -> u64 {
        self.inner.start_millis
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        // `Instant` never goes backwards, so neither does this sum.
        self.inner.start_millis + self.inner.start.elapsed().as_millis() as u64
    }
}
