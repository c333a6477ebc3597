/// The outcome of a single coordinator step.
///
/// - [`Poll::Ready`] means a `(timestamp, sequence)` pair was claimed.
/// - [`Poll::Pending`] means the sequence for the current millisecond is
///   exhausted and the clock must advance past `last_timestamp` first.
///
/// A backward clock is not a `Poll` outcome; it is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A slot was claimed and the state advanced.
    Ready {
        /// Absolute milliseconds since the Unix epoch.
        timestamp: u64,
        sequence: u64,
    },
    /// No slot is left in the current millisecond.
    Pending {
        /// The millisecond the clock has to move past.
        last_timestamp: u64,
    },
}
