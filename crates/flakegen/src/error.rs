/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The category of an [`Error`].
///
/// Callers that need to branch on the failure (e.g. alert on clock skew but
/// reject bad configuration) should match on the kind rather than on the
/// message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A worker ID outside `0..=31` was supplied.
    InvalidWorkerId,
    /// A datacenter ID outside `0..=31` was supplied.
    InvalidDatacenterId,
    /// The clock reported a time the generator cannot encode: earlier than
    /// the last issued timestamp, or earlier than the epoch.
    InvalidTimestamp,
    /// A serialized generator state could not be parsed.
    MalformedState,
    /// The epoch leaves no room for a 41-bit timestamp in a `u64`.
    InvalidEpoch,
    /// The generator's mutex was poisoned by a panicking thread.
    #[cfg_attr(docsrs, doc(cfg(all(feature = "lock", not(feature = "parking-lot")))))]
    #[cfg(all(feature = "lock", not(feature = "parking-lot")))]
    LockPoisoned,
}

/// All error variants that `flakegen` can emit.
///
/// Every variant is reported synchronously by the failing call, and the
/// generator state is left exactly as it was before that call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker ID does not fit in its 5-bit field.
    #[error("worker id {worker_id} is out of range (max {max})")]
    InvalidWorkerId { worker_id: u64, max: u64 },

    /// The datacenter ID does not fit in its 5-bit field.
    #[error("datacenter id {datacenter_id} is out of range (max {max})")]
    InvalidDatacenterId { datacenter_id: u64, max: u64 },

    /// The clock moved backwards relative to the last issued ID.
    #[error("clock moved backwards: now {now} ms, last issued {last} ms")]
    InvalidTimestamp { now: u64, last: u64 },

    /// The clock reads earlier than the generator's epoch.
    #[error("clock reads {now} ms, which is before the epoch at {epoch} ms")]
    TimestampBeforeEpoch { now: u64, epoch: u64 },

    /// The clock is too far past the epoch for the 41-bit timestamp field.
    #[error("clock reads {now} ms, past the last encodable millisecond of the epoch at {epoch} ms")]
    TimestampOverflow { now: u64, epoch: u64 },

    /// The epoch, plus the largest encodable timestamp, does not fit in a
    /// `u64` millisecond count.
    #[error("epoch of {epoch_ms} ms is out of range (max {max} ms)")]
    InvalidEpoch { epoch_ms: u128, max: u64 },

    /// The serialized state has the wrong shape or a non-numeric field.
    #[error("malformed generator state: {reason}")]
    MalformedState { reason: String },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// When the `parking-lot` feature is enabled, mutexes do **not** poison,
    /// so this variant is not available.
    #[cfg_attr(docsrs, doc(cfg(all(feature = "lock", not(feature = "parking-lot")))))]
    #[cfg(all(feature = "lock", not(feature = "parking-lot")))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWorkerId { .. } => ErrorKind::InvalidWorkerId,
            Self::InvalidDatacenterId { .. } => ErrorKind::InvalidDatacenterId,
            Self::InvalidTimestamp { .. }
            | Self::TimestampBeforeEpoch { .. }
            | Self::TimestampOverflow { .. } => ErrorKind::InvalidTimestamp,
            Self::InvalidEpoch { .. } => ErrorKind::InvalidEpoch,
            Self::MalformedState { .. } => ErrorKind::MalformedState,
            #[cfg(all(feature = "lock", not(feature = "parking-lot")))]
            Self::LockPoisoned => ErrorKind::LockPoisoned,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedState {
            reason: reason.into(),
        }
    }
}

#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
// Collapse every poisoned guard into a single variant; the guard itself is
// dropped.
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
