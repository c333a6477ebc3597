use core::cell::RefCell;

use crate::Result;
#[cfg(feature = "lock")]
use crate::generator::Mutex;

/// A critical-section policy guarding a generator's mutable state.
///
/// The policy is a type parameter of [`SnowflakeGenerator`], so it is fixed
/// when the generator is built and cannot be swapped on a live instance.
///
/// Every read and write of the generator state goes through [`Self::with`];
/// the closure runs with exclusive access and must not re-enter the policy.
///
/// [`SnowflakeGenerator`]: crate::SnowflakeGenerator
pub trait CriticalSection<S> {
    /// Wraps `state` in this policy.
    fn new(state: S) -> Self;

    /// Runs `f` with exclusive access to the state.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying implementation uses a lock and it
    /// is poisoned.
    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R>;
}

/// A policy that performs no synchronization.
///
/// The caller guarantees exclusive access, either by staying on one thread or
/// by synchronizing externally. Because it is backed by a [`RefCell`], a
/// generator using it is `!Sync` and the compiler rejects sharing it across
/// threads by reference.
///
/// ## See Also
/// - [`MutexLock`]
#[derive(Debug)]
pub struct NoLock<S> {
    state: RefCell<S>,
}

impl<S> CriticalSection<S> for NoLock<S> {
    fn new(state: S) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    #[inline]
    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R> {
        Ok(f(&mut self.state.borrow_mut()))
    }
}

/// A policy that holds a mutex for the duration of each call.
///
/// Uses `std::sync::Mutex` by default, or `parking_lot::Mutex` with the
/// `parking-lot` feature (which cannot poison). With `cache-padded`, the
/// mutex is padded to its own cache line.
///
/// A batch call acquires the lock once for the whole batch.
///
/// ## See Also
/// - [`NoLock`]
#[cfg_attr(docsrs, doc(cfg(feature = "lock")))]
#[cfg(feature = "lock")]
#[derive(Debug)]
pub struct MutexLock<S> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<S>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<S>,
}

#[cfg(feature = "lock")]
impl<S> CriticalSection<S> for MutexLock<S> {
    fn new(state: S) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
        }
    }

    #[inline]
    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R> {
        let mut guard = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };
        Ok(f(&mut guard))
    }
}
