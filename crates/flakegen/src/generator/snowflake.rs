use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(feature = "lock")]
use crate::generator::MutexLock;
use crate::{
    Error, MonotonicClock, RandSource, Result, SecretKey, SnowflakeId, SnowflakeParts,
    ThreadRandom, TimeSource,
    generator::{Coordinator, CriticalSection, GeneratorState, NoLock, Statistics},
};

/// A Snowflake ID generator with a pluggable critical-section policy.
///
/// Every ID packs `(timestamp - epoch, datacenter_id, worker_id, sequence)`
/// into 63 bits and is then XORed with the generator's [`SecretKey`]. For one
/// instance, successive IDs never repeat and their `(timestamp, sequence)`
/// pairs never decrease.
///
/// The policy `L` decides how concurrent callers are handled:
/// - [`NoLock`]: single-threaded or externally synchronized use. See
///   [`BasicSnowflakeGenerator`].
/// - [`MutexLock`]: shared use across threads. See
///   [`LockSnowflakeGenerator`].
///
/// ## Recommended When
/// - Many independent processes need collision-free 64-bit IDs without
///   talking to each other, and each process has a unique
///   `(datacenter_id, worker_id)` pair assigned from outside.
///
/// ## Caveats
/// - If the clock moves backwards, generation fails with
///   [`ErrorKind::InvalidTimestamp`] rather than risk a duplicate. Treat it
///   as an operator-visible clock-skew event.
/// - When 4096 IDs are drawn within one millisecond, the caller spins until
///   the next millisecond, with the lock held under [`MutexLock`].
///
/// [`ErrorKind::InvalidTimestamp`]: crate::ErrorKind::InvalidTimestamp
pub struct SnowflakeGenerator<L, T = MonotonicClock>
where
    L: CriticalSection<Coordinator>,
    T: TimeSource,
{
    epoch: u64,
    core: L,
    time: T,
}

/// A generator without synchronization.
pub type BasicSnowflakeGenerator<T = MonotonicClock> =
    SnowflakeGenerator<NoLock<Coordinator>, T>;

/// A generator that serializes callers through a mutex.
#[cfg_attr(docsrs, doc(cfg(feature = "lock")))]
#[cfg(feature = "lock")]
pub type LockSnowflakeGenerator<T = MonotonicClock> =
    SnowflakeGenerator<MutexLock<Coordinator>, T>;

impl<L, T> SnowflakeGenerator<L, T>
where
    L: CriticalSection<Coordinator>,
    T: TimeSource,
{
    /// Creates a new generator with a random secret key.
    ///
    /// # Parameters
    ///
    /// - `epoch`: The origin of the encoded timestamp, as a [`Duration`] since
    ///   1970-01-01 UTC. Fixed for the life of the generator.
    /// - `worker_id`, `datacenter_id`: The identity encoded into every ID.
    ///   Each must be in `0..=31`.
    /// - `time`: A [`TimeSource`] implementation (e.g., [`MonotonicClock`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] or [`Error::InvalidDatacenterId`]
    /// if either ID exceeds 31, and [`Error::InvalidEpoch`] if the epoch
    /// leaves no room for a 41-bit timestamp below `u64::MAX` ms.
    ///
    /// # Example
    /// ```
    /// use flakegen::{BasicSnowflakeGenerator, MonotonicClock, ATOM_EPOCH};
    ///
    /// let generator = BasicSnowflakeGenerator::new(ATOM_EPOCH, 1, 1, MonotonicClock::new()).unwrap();
    /// let id = generator.next_id().unwrap();
    /// let parts = generator.parse(id).unwrap();
    /// assert_eq!((parts.datacenter_id, parts.worker_id), (1, 1));
    /// ```
    pub fn new(epoch: Duration, worker_id: u64, datacenter_id: u64, time: T) -> Result<Self> {
        Self::with_rand(epoch, worker_id, datacenter_id, &ThreadRandom, time)
    }

    /// Creates a new generator drawing its secret key from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_rand<R: RandSource<u64>>(
        epoch: Duration,
        worker_id: u64,
        datacenter_id: u64,
        rng: &R,
        time: T,
    ) -> Result<Self> {
        Self::with_secret_key(
            epoch,
            worker_id,
            datacenter_id,
            SecretKey::random(rng),
            time,
        )
    }

    /// Creates a new generator with an explicit secret key.
    ///
    /// Instances sharing a key can parse and validate each other's IDs.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_secret_key(
        epoch: Duration,
        worker_id: u64,
        datacenter_id: u64,
        secret_key: SecretKey,
        time: T,
    ) -> Result<Self> {
        let state = GeneratorState::new(worker_id, datacenter_id, secret_key)?;
        Self::from_state(epoch, state, time)
    }

    /// Creates a generator that continues from a previously captured state.
    ///
    /// This constructor is primarily useful for restoring state from
    /// persistent storage. The clock anchor always comes from `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEpoch`] if the epoch is out of range.
    pub fn from_state(epoch: Duration, state: GeneratorState, time: T) -> Result<Self> {
        Ok(Self {
            epoch: Self::epoch_millis(epoch)?,
            core: L::new(Coordinator::new(state)),
            time,
        })
    }

    // Every decoded timestamp is `epoch + t` with `t <= TIMESTAMP_MASK`, so
    // this bound keeps `decode` from overflowing.
    fn epoch_millis(epoch: Duration) -> Result<u64> {
        let max = u64::MAX - SnowflakeId::TIMESTAMP_MASK;
        let epoch_ms = epoch.as_millis();
        u64::try_from(epoch_ms)
            .ok()
            .filter(|&ms| ms <= max)
            .ok_or(Error::InvalidEpoch { epoch_ms, max })
    }

    /// The epoch in milliseconds since the Unix epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replaces the worker and datacenter IDs.
    ///
    /// The sequence, last timestamp and secret key are kept.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`]; on error the identity is unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn init(&self, worker_id: u64, datacenter_id: u64) -> Result<()> {
        self.core
            .with(|core| core.state.set_identity(worker_id, datacenter_id))?
    }

    /// Generates the next ID.
    ///
    /// Spins through sequence exhaustion until the clock advances.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ErrorKind::InvalidTimestamp`] if the clock
    /// is behind the last issued ID or before the epoch, or
    /// [`ErrorKind::LockPoisoned`] for a poisoned std mutex.
    ///
    /// [`ErrorKind::InvalidTimestamp`]: crate::ErrorKind::InvalidTimestamp
    /// [`ErrorKind::LockPoisoned`]: crate::ErrorKind
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<u64> {
        let [id] = self.next_id_array::<1>()?;
        Ok(id)
    }

    /// Generates `count` consecutive IDs under a single lock acquisition.
    ///
    /// The returned IDs are ordered as issued. Either all `count` IDs are
    /// produced or none are and the state is unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_ids(&self, count: usize) -> Result<Vec<u64>> {
        let mut ids = vec![0; count];
        self.fill(&mut ids)?;
        Ok(ids)
    }

    /// Generates `N` consecutive IDs under a single lock acquisition.
    ///
    /// Compile-time sized counterpart of [`Self::next_ids`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    pub fn next_id_array<const N: usize>(&self) -> Result<[u64; N]> {
        let mut ids = [0; N];
        self.fill(&mut ids)?;
        Ok(ids)
    }

    fn fill(&self, out: &mut [u64]) -> Result<()> {
        let epoch = self.epoch;
        let time = &self.time;
        self.core.with(|core| core.fill(time, epoch, out))?
    }

    /// Decodes an ID issued under this generator's secret key.
    ///
    /// The returned timestamp is absolute (epoch added back). IDs issued under
    /// a different key decode to arbitrary field values.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn parse(&self, id: u64) -> Result<SnowflakeParts> {
        let key = self.core.with(|core| core.state.secret_key())?;
        Ok(self.decode(key, id))
    }

    /// Returns the absolute timestamp of `id`.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn extract_timestamp(&self, id: u64) -> Result<u64> {
        self.parse(id).map(|parts| parts.timestamp)
    }

    /// Returns whether `id` plausibly came from this generator.
    ///
    /// True iff, decoded with this generator's key, the datacenter and worker
    /// IDs match this generator's and the timestamp is not in the future.
    /// Detection of foreign IDs is probabilistic, not guaranteed.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn validate(&self, id: u64) -> Result<bool> {
        let (key, worker_id, datacenter_id) = self.core.with(|core| {
            (
                core.state.secret_key(),
                core.state.worker_id(),
                core.state.datacenter_id(),
            )
        })?;
        let parts = self.decode(key, id);
        // The clock is read after the lock is released. A concurrent `init`
        // may land in between; the answer is then valid for the identity
        // snapshotted above.
        Ok(parts.datacenter_id == datacenter_id
            && parts.worker_id == worker_id
            && parts.timestamp <= self.time.current_millis())
    }

    fn decode(&self, key: SecretKey, id: u64) -> SnowflakeParts {
        let packed = key.absorb(id);
        SnowflakeParts {
            timestamp: packed.timestamp() + self.epoch,
            datacenter_id: packed.datacenter_id(),
            worker_id: packed.worker_id(),
            sequence: packed.sequence(),
        }
    }

    /// Zeroes the sequence and last timestamp.
    ///
    /// Identity and secret key survive. The next ID restarts at sequence `0`
    /// of whatever millisecond the clock then reads, so a reset within the
    /// millisecond of the last issued ID can repeat that millisecond's IDs.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn reset(&self) -> Result<()> {
        self.core.with(|core| core.state.clear_slot())
    }

    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn worker_id(&self) -> Result<u64> {
        self.core.with(|core| core.state.worker_id())
    }

    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn datacenter_id(&self) -> Result<u64> {
        self.core.with(|core| core.state.datacenter_id())
    }

    /// Returns a consistent snapshot of the counters.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn statistics(&self) -> Result<Statistics> {
        self.core.with(|core| core.statistics)
    }

    /// Returns a copy of the externalizable state.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn state(&self) -> Result<GeneratorState> {
        self.core.with(|core| core.state)
    }

    /// Renders the state as `worker:datacenter:sequence:last_timestamp:key`.
    ///
    /// # Errors
    ///
    /// Only fails if the lock is poisoned.
    pub fn serialize(&self) -> Result<String> {
        self.state().map(|state| state.to_string())
    }

    /// Replaces the state with one produced by [`Self::serialize`].
    ///
    /// The text is fully parsed and checked before the state is touched; the
    /// clock anchor and statistics are kept.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ErrorKind::MalformedState`] if the field
    /// count is not five or a field is not an unsigned integer, and the
    /// identity errors if the restored IDs are out of range.
    ///
    /// [`ErrorKind::MalformedState`]: crate::ErrorKind::MalformedState
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, s)))]
    pub fn deserialize(&self, s: &str) -> Result<()> {
        let state: GeneratorState = s.parse()?;
        self.core.with(|core| core.state = state)
    }
}
