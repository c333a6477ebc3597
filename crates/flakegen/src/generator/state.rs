use core::{fmt, str::FromStr};

use crate::{Error, Result, SecretKey, SnowflakeId};

/// The externalizable state of a generator.
///
/// The text form is five base-10 integers joined by `:` in the fixed order
/// `worker_id:datacenter_id:sequence:last_timestamp:secret_key`. The clock
/// anchor of the generator is not part of it; a restoring generator
/// keeps its own.
///
/// # Example
///
/// ```
/// use flakegen::{GeneratorState, SecretKey};
///
/// let state = GeneratorState::from_components(1, 2, 7, 1_700_000_000_000, SecretKey::new(99)).unwrap();
/// let text = state.to_string();
/// assert_eq!(text, "1:2:7:1700000000000:99");
/// assert_eq!(text.parse::<GeneratorState>().unwrap(), state);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    worker_id: u64,
    datacenter_id: u64,
    sequence: u64,
    last_timestamp: u64,
    secret_key: SecretKey,
}

impl GeneratorState {
    /// Number of `:`-separated fields in the text form.
    pub const FIELD_COUNT: usize = 5;

    /// A fresh state: no ID issued yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] or [`Error::InvalidDatacenterId`] if
    /// either ID exceeds 31.
    pub fn new(worker_id: u64, datacenter_id: u64, secret_key: SecretKey) -> Result<Self> {
        Self::from_components(worker_id, datacenter_id, 0, 0, secret_key)
    }

    /// Rebuilds a state from explicit values, e.g. ones persisted earlier.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range worker or datacenter ID, and with
    /// [`Error::MalformedState`] if `sequence` exceeds 4095.
    pub fn from_components(
        worker_id: u64,
        datacenter_id: u64,
        sequence: u64,
        last_timestamp: u64,
        secret_key: SecretKey,
    ) -> Result<Self> {
        check_identity(worker_id, datacenter_id)?;
        if sequence > SnowflakeId::max_sequence() {
            return Err(Error::malformed(format!(
                "sequence {sequence} is out of range (max {})",
                SnowflakeId::max_sequence()
            )));
        }
        Ok(Self {
            worker_id,
            datacenter_id,
            sequence,
            last_timestamp,
            secret_key,
        })
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// Sequence of the most recently issued ID.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Absolute millisecond of the most recently issued ID, or `0` if none.
    pub const fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    pub const fn secret_key(&self) -> SecretKey {
        self.secret_key
    }

    pub(crate) fn set_identity(&mut self, worker_id: u64, datacenter_id: u64) -> Result<()> {
        check_identity(worker_id, datacenter_id)?;
        self.worker_id = worker_id;
        self.datacenter_id = datacenter_id;
        Ok(())
    }

    pub(crate) fn set_slot(&mut self, last_timestamp: u64, sequence: u64) {
        debug_assert!(sequence <= SnowflakeId::max_sequence(), "sequence overflow");
        self.last_timestamp = last_timestamp;
        self.sequence = sequence;
    }

    pub(crate) fn clear_slot(&mut self) {
        self.set_slot(0, 0);
    }
}

/// Checks that both IDs fit their 5-bit fields.
///
/// # Errors
///
/// Returns the error for whichever ID is out of range, worker first.
pub fn check_identity(worker_id: u64, datacenter_id: u64) -> Result<()> {
    if worker_id > SnowflakeId::max_worker_id() {
        return Err(Error::InvalidWorkerId {
            worker_id,
            max: SnowflakeId::max_worker_id(),
        });
    }
    if datacenter_id > SnowflakeId::max_datacenter_id() {
        return Err(Error::InvalidDatacenterId {
            datacenter_id,
            max: SnowflakeId::max_datacenter_id(),
        });
    }
    Ok(())
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.worker_id,
            self.datacenter_id,
            self.sequence,
            self.last_timestamp,
            self.secret_key.get()
        )
    }
}

impl FromStr for GeneratorState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        const NAMES: [&str; GeneratorState::FIELD_COUNT] = [
            "worker_id",
            "datacenter_id",
            "sequence",
            "last_timestamp",
            "secret_key",
        ];

        let raw: Vec<&str> = s.split(':').collect();
        if raw.len() != Self::FIELD_COUNT {
            return Err(Error::malformed(format!(
                "expected {} fields, found {}",
                Self::FIELD_COUNT,
                raw.len()
            )));
        }

        let mut fields = [0u64; GeneratorState::FIELD_COUNT];
        for ((slot, text), name) in fields.iter_mut().zip(&raw).zip(NAMES) {
            *slot = text.parse().map_err(|_| {
                Error::malformed(format!("`{name}` is not an unsigned integer: {text:?}"))
            })?;
        }

        let [worker_id, datacenter_id, sequence, last_timestamp, secret_key] = fields;
        Self::from_components(
            worker_id,
            datacenter_id,
            sequence,
            last_timestamp,
            SecretKey::new(secret_key),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn identity_bounds() {
        assert!(check_identity(31, 31).is_ok());
        assert_eq!(
            check_identity(32, 0).unwrap_err().kind(),
            ErrorKind::InvalidWorkerId
        );
        assert_eq!(
            check_identity(0, 32).unwrap_err().kind(),
            ErrorKind::InvalidDatacenterId
        );
    }

    #[test]
    fn text_form_round_trips() {
        let state =
            GeneratorState::from_components(31, 0, 4095, 1_609_459_200_123, SecretKey::new(u64::MAX))
                .unwrap();
        let text = state.to_string();
        assert_eq!(text, format!("31:0:4095:1609459200123:{}", u64::MAX));
        assert_eq!(text.parse::<GeneratorState>().unwrap(), state);
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        for input in ["only:two:parts", "", "1:2:3:4:5:6"] {
            let err = input.parse::<GeneratorState>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedState, "{input:?}");
        }
    }

    #[test]
    fn non_numeric_field_is_malformed() {
        for input in ["a:1:1:1:1", "1:1:1:1:", "1:1:-1:1:1", "1:1:1: 1:1"] {
            let err = input.parse::<GeneratorState>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedState, "{input:?}");
        }
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let err = "32:0:0:0:0".parse::<GeneratorState>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWorkerId);
        let err = "0:32:0:0:0".parse::<GeneratorState>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDatacenterId);
        let err = "0:0:4096:0:0".parse::<GeneratorState>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedState);
    }

    #[test]
    fn set_identity_is_all_or_nothing() {
        let mut state = GeneratorState::new(1, 1, SecretKey::new(0)).unwrap();
        assert!(state.set_identity(2, 40).is_err());
        assert_eq!((state.worker_id(), state.datacenter_id()), (1, 1));
        state.set_identity(2, 3).unwrap();
        assert_eq!((state.worker_id(), state.datacenter_id()), (2, 3));
    }
}
