use core::cmp::Ordering;

use crate::{
    Error, Result, SnowflakeId, TimeSource,
    generator::{GeneratorState, Poll, Statistics},
};

/// The sequence/timestamp state machine.
///
/// One coordinator lives inside each generator's critical section. It owns
/// every mutable field of the generator, so holding the section means holding
/// the whole state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coordinator {
    pub(crate) state: GeneratorState,
    pub(crate) statistics: Statistics,
}

impl Coordinator {
    pub fn new(state: GeneratorState) -> Self {
        Self {
            state,
            statistics: Statistics::default(),
        }
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Performs one step for a clock reading of `now`.
    ///
    /// - `now` past the last timestamp: claims `(now, 0)`.
    /// - `now` equal to it: claims the next sequence, or returns
    ///   [`Poll::Pending`] if all 4096 are used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimestamp`] if `now` is behind the last
    /// timestamp. The state is untouched in that case.
    pub fn poll(&mut self, now: u64) -> Result<Poll> {
        let last = self.state.last_timestamp();
        match now.cmp(&last) {
            Ordering::Greater => {
                self.state.set_slot(now, 0);
                Ok(Poll::Ready {
                    timestamp: now,
                    sequence: 0,
                })
            }
            Ordering::Equal => {
                let sequence = self.state.sequence();
                if sequence < SnowflakeId::max_sequence() {
                    self.state.set_slot(now, sequence + 1);
                    Ok(Poll::Ready {
                        timestamp: now,
                        sequence: sequence + 1,
                    })
                } else {
                    Ok(Poll::Pending {
                        last_timestamp: last,
                    })
                }
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, last)),
        }
    }

    /// Claims the next slot, spinning through sequence exhaustion.
    ///
    /// Each clock poll made while the sequence is exhausted bumps
    /// `timestamp_wait_count`. There is no timeout: a frozen clock keeps the
    /// caller spinning, a backward one ends the wait with an error.
    pub fn next_slot<T: TimeSource>(&mut self, time: &T) -> Result<(u64, u64)> {
        let mut exhausted = false;
        loop {
            match self.poll(time.current_millis())? {
                Poll::Ready {
                    timestamp,
                    sequence,
                } => {
                    self.statistics.total_ids_generated += 1;
                    return Ok((timestamp, sequence));
                }
                Poll::Pending { last_timestamp } => {
                    if !exhausted {
                        exhausted = true;
                        self.statistics.sequence_rollovers += 1;
                        #[cfg(feature = "tracing")]
                        tracing::debug!(last_timestamp, "sequence exhausted, waiting for clock");
                        #[cfg(not(feature = "tracing"))]
                        let _ = last_timestamp;
                    }
                    self.statistics.timestamp_wait_count += 1;
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Claims the next slot and encodes it as an obfuscated ID.
    ///
    /// # Errors
    ///
    /// Fails on a backward clock, if the clock reads before `epoch`, or if it
    /// is more than `TIMESTAMP_MASK` ms past `epoch`.
    pub fn next_id<T: TimeSource>(&mut self, time: &T, epoch: u64) -> Result<u64> {
        let (timestamp, sequence) = self.next_slot(time)?;
        let relative = timestamp
            .checked_sub(epoch)
            .ok_or(Error::TimestampBeforeEpoch {
                now: timestamp,
                epoch,
            })?;
        if relative > SnowflakeId::TIMESTAMP_MASK {
            return Err(Self::cold_timestamp_overflow(timestamp, epoch));
        }
        let packed = SnowflakeId::from_parts(
            relative,
            self.state.datacenter_id(),
            self.state.worker_id(),
            sequence,
        );
        Ok(self.state.secret_key().emit(packed))
    }

    /// Fills `out` with consecutive IDs.
    ///
    /// On error the coordinator is rolled back to its state before the call,
    /// counters included, and `out` contents are unspecified.
    pub fn fill<T: TimeSource>(&mut self, time: &T, epoch: u64, out: &mut [u64]) -> Result<()> {
        let snapshot = *self;
        let res = out.iter_mut().try_for_each(|slot| {
            *slot = self.next_id(time, epoch)?;
            Ok(())
        });
        if res.is_err() {
            *self = snapshot;
        }
        res
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backwards, refusing to issue id");
        Error::InvalidTimestamp { now, last }
    }

    #[cold]
    #[inline(never)]
    fn cold_timestamp_overflow(now: u64, epoch: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(now, epoch, "timestamp field exhausted for this epoch");
        Error::TimestampOverflow { now, epoch }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, SecretKey};
    use core::cell::Cell;

    struct StepTime {
        values: Vec<u64>,
        index: Cell<usize>,
    }

    impl TimeSource for StepTime {
        fn current_millis(&self) -> u64 {
            let i = self.index.get();
            self.index.set(i + 1);
            self.values[i.min(self.values.len() - 1)]
        }
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(GeneratorState::new(1, 1, SecretKey::new(0)).unwrap())
    }

    #[test]
    fn poll_resets_sequence_on_new_millisecond() {
        let mut c = coordinator();
        assert_eq!(
            c.poll(10).unwrap(),
            Poll::Ready {
                timestamp: 10,
                sequence: 0
            }
        );
        assert_eq!(
            c.poll(10).unwrap(),
            Poll::Ready {
                timestamp: 10,
                sequence: 1
            }
        );
        assert_eq!(
            c.poll(11).unwrap(),
            Poll::Ready {
                timestamp: 11,
                sequence: 0
            }
        );
    }

    #[test]
    fn poll_pends_when_sequence_exhausted() {
        let mut c = coordinator();
        c.state.set_slot(10, SnowflakeId::max_sequence());
        assert_eq!(c.poll(10).unwrap(), Poll::Pending { last_timestamp: 10 });
        assert_eq!(c.state.sequence(), SnowflakeId::max_sequence());
    }

    #[test]
    fn poll_rejects_backward_clock_without_mutation() {
        let mut c = coordinator();
        c.poll(10).unwrap();
        let before = c;
        let err = c.poll(9).unwrap_err();
        assert_eq!(err, Error::InvalidTimestamp { now: 9, last: 10 });
        assert_eq!(c, before);
    }

    #[test]
    fn next_slot_counts_wait_polls() {
        let mut c = coordinator();
        c.state.set_slot(10, SnowflakeId::max_sequence());
        let time = StepTime {
            values: vec![10, 10, 10, 11],
            index: Cell::new(0),
        };
        assert_eq!(c.next_slot(&time).unwrap(), (11, 0));
        assert_eq!(c.statistics.timestamp_wait_count, 3);
        assert_eq!(c.statistics.sequence_rollovers, 1);
        assert_eq!(c.statistics.total_ids_generated, 1);
    }

    #[test]
    fn next_slot_fails_if_clock_falls_back_during_wait() {
        let mut c = coordinator();
        c.state.set_slot(10, SnowflakeId::max_sequence());
        let time = StepTime {
            values: vec![10, 9],
            index: Cell::new(0),
        };
        let err = c.next_slot(&time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTimestamp);
    }

    #[test]
    fn next_id_rejects_clock_before_epoch() {
        let mut c = coordinator();
        let time = StepTime {
            values: vec![5],
            index: Cell::new(0),
        };
        let err = c.next_id(&time, 10).unwrap_err();
        assert_eq!(err, Error::TimestampBeforeEpoch { now: 5, epoch: 10 });
    }

    #[test]
    fn next_id_rejects_timestamp_past_field_width() {
        let mut c = coordinator();
        let last = SnowflakeId::TIMESTAMP_MASK + 10;
        let time = StepTime {
            values: vec![last, last + 1],
            index: Cell::new(0),
        };
        let id = c.next_id(&time, 10).unwrap();
        assert_eq!(
            SnowflakeId::from_raw(id).timestamp(),
            SnowflakeId::TIMESTAMP_MASK
        );
        let before = c;
        let err = c.next_id(&time, 10).unwrap_err();
        assert_eq!(
            err,
            Error::TimestampOverflow {
                now: last + 1,
                epoch: 10
            }
        );
        assert_eq!(err.kind(), ErrorKind::InvalidTimestamp);
        // The rollback is up to `fill`; `next_id` alone has claimed the slot.
        assert_eq!(c.state.last_timestamp(), last + 1);
        let mut out = [0u64; 1];
        let mut c = before;
        let time = StepTime {
            values: vec![last + 1],
            index: Cell::new(0),
        };
        assert!(c.fill(&time, 10, &mut out).is_err());
        assert_eq!(c, before);
    }

    #[test]
    fn fill_rolls_back_on_failure() {
        let mut c = coordinator();
        c.poll(20).unwrap();
        let before = c;
        // Two good reads, then the clock jumps back.
        let time = StepTime {
            values: vec![21, 21, 3],
            index: Cell::new(0),
        };
        let mut out = [0u64; 3];
        assert!(c.fill(&time, 0, &mut out).is_err());
        assert_eq!(c, before);
    }

    #[test]
    fn fill_encodes_identity_and_slot() {
        let mut c = coordinator();
        let time = StepTime {
            values: vec![1_000],
            index: Cell::new(0),
        };
        let mut out = [0u64; 2];
        c.fill(&time, 400, &mut out).unwrap();
        let first = SnowflakeId::from_raw(out[0]);
        let second = SnowflakeId::from_raw(out[1]);
        assert_eq!(first, SnowflakeId::from_parts(600, 1, 1, 0));
        assert_eq!(second, SnowflakeId::from_parts(600, 1, 1, 1));
    }
}
