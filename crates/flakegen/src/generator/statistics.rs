/// Counters maintained by a generator.
///
/// A snapshot is read under the same critical section as generation, so the
/// three counters are always mutually consistent.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Statistics {
    /// Clock polls spent waiting for the millisecond to advance after the
    /// sequence was exhausted.
    pub timestamp_wait_count: u64,
    /// IDs handed out.
    pub total_ids_generated: u64,
    /// Times the 12-bit sequence ran out within a millisecond.
    pub sequence_rollovers: u64,
}
