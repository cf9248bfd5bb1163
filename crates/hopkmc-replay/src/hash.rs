//! Hashing utilities for trajectory comparison.
//!
//! Uses FNV-1a for fast, deterministic hashing of hop records. These
//! hashes are not cryptographically secure; they are used for fast
//! equality checks during replay comparison.

use hopkmc_core::HopRecord;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a u32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Fold one record into a running hash.
///
/// The time enters as its exact bit pattern, so two trajectories hash
/// equal only if every time is bit-identical.
pub fn fold_record(mut hash: u64, record: &HopRecord) -> u64 {
    hash = fnv1a_u64(hash, record.step);
    hash = fnv1a_u64(hash, record.time.to_bits());
    hash = fnv1a_u32(hash, record.carrier.0);
    hash = fnv1a_byte(hash, record.kind.index() as u8);
    hash = fnv1a_u32(hash, record.origin.0);
    hash = fnv1a_u32(hash, record.destination.0);
    hash = fnv1a_u32(hash, record.channel.0);
    fnv1a_byte(hash, record.process.index() as u8)
}

/// Hash of a single record.
pub fn record_hash(record: &HopRecord) -> u64 {
    fold_record(FNV_OFFSET, record)
}

/// Hash of a whole trajectory, order-sensitive.
///
/// Returns `FNV_OFFSET` (non-zero) for an empty trajectory.
pub fn trajectory_hash(records: &[HopRecord]) -> u64 {
    records.iter().fold(FNV_OFFSET, fold_record)
}

/// Running hash state, for hashing a trajectory as it is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrajectoryHasher {
    hash: u64,
    count: u64,
}

impl Default for TrajectoryHasher {
    fn default() -> Self {
        Self {
            hash: FNV_OFFSET,
            count: 0,
        }
    }
}

impl TrajectoryHasher {
    /// A hasher over the empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the next record.
    pub fn update(&mut self, record: &HopRecord) {
        self.hash = fold_record(self.hash, record);
        self.count += 1;
    }

    /// Hash of every record so far. Equal to [`trajectory_hash`] over
    /// the same records.
    pub fn finish(&self) -> u64 {
        self.hash
    }

    /// Records folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}
