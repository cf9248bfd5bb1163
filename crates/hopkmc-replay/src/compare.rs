//! Trajectory comparison and replay verification.
//!
//! Provides hash-first comparison (fast path) with a per-record,
//! per-field fallback on mismatch, plus a streaming replay driver.

use hopkmc_core::HopRecord;

use crate::error::ReplayError;
use crate::hash::trajectory_hash;

/// A field of [`HopRecord`] that differs between two runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivergentField {
    /// Step index.
    Step,
    /// Simulated time, compared bit for bit.
    Time,
    /// Carrier id.
    Carrier,
    /// Carrier kind.
    Kind,
    /// Origin site.
    Origin,
    /// Destination site.
    Destination,
    /// Channel id.
    Channel,
    /// Process.
    Process,
}

/// The first point at which two trajectories differ.
#[derive(Clone, Debug, PartialEq)]
pub struct DivergenceReport {
    /// Index of the first differing record.
    pub index: usize,
    /// The recorded hop, if the recording is that long.
    pub expected: Option<HopRecord>,
    /// The replayed hop, if the replay is that long.
    pub actual: Option<HopRecord>,
    /// Differing fields. Empty when one side is missing.
    pub fields: Vec<DivergentField>,
}

/// Fields in which `a` and `b` differ. Times are compared by bit pattern.
pub fn diff_records(a: &HopRecord, b: &HopRecord) -> Vec<DivergentField> {
    let checks = [
        (a.step != b.step, DivergentField::Step),
        (a.time.to_bits() != b.time.to_bits(), DivergentField::Time),
        (a.carrier != b.carrier, DivergentField::Carrier),
        (a.kind != b.kind, DivergentField::Kind),
        (a.origin != b.origin, DivergentField::Origin),
        (a.destination != b.destination, DivergentField::Destination),
        (a.channel != b.channel, DivergentField::Channel),
        (a.process != b.process, DivergentField::Process),
    ];
    checks
        .into_iter()
        .filter_map(|(differs, field)| differs.then_some(field))
        .collect()
}

/// Compare two complete trajectories.
///
/// Fast path: equal lengths and equal hashes return `None`. Otherwise the
/// records are walked to find the first divergence.
pub fn compare_trajectories(
    expected: &[HopRecord],
    actual: &[HopRecord],
) -> Option<DivergenceReport> {
    if expected.len() == actual.len() && trajectory_hash(expected) == trajectory_hash(actual) {
        return None;
    }
    for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
        let fields = diff_records(e, a);
        if !fields.is_empty() {
            return Some(DivergenceReport {
                index,
                expected: Some(*e),
                actual: Some(*a),
                fields,
            });
        }
    }
    if expected.len() == actual.len() {
        return None;
    }
    let index = expected.len().min(actual.len());
    Some(DivergenceReport {
        index,
        expected: expected.get(index).copied(),
        actual: actual.get(index).copied(),
        fields: Vec::new(),
    })
}

/// Replay against a recording, one hop at a time.
///
/// `next_hop` advances the replayed simulation until it produces its next
/// hop, or returns `None` once it has no more. Stops at the first
/// mismatch. Every recorded hop must be reproduced and the replay must
/// then report `None`.
pub fn replay_and_compare(
    expected: &[HopRecord],
    next_hop: &mut dyn FnMut() -> Option<HopRecord>,
) -> Result<(), ReplayError> {
    for (index, e) in expected.iter().enumerate() {
        let Some(actual) = next_hop() else {
            return Err(ReplayError::LengthMismatch {
                expected: expected.len(),
                actual: index,
            });
        };
        if !diff_records(e, &actual).is_empty() {
            return Err(ReplayError::Diverged {
                index,
                expected: *e,
                actual,
            });
        }
    }
    if next_hop().is_some() {
        return Err(ReplayError::LengthMismatch {
            expected: expected.len(),
            actual: expected.len() + 1,
        });
    }
    Ok(())
}
