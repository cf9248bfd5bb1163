//! Error types for replay comparison.

use std::fmt;

use hopkmc_core::HopRecord;

/// A replayed trajectory did not reproduce the recorded one.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplayError {
    /// The replay produced a different number of hops.
    LengthMismatch {
        /// Hops in the recording.
        expected: usize,
        /// Hops produced by the replay.
        actual: usize,
    },
    /// The replay produced a different hop at `index`.
    Diverged {
        /// Position of the first differing hop.
        index: usize,
        /// The recorded hop.
        expected: HopRecord,
        /// The replayed hop.
        actual: HopRecord,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => write!(
                f,
                "trajectory length mismatch: recorded {expected} hops, replayed {actual}"
            ),
            Self::Diverged {
                index,
                expected,
                actual,
            } => write!(
                f,
                "trajectory diverged at hop {index}: recorded {expected}, replayed {actual}"
            ),
        }
    }
}

impl std::error::Error for ReplayError {}
