//! Error types for the hopkmc engine.
//!
//! Organized by subsystem: graph construction and scheduler stepping.
//! Configuration errors live next to the configuration they validate
//! (`hopkmc-engine::config`). Internal invariant breaks are panics and
//! have no variant here.

use std::error::Error;
use std::fmt;

use crate::id::SiteId;
use crate::kind::ProcessKind;

/// Errors from building the hopping graph.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphError {
    /// A channel endpoint refers to a site that was never added.
    UnknownSite(SiteId),
    /// A channel connects a site to itself.
    SelfLoop(SiteId),
    /// A channel connects two reservoirs directly.
    ReservoirLink {
        /// Origin reservoir.
        origin: SiteId,
        /// Destination reservoir.
        destination: SiteId,
    },
    /// A rate is negative, NaN, or infinite.
    InvalidRate {
        /// Origin of the offending channel.
        origin: SiteId,
        /// Destination of the offending channel.
        destination: SiteId,
        /// The process whose rate is invalid.
        process: ProcessKind,
        /// The invalid value.
        value: f64,
    },
    /// A position or displacement has a non-finite component.
    NonFiniteVector {
        /// What the vector describes ("position" or "displacement").
        what: &'static str,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSite(id) => write!(f, "unknown site {id}"),
            Self::SelfLoop(id) => write!(f, "channel from {id} to itself"),
            Self::ReservoirLink {
                origin,
                destination,
            } => write!(
                f,
                "channel {origin} -> {destination} links two reservoirs"
            ),
            Self::InvalidRate {
                origin,
                destination,
                process,
                value,
            } => write!(
                f,
                "channel {origin} -> {destination}: {process} rate must be finite and >= 0, got {value}"
            ),
            Self::NonFiniteVector { what } => write!(f, "{what} has a non-finite component"),
        }
    }
}

impl Error for GraphError {}

/// Errors from advancing the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The global cumulative rate is zero: no legal move exists anywhere.
    ///
    /// This is a property of the physical input, never retried.
    Deadlock {
        /// Simulated time when the deadlock was detected.
        time: f64,
        /// Number of scheduler iterations completed before the deadlock.
        step: u64,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deadlock { time, step } => write!(
                f,
                "deadlock: total rate is zero at t={time} after {step} steps"
            ),
        }
    }
}

impl Error for StepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadlock_display_carries_time_and_step() {
        let e = StepError::Deadlock {
            time: 1.5,
            step: 42,
        };
        let s = e.to_string();
        assert!(s.contains("t=1.5"));
        assert!(s.contains("42 steps"));
    }

    #[test]
    fn invalid_rate_display() {
        let e = GraphError::InvalidRate {
            origin: SiteId(0),
            destination: SiteId(1),
            process: ProcessKind::Dexter,
            value: -2.0,
        };
        let s = e.to_string();
        assert!(s.contains("S0 -> S1"));
        assert!(s.contains("dexter"));
        assert!(s.contains("-2"));
    }

    #[test]
    fn errors_are_std_errors() {
        let e: Box<dyn Error> = Box::new(GraphError::UnknownSite(SiteId(5)));
        assert_eq!(e.to_string(), "unknown site S5");
    }
}
