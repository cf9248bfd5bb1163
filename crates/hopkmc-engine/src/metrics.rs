//! Cumulative run counters.
//!
//! [`RunMetrics`] is updated after every step and returned in the
//! [`RunSummary`](crate::simulation::RunSummary).

use hopkmc_core::ProcessKind;

/// Counters collected since construction or the last reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Steps taken, contended ones included.
    pub steps: u64,
    /// Successful hops.
    pub hops: u64,
    /// Selections whose destination turned out to be occupied.
    pub contended: u64,
    /// Unavailable flags cleared because their destination was vacated.
    pub revalidations: u64,
    /// Successful hops per process, indexed by [`ProcessKind::index`].
    pub hops_by_process: [u64; ProcessKind::COUNT],
    /// Total rate of the tree at the last selection.
    pub last_total_rate: f64,
    /// Waiting time drawn at the last step.
    pub last_dt: f64,
}

impl RunMetrics {
    /// Successful hops driven by `process`.
    pub fn hops_for(&self, process: ProcessKind) -> u64 {
        self.hops_by_process[process.index()]
    }

    /// Share of steps that were contended. Zero before the first step.
    pub fn contention_ratio(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.contended as f64 / self.steps as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.steps, 0);
        assert_eq!(m.hops, 0);
        assert!(ProcessKind::ALL.iter().all(|&p| m.hops_for(p) == 0));
        assert_eq!(m.contention_ratio(), 0.0);
    }

    #[test]
    fn contention_ratio() {
        let m = RunMetrics {
            steps: 8,
            contended: 2,
            ..Default::default()
        };
        assert_eq!(m.contention_ratio(), 0.25);
    }
}
