//! Per-process rate tables attached to transfer channels.

use crate::kind::ProcessKind;

/// One rate per [`ProcessKind`], in inverse simulated-time units.
///
/// A rate of `0.0` means the process is not available on the channel;
/// the engine creates no transfer event for it.
///
/// # Examples
///
/// ```
/// use hopkmc_core::{ProcessKind, RateTable};
///
/// let rates = RateTable::new()
///     .with(ProcessKind::ElectronHop, 2.0)
///     .with(ProcessKind::HoleHop, 0.5);
/// assert_eq!(rates.get(ProcessKind::ElectronHop), 2.0);
/// assert_eq!(rates.get(ProcessKind::Dexter), 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateTable {
    rates: [f64; ProcessKind::COUNT],
}

impl RateTable {
    /// A table with every rate zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rate for `process`, builder-style.
    pub fn with(mut self, process: ProcessKind, rate: f64) -> Self {
        self.rates[process.index()] = rate;
        self
    }

    /// Set the rate for `process` in place.
    pub fn set(&mut self, process: ProcessKind, rate: f64) {
        self.rates[process.index()] = rate;
    }

    /// The rate for `process`.
    #[inline]
    pub fn get(&self, process: ProcessKind) -> f64 {
        self.rates[process.index()]
    }

    /// Iterate over `(process, rate)` pairs with a strictly positive rate.
    pub fn iter_positive(&self) -> impl Iterator<Item = (ProcessKind, f64)> + '_ {
        ProcessKind::ALL
            .iter()
            .map(move |&p| (p, self.get(p)))
            .filter(|&(_, r)| r > 0.0)
    }

    /// First process whose rate is negative, NaN, or infinite.
    pub fn first_invalid(&self) -> Option<(ProcessKind, f64)> {
        ProcessKind::ALL
            .iter()
            .map(|&p| (p, self.get(p)))
            .find(|&(_, r)| !r.is_finite() || r < 0.0)
    }
}
