//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input for constructing a
//! [`Simulation`](crate::Simulation). [`validate()`](SimConfig::validate)
//! checks it against the graph before any state is built, so every
//! configuration problem surfaces before the first step.

use std::error::Error;
use std::fmt;

use hopkmc_core::{CarrierKind, SiteId};
use hopkmc_graph::Graph;
use indexmap::IndexSet;

// ── CarrierPlacement ───────────────────────────────────────────────

/// Where carriers start.
#[derive(Clone, Debug, PartialEq)]
pub enum CarrierPlacement {
    /// One carrier of `kind` on `site`. Reservoirs may hold any number.
    Explicit {
        /// Carrier kind.
        kind: CarrierKind,
        /// Starting site.
        site: SiteId,
    },
    /// `count` carriers of `kind` on distinct free bulk sites, drawn from
    /// the configuration seed.
    Random {
        /// Carrier kind.
        kind: CarrierKind,
        /// Number of carriers.
        count: usize,
    },
}

impl CarrierPlacement {
    /// Kind of the carriers placed.
    pub fn kind(&self) -> CarrierKind {
        match self {
            Self::Explicit { kind, .. } | Self::Random { kind, .. } => *kind,
        }
    }

    /// Number of carriers placed.
    pub fn count(&self) -> usize {
        match self {
            Self::Explicit { .. } => 1,
            Self::Random { count, .. } => *count,
        }
    }
}

// ── StopCondition ──────────────────────────────────────────────────

/// Bounds for [`Simulation::run`](crate::Simulation::run). The run stops
/// as soon as any bound is reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StopCondition {
    /// Maximum number of steps. Default: 10 000.
    pub max_steps: Option<u64>,
    /// Maximum simulated time.
    pub max_time: Option<f64>,
}

impl Default for StopCondition {
    fn default() -> Self {
        Self {
            max_steps: Some(10_000),
            max_time: None,
        }
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The step bound was reached.
    MaxSteps,
    /// The simulated-time bound was reached.
    MaxTime,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxSteps => write!(f, "max steps"),
            Self::MaxTime => write!(f, "max time"),
        }
    }
}

impl StopCondition {
    /// Stop after `n` steps.
    pub fn steps(n: u64) -> Self {
        Self {
            max_steps: Some(n),
            max_time: None,
        }
    }

    /// Stop once simulated time reaches `t`.
    pub fn time(t: f64) -> Self {
        Self {
            max_steps: None,
            max_time: Some(t),
        }
    }

    /// The first bound reached by `steps` and `time`, if any.
    pub fn reached(&self, steps: u64, time: f64) -> Option<StopReason> {
        if self.max_steps.is_some_and(|n| steps >= n) {
            return Some(StopReason::MaxSteps);
        }
        if self.max_time.is_some_and(|t| time >= t) {
            return Some(StopReason::MaxTime);
        }
        None
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps.is_none() && self.max_time.is_none() {
            return Err(ConfigError::InvalidStopCondition {
                reason: "no bound set",
            });
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::InvalidStopCondition {
                reason: "max_steps must be positive",
            });
        }
        if let Some(t) = self.max_time {
            if !t.is_finite() || t <= 0.0 {
                return Err(ConfigError::InvalidStopCondition {
                    reason: "max_time must be finite and positive",
                });
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`SimConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// No carrier would be placed.
    NoCarriers,
    /// A placement references a site that is not in the graph.
    UnknownSite(SiteId),
    /// More carriers of one kind than free bulk sites.
    TooManyCarriers {
        /// Carrier kind.
        kind: CarrierKind,
        /// Carriers requested by random placements.
        requested: usize,
        /// Bulk sites left after explicit placements.
        available: usize,
    },
    /// Two explicit placements put the same kind on one bulk site.
    SiteOccupied {
        /// Carrier kind.
        kind: CarrierKind,
        /// The contested site.
        site: SiteId,
    },
    /// The stop condition is unusable.
    InvalidStopCondition {
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCarriers => write!(f, "no carriers configured"),
            Self::UnknownSite(id) => write!(f, "placement references unknown site {id}"),
            Self::TooManyCarriers {
                kind,
                requested,
                available,
            } => write!(
                f,
                "{requested} {kind} carriers requested but only {available} bulk sites are free"
            ),
            Self::SiteOccupied { kind, site } => {
                write!(f, "site {site} already holds a {kind}")
            }
            Self::InvalidStopCondition { reason } => {
                write!(f, "invalid stop condition: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Seed for the scheduler's random source and for random placement.
    pub seed: u64,
    /// Carrier placements. Carrier ids are assigned in list order.
    pub carriers: Vec<CarrierPlacement>,
    /// When [`Simulation::run`](crate::Simulation::run) stops.
    pub stop: StopCondition,
    /// Record per-site occupation times. Default: `true`.
    pub record_occupation_time: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            carriers: Vec::new(),
            stop: StopCondition::default(),
            record_occupation_time: true,
        }
    }
}

impl SimConfig {
    /// A default configuration with the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Append an explicit placement.
    pub fn with_carrier(mut self, kind: CarrierKind, site: SiteId) -> Self {
        self.carriers.push(CarrierPlacement::Explicit { kind, site });
        self
    }

    /// Append a random placement.
    pub fn with_random_carriers(mut self, kind: CarrierKind, count: usize) -> Self {
        self.carriers.push(CarrierPlacement::Random { kind, count });
        self
    }

    /// Replace the stop condition.
    pub fn with_stop(mut self, stop: StopCondition) -> Self {
        self.stop = stop;
        self
    }

    /// Total number of carriers.
    pub fn carrier_count(&self) -> usize {
        self.carriers.iter().map(CarrierPlacement::count).sum()
    }

    /// Check the configuration against `graph`.
    ///
    /// Checks, in order:
    /// 1. at least one carrier is placed;
    /// 2. every explicit site exists;
    /// 3. no two explicit placements share a kind and a bulk site;
    /// 4. random placements of each kind fit in the remaining bulk sites;
    /// 5. the stop condition has a finite positive bound.
    pub fn validate(&self, graph: &Graph) -> Result<(), ConfigError> {
        if self.carrier_count() == 0 {
            return Err(ConfigError::NoCarriers);
        }

        let mut reserved: [IndexSet<SiteId>; CarrierKind::COUNT] = Default::default();
        for placement in &self.carriers {
            if let CarrierPlacement::Explicit { kind, site } = *placement {
                let Some(s) = graph.try_site(site) else {
                    return Err(ConfigError::UnknownSite(site));
                };
                if !s.is_reservoir() && !reserved[kind.index()].insert(site) {
                    return Err(ConfigError::SiteOccupied { kind, site });
                }
            }
        }

        let bulk = graph.bulk_site_count();
        for kind in CarrierKind::ALL {
            let requested: usize = self
                .carriers
                .iter()
                .filter_map(|p| match *p {
                    CarrierPlacement::Random { kind: k, count } if k == kind => Some(count),
                    _ => None,
                })
                .sum();
            let available = bulk - reserved[kind.index()].len();
            if requested > available {
                return Err(ConfigError::TooManyCarriers {
                    kind,
                    requested,
                    available,
                });
            }
        }

        self.stop.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopkmc_core::Vec3;

    fn three_sites_and_reservoir() -> Graph {
        let mut g = Graph::new();
        for i in 0..3 {
            g.add_site(Vec3::new(i as f64, 0.0, 0.0)).unwrap();
        }
        g.add_reservoir(Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        g
    }

    #[test]
    fn validate_valid_config_succeeds() {
        let g = three_sites_and_reservoir();
        let cfg = SimConfig::seeded(1)
            .with_carrier(CarrierKind::Electron, SiteId(0))
            .with_carrier(CarrierKind::Hole, SiteId(0))
            .with_random_carriers(CarrierKind::Electron, 2);
        assert_eq!(cfg.carrier_count(), 4);
        assert!(cfg.validate(&g).is_ok());
    }

    #[test]
    fn validate_no_carriers_fails() {
        let g = three_sites_and_reservoir();
        assert_eq!(
            SimConfig::default().validate(&g),
            Err(ConfigError::NoCarriers)
        );
        let zero = SimConfig::default().with_random_carriers(CarrierKind::Hole, 0);
        assert_eq!(zero.validate(&g), Err(ConfigError::NoCarriers));
    }

    #[test]
    fn validate_unknown_site_fails() {
        let g = three_sites_and_reservoir();
        let cfg = SimConfig::default().with_carrier(CarrierKind::Electron, SiteId(9));
        assert_eq!(cfg.validate(&g), Err(ConfigError::UnknownSite(SiteId(9))));
    }

    #[test]
    fn validate_shared_bulk_site_fails() {
        let g = three_sites_and_reservoir();
        let cfg = SimConfig::default()
            .with_carrier(CarrierKind::Exciton, SiteId(1))
            .with_carrier(CarrierKind::Exciton, SiteId(1));
        assert_eq!(
            cfg.validate(&g),
            Err(ConfigError::SiteOccupied {
                kind: CarrierKind::Exciton,
                site: SiteId(1)
            })
        );
    }

    #[test]
    fn reservoir_holds_many() {
        let g = three_sites_and_reservoir();
        let cfg = SimConfig::default()
            .with_carrier(CarrierKind::Hole, SiteId(3))
            .with_carrier(CarrierKind::Hole, SiteId(3));
        assert!(cfg.validate(&g).is_ok());
    }

    #[test]
    fn validate_too_many_carriers_fails() {
        let g = three_sites_and_reservoir();
        let cfg = SimConfig::default()
            .with_carrier(CarrierKind::Electron, SiteId(2))
            .with_random_carriers(CarrierKind::Electron, 3);
        assert_eq!(
            cfg.validate(&g),
            Err(ConfigError::TooManyCarriers {
                kind: CarrierKind::Electron,
                requested: 3,
                available: 2
            })
        );
    }

    #[test]
    fn validate_stop_condition() {
        let g = three_sites_and_reservoir();
        let base = SimConfig::default().with_carrier(CarrierKind::Electron, SiteId(0));
        let unbounded = base.clone().with_stop(StopCondition {
            max_steps: None,
            max_time: None,
        });
        assert!(matches!(
            unbounded.validate(&g),
            Err(ConfigError::InvalidStopCondition { .. })
        ));
        for bad in [
            StopCondition::time(f64::NAN),
            StopCondition::time(-1.0),
            StopCondition::steps(0),
        ] {
            assert!(base.clone().with_stop(bad).validate(&g).is_err());
        }
        assert!(base.with_stop(StopCondition::time(5.0)).validate(&g).is_ok());
    }

    #[test]
    fn stop_condition_reached() {
        let both = StopCondition {
            max_steps: Some(10),
            max_time: Some(2.0),
        };
        assert_eq!(both.reached(3, 1.0), None);
        assert_eq!(both.reached(10, 1.0), Some(StopReason::MaxSteps));
        assert_eq!(both.reached(3, 2.5), Some(StopReason::MaxTime));
    }

    #[test]
    fn error_display() {
        let e = ConfigError::TooManyCarriers {
            kind: CarrierKind::Hole,
            requested: 5,
            available: 2,
        };
        assert_eq!(
            e.to_string(),
            "5 hole carriers requested but only 2 bulk sites are free"
        );
    }
}
