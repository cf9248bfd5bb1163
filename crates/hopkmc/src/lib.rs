//! hopkmc: kinetic Monte Carlo of electrons, holes, and excitons hopping
//! on a site graph.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all hopkmc sub-crates. For most users, adding `hopkmc` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hopkmc::prelude::*;
//!
//! // Three sites in a row, electrons hopping both ways at rate 1.
//! let mut graph = Graph::new();
//! let sites: Vec<SiteId> = (0..3)
//!     .map(|i| graph.add_site(Vec3::new(i as f64, 0.0, 0.0)).unwrap())
//!     .collect();
//! let rates = RateTable::new().with(ProcessKind::ElectronHop, 1.0);
//! for w in sites.windows(2) {
//!     graph.connect(w[0], w[1], rates).unwrap();
//!     graph.connect(w[1], w[0], rates).unwrap();
//! }
//!
//! let config = SimConfig::seeded(42)
//!     .with_carrier(CarrierKind::Electron, sites[0])
//!     .with_stop(StopCondition::steps(100));
//! let mut sim = Simulation::new(graph, config).unwrap();
//! let mut recorder = TrajectoryRecorder::new();
//! let summary = sim.run(&mut recorder).unwrap();
//! assert_eq!(summary.steps, 100);
//! assert_eq!(recorder.len(), 100);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hopkmc-core` | IDs, kinds, rate tables, hop records, errors |
//! | [`graph`] | `hopkmc-graph` | Sites, channels, and occupancy |
//! | [`engine`] | `hopkmc-engine` | Event tree, scheduler, and simulation driver |
//! | [`replay`] | `hopkmc-replay` | Trajectory hashing and replay comparison |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`hopkmc-core`).
///
/// Carrier and process kinds, [`types::RateTable`], [`types::HopRecord`],
/// and the error types shared by every crate.
pub use hopkmc_core as types;

/// The site graph (`hopkmc-graph`).
///
/// [`graph::Graph`] holds sites and directed channels;
/// [`graph::Occupancy`] tracks which bulk sites hold a carrier of each kind.
pub use hopkmc_graph as graph;

/// The VSSM engine (`hopkmc-engine`).
///
/// [`engine::Simulation`] drives the event tree. Hops are reported to a
/// [`engine::HopObserver`].
pub use hopkmc_engine as engine;

/// Trajectory hashing and replay comparison (`hopkmc-replay`).
pub use hopkmc_replay as replay;

/// Common imports for typical hopkmc usage.
///
/// ```rust
/// use hopkmc::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use hopkmc_core::{
        CarrierId, CarrierKind, ChannelId, HopRecord, ProcessKind, RateTable, SiteId, Vec3,
    };

    // Errors
    pub use hopkmc_core::{GraphError, StepError};
    pub use hopkmc_engine::{ConfigError, InvariantViolation};

    // Graph
    pub use hopkmc_graph::{Graph, Occupancy};

    // Engine
    pub use hopkmc_engine::{
        CarrierPlacement, ChannelSink, HopObserver, NoopObserver, RunSummary, SimConfig,
        Simulation, StepOutcome, StopCondition, TrajectoryRecorder,
    };

    // Replay
    pub use hopkmc_replay::{compare_trajectories, trajectory_hash, TrajectoryHasher};
}
