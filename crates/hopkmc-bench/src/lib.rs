//! Benchmark profiles for the hopkmc engine.
//!
//! Provides pre-built graph and configuration pairs:
//!
//! - [`reference_profile`]: 100x100 lattice (10K sites), all three kinds at 10% fill
//! - [`stress_profile`]: 316x316 lattice (~100K sites) at the same fill
//! - [`crowded_profile`]: 100x100 lattice with 90% of sites holding an electron

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hopkmc_core::CarrierKind;
use hopkmc_engine::{SimConfig, StopCondition};
use hopkmc_graph::Graph;
use hopkmc_test_utils::square_lattice;

/// A benchmark input: the graph and the configuration to run on it.
pub type Profile = (Graph, SimConfig);

fn lattice_profile(side: usize, seed: u64, fill: [f64; CarrierKind::COUNT]) -> Profile {
    let graph = square_lattice(side, side, 1.0);
    let sites = side * side;
    let mut config = SimConfig::seeded(seed).with_stop(StopCondition::steps(10_000));
    for kind in CarrierKind::ALL {
        let count = (sites as f64 * fill[kind.index()]) as usize;
        if count > 0 {
            config = config.with_random_carriers(kind, count);
        }
    }
    (graph, config)
}

/// 100x100 lattice with 1000 electrons, 1000 holes, and 1000 excitons.
pub fn reference_profile(seed: u64) -> Profile {
    lattice_profile(100, seed, [0.1, 0.1, 0.1])
}

/// 316x316 lattice at the reference fill: ~10K carriers of each kind.
pub fn stress_profile(seed: u64) -> Profile {
    lattice_profile(316, seed, [0.1, 0.1, 0.1])
}

/// 100x100 lattice crowded with electrons, so most selections contend.
pub fn crowded_profile(seed: u64) -> Profile {
    lattice_profile(100, seed, [0.9, 0.0, 0.0])
}
