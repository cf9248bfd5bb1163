//! Test utilities for hopkmc development.
//!
//! Provides small, well-known hopping graphs ([`fixtures`]) shared by
//! the engine's unit, integration, and property tests, the replay
//! tests, and the benches.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    biased_line, electrode_chain, isolated_site, line, pair, ring, square_lattice, star_abc,
    uniform_rates, ElectrodeChain,
};
