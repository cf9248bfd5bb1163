//! Deterministic replay verification for hopkmc simulations.
//!
//! A simulation driven by the same seed (or the same scripted uniform
//! draws) must produce the same hops, bit for bit. This crate hashes
//! trajectories of [`HopRecord`](hopkmc_core::HopRecord)s and locates the
//! first divergence between two runs.
//!
//! # Architecture
//!
//! - [`trajectory_hash`] and [`TrajectoryHasher`] hash a trajectory with FNV-1a
//! - [`compare_trajectories`] finds the first differing hop of two recordings
//! - [`replay_and_compare`] checks a live replay against a recording

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
pub mod hash;

pub use compare::{
    compare_trajectories, diff_records, replay_and_compare, DivergenceReport, DivergentField,
};
pub use error::ReplayError;
pub use hash::{record_hash, trajectory_hash, TrajectoryHasher};
