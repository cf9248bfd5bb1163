//! VSSM scheduling engine for hopkmc.
//!
//! Carriers (electrons, holes, excitons) hop between the sites of a
//! [`Graph`](hopkmc_graph::Graph) under an exclusion principle: at most
//! one carrier of each kind per bulk site. The engine keeps a three-level
//! event tree (head, one escape per carrier, one transfer per usable
//! channel and process) and advances it with the variable step size
//! method: an exponential waiting time drawn from the total rate, then a
//! rate-weighted descent to pick the transfer to execute.
//!
//! Hops into an occupied site are not rejected up front. The selected
//! transfer is attempted; if the destination turns out to be occupied it
//! becomes *unavailable* and stops contributing rate until a carrier of
//! the same kind leaves that destination.
//!
//! Start with [`Simulation`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod carrier;
mod catalog;
pub mod config;
pub mod event;
pub mod invariants;
pub mod metrics;
pub mod observer;
pub mod occupation;
mod placement;
pub mod scheduler;
pub mod simulation;
mod tree;

pub use arena::EventArena;
pub use carrier::Carrier;
pub use config::{CarrierPlacement, ConfigError, SimConfig, StopCondition, StopReason};
pub use event::{Event, EventHandle, TransferState};
pub use invariants::InvariantViolation;
pub use metrics::RunMetrics;
pub use observer::{ChannelSink, HopObserver, NoopObserver, TrajectoryRecorder};
pub use occupation::OccupationTimes;
pub use scheduler::{Scheduler, ScriptedUniforms, UniformSource};
pub use simulation::{RunSummary, Simulation, StepOutcome};
