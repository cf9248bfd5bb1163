//! Site/channel graph and occupancy maps for hopkmc.
//!
//! The [`Graph`] owns every [`Site`] and [`Channel`] of a simulation.
//! It is built once by an external loader and is immutable while the
//! engine runs. [`Occupancy`] holds one [`OccupancyMap`] per carrier
//! kind and is the single source of truth for the exclusion principle.
//!
//! # Site roles
//!
//! - [`SiteRole::Bulk`]: at most one carrier of each kind.
//! - [`SiteRole::Reservoir`]: an electrode holding any number of carriers.
//!   Reservoirs never appear in an occupancy map.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod graph;
pub mod occupancy;
pub mod site;

pub use channel::Channel;
pub use graph::Graph;
pub use occupancy::{Occupancy, OccupancyMap};
pub use site::{Site, SiteRole};
