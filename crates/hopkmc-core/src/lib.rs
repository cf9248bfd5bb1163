//! Core types for the hopkmc kinetic Monte Carlo engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the graph, engine, and replay crates:
//! typed identifiers, carrier and process kinds, rate tables,
//! displacement vectors, hop records, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod kind;
pub mod rate;
pub mod record;
pub mod vector;

pub use error::{GraphError, StepError};
pub use id::{CarrierId, ChannelId, SiteId};
pub use kind::{CarrierKind, ProcessKind};
pub use rate::RateTable;
pub use record::HopRecord;
pub use vector::Vec3;
