//! Directed transfer channels between two sites.

use hopkmc_core::{ChannelId, ProcessKind, RateTable, SiteId, Vec3};

/// A directed, rated possible hop `origin → destination`.
///
/// The displacement is stored rather than derived from positions so that
/// periodic boundaries can carry the minimum-image vector.
#[derive(Clone, Debug)]
pub struct Channel {
    pub(crate) id: ChannelId,
    pub(crate) origin: SiteId,
    pub(crate) destination: SiteId,
    pub(crate) displacement: Vec3,
    pub(crate) rates: RateTable,
}

impl Channel {
    /// This channel's id.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Site the hop starts from.
    pub fn origin(&self) -> SiteId {
        self.origin
    }

    /// Site the hop ends at.
    pub fn destination(&self) -> SiteId {
        self.destination
    }

    /// Vector added to a carrier's accumulated displacement on traversal.
    pub fn displacement(&self) -> Vec3 {
        self.displacement
    }

    /// All per-process rates.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Rate of a single process.
    pub fn rate(&self, process: ProcessKind) -> f64 {
        self.rates.get(process)
    }
}
