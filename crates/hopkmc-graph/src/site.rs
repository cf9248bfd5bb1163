//! Sites: the discrete locations carriers hop between.

use hopkmc_core::{ChannelId, SiteId, Vec3};
use smallvec::SmallVec;

/// Whether a site obeys the exclusion principle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiteRole {
    /// Ordinary site: at most one carrier of each kind.
    Bulk,
    /// Electrode/reservoir: unlimited capacity, source of injections
    /// and sink of collections.
    Reservoir,
}

/// A site in the hopping graph.
///
/// Outgoing channels are kept in insertion order. That order is the
/// enumeration order of the transfer events created for the site.
#[derive(Clone, Debug)]
pub struct Site {
    pub(crate) id: SiteId,
    pub(crate) position: Vec3,
    pub(crate) role: SiteRole,
    pub(crate) channels: SmallVec<[ChannelId; 8]>,
}

impl Site {
    /// This site's id.
    pub fn id(&self) -> SiteId {
        self.id
    }

    /// Spatial position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Bulk or reservoir.
    pub fn role(&self) -> SiteRole {
        self.role
    }

    /// `true` for reservoir sites.
    pub fn is_reservoir(&self) -> bool {
        self.role == SiteRole::Reservoir
    }

    /// Outgoing channels in insertion order.
    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }
}
