//! Carriers: electrons, holes, and excitons moving across the graph.

use hopkmc_core::{CarrierId, CarrierKind, ProcessKind, SiteId, Vec3};
use hopkmc_graph::{Channel, Graph, Occupancy};

/// Mutable record of one transport entity.
///
/// A carrier always sits on exactly one site. Its site changes only
/// through [`try_move`](Carrier::try_move), which is the sole gate for
/// the exclusion principle.
#[derive(Clone, Debug)]
pub struct Carrier {
    id: CarrierId,
    kind: CarrierKind,
    site: SiteId,
    start: SiteId,
    displacement: Vec3,
    hops: u64,
    injections: u64,
    collections: u64,
}

impl Carrier {
    pub(crate) fn new(id: CarrierId, kind: CarrierKind, site: SiteId) -> Self {
        Self {
            id,
            kind,
            site,
            start: site,
            displacement: Vec3::ZERO,
            hops: 0,
            injections: 0,
            collections: 0,
        }
    }

    /// This carrier's id.
    pub fn id(&self) -> CarrierId {
        self.id
    }

    /// Electron, hole, or exciton.
    pub fn kind(&self) -> CarrierKind {
        self.kind
    }

    /// The site the carrier currently occupies.
    pub fn current_site(&self) -> SiteId {
        self.site
    }

    /// The site the carrier was placed on.
    pub fn start_site(&self) -> SiteId {
        self.start
    }

    /// Sum of the displacements of every channel traversed.
    pub fn displacement(&self) -> Vec3 {
        self.displacement
    }

    /// Number of successful hops.
    pub fn hops(&self) -> u64 {
        self.hops
    }

    /// Number of injections out of a reservoir.
    pub fn injections(&self) -> u64 {
        self.injections
    }

    /// Number of collections into a reservoir.
    pub fn collections(&self) -> u64 {
        self.collections
    }

    /// Whether a carrier of this kind may enter `destination` right now.
    ///
    /// Reservoirs accept any number of carriers; bulk sites accept one
    /// carrier per kind.
    pub fn can_enter(&self, graph: &Graph, occupancy: &Occupancy, destination: SiteId) -> bool {
        graph.site(destination).is_reservoir() || !occupancy.is_occupied(self.kind, destination)
    }

    /// Attempt to traverse `channel` using `process`.
    ///
    /// On success, vacates the origin, occupies the destination,
    /// accumulates the channel displacement, and returns `true`. If the
    /// destination is occupied by a carrier of the same kind, nothing
    /// changes and `false` is returned.
    ///
    /// # Panics
    ///
    /// Panics if the carrier is not on the channel's origin.
    pub fn try_move(
        &mut self,
        graph: &Graph,
        channel: &Channel,
        process: ProcessKind,
        occupancy: &mut Occupancy,
    ) -> bool {
        assert_eq!(
            channel.origin(),
            self.site,
            "carrier {} on {} cannot use channel {} from {}",
            self.id,
            self.site,
            channel.id(),
            channel.origin(),
        );
        let destination = channel.destination();
        if !self.can_enter(graph, occupancy, destination) {
            return false;
        }

        if !graph.site(self.site).is_reservoir() {
            occupancy.vacate(self.kind, self.site);
        }
        if !graph.site(destination).is_reservoir() {
            occupancy.occupy(self.kind, destination);
        }
        self.site = destination;
        self.displacement += channel.displacement();
        self.hops += 1;
        match process {
            ProcessKind::Injection => self.injections += 1,
            ProcessKind::Collection => self.collections += 1,
            _ => {}
        }
        true
    }

    pub(crate) fn reset_to_start(&mut self) {
        self.site = self.start;
        self.displacement = Vec3::ZERO;
        self.hops = 0;
        self.injections = 0;
        self.collections = 0;
    }
}
