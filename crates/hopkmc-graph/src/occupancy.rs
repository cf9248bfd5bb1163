//! Per-kind occupancy maps enforcing the exclusion principle.
//!
//! One [`OccupancyMap`] exists per carrier kind per simulation. The maps
//! are owned by the simulation and threaded through every move; nothing
//! here is process-global, so independent simulations never interact.

use hopkmc_core::{CarrierKind, SiteId};
use indexmap::IndexSet;

/// The set of bulk sites currently occupied by carriers of one kind.
///
/// Backed by an [`IndexSet`] for O(1) expected lookup with a
/// deterministic iteration order.
#[derive(Clone, Debug, Default)]
pub struct OccupancyMap {
    sites: IndexSet<SiteId>,
}

impl OccupancyMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `site` is occupied.
    #[inline]
    pub fn is_occupied(&self, site: SiteId) -> bool {
        self.sites.contains(&site)
    }

    /// Mark `site` as occupied.
    ///
    /// # Panics
    ///
    /// Panics if `site` is already occupied: two carriers of one kind on
    /// a single site means the event tree let an illegal hop through.
    pub fn occupy(&mut self, site: SiteId) {
        if !self.sites.insert(site) {
            panic!("exclusion violated: site {site} is already occupied");
        }
    }

    /// Mark `site` as free.
    ///
    /// # Panics
    ///
    /// Panics if `site` was not occupied.
    pub fn vacate(&mut self, site: SiteId) {
        if !self.sites.swap_remove(&site) {
            panic!("vacating site {site} which is not occupied");
        }
    }

    /// Number of occupied sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// `true` if no site is occupied.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Occupied sites. Order is deterministic but not sorted.
    pub fn iter(&self) -> impl Iterator<Item = SiteId> + '_ {
        self.sites.iter().copied()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.sites.clear();
    }
}

/// One [`OccupancyMap`] per [`CarrierKind`].
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    maps: [OccupancyMap; CarrierKind::COUNT],
}

impl Occupancy {
    /// Empty maps for every kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `site` holds a carrier of `kind`.
    #[inline]
    pub fn is_occupied(&self, kind: CarrierKind, site: SiteId) -> bool {
        self.maps[kind.index()].is_occupied(site)
    }

    /// Mark `site` as occupied by `kind`. Panics if already occupied.
    pub fn occupy(&mut self, kind: CarrierKind, site: SiteId) {
        self.maps[kind.index()].occupy(site);
    }

    /// Mark `site` as free of `kind`. Panics if it was free.
    pub fn vacate(&mut self, kind: CarrierKind, site: SiteId) {
        self.maps[kind.index()].vacate(site);
    }

    /// The map for one kind.
    pub fn map(&self, kind: CarrierKind) -> &OccupancyMap {
        &self.maps[kind.index()]
    }

    /// Clear every map.
    pub fn clear(&mut self) {
        for map in &mut self.maps {
            map.clear();
        }
    }
}
