//! Per-site occupation-time accumulators.
//!
//! Before every hop the waiting time `dt` is credited to each bulk site
//! currently holding a carrier, separately per kind. Dividing by the
//! elapsed time gives the site's occupation probability. The engine
//! never reads these values; they exist for reporting.

use hopkmc_core::{CarrierKind, SiteId};
use hopkmc_graph::Occupancy;

/// Accumulated occupied time per (kind, site).
#[derive(Clone, Debug)]
pub struct OccupationTimes {
    enabled: bool,
    site_count: usize,
    times: [Vec<f64>; CarrierKind::COUNT],
    elapsed: f64,
}

impl OccupationTimes {
    /// Accumulators for `site_count` sites. When `enabled` is `false`,
    /// [`accumulate`](Self::accumulate) only tracks the elapsed time.
    pub fn new(site_count: usize, enabled: bool) -> Self {
        let alloc = || if enabled { vec![0.0; site_count] } else { Vec::new() };
        Self {
            enabled,
            site_count,
            times: [alloc(), alloc(), alloc()],
            elapsed: 0.0,
        }
    }

    /// Whether per-site times are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Credit `dt` to every site in `occupancy`.
    pub fn accumulate(&mut self, occupancy: &Occupancy, dt: f64) {
        self.elapsed += dt;
        if !self.enabled {
            return;
        }
        for kind in CarrierKind::ALL {
            let times = &mut self.times[kind.index()];
            for site in occupancy.map(kind).iter() {
                times[site.index()] += dt;
            }
        }
    }

    /// Total time credited to `site` for `kind`. Zero when disabled.
    pub fn time(&self, kind: CarrierKind, site: SiteId) -> f64 {
        self.times[kind.index()]
            .get(site.index())
            .copied()
            .unwrap_or(0.0)
    }

    /// Every site's accumulated time for `kind`, indexed by site id.
    /// Empty when disabled.
    pub fn times(&self, kind: CarrierKind) -> &[f64] {
        &self.times[kind.index()]
    }

    /// Fraction of the elapsed time `site` held a carrier of `kind`.
    pub fn probability(&self, kind: CarrierKind, site: SiteId) -> f64 {
        if self.elapsed > 0.0 {
            self.time(kind, site) / self.elapsed
        } else {
            0.0
        }
    }

    /// Total simulated time accumulated.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.site_count, self.enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credits_only_occupied_sites() {
        let mut occ = Occupancy::new();
        occ.occupy(CarrierKind::Electron, SiteId(1));
        occ.occupy(CarrierKind::Exciton, SiteId(2));
        let mut t = OccupationTimes::new(3, true);
        t.accumulate(&occ, 0.5);
        occ.vacate(CarrierKind::Electron, SiteId(1));
        occ.occupy(CarrierKind::Electron, SiteId(0));
        t.accumulate(&occ, 1.5);

        assert_eq!(t.elapsed(), 2.0);
        assert_eq!(t.times(CarrierKind::Electron), &[1.5, 0.5, 0.0]);
        assert_eq!(t.time(CarrierKind::Exciton, SiteId(2)), 2.0);
        assert_eq!(t.probability(CarrierKind::Electron, SiteId(0)), 0.75);
        assert_eq!(t.time(CarrierKind::Hole, SiteId(0)), 0.0);
    }

    #[test]
    fn disabled_tracks_elapsed_only() {
        let mut occ = Occupancy::new();
        occ.occupy(CarrierKind::Hole, SiteId(0));
        let mut t = OccupationTimes::new(4, false);
        t.accumulate(&occ, 1.0);
        assert_eq!(t.elapsed(), 1.0);
        assert!(t.times(CarrierKind::Hole).is_empty());
        assert_eq!(t.probability(CarrierKind::Hole, SiteId(0)), 0.0);
    }

    #[test]
    fn probability_before_any_time_is_zero() {
        let t = OccupationTimes::new(2, true);
        assert_eq!(t.probability(CarrierKind::Electron, SiteId(0)), 0.0);
    }
}
