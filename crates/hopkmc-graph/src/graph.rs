//! The hopping graph: sites plus directed channels.

use hopkmc_core::{CarrierKind, ChannelId, GraphError, ProcessKind, RateTable, SiteId, Vec3};
use smallvec::{smallvec, SmallVec};

use crate::channel::Channel;
use crate::site::{Site, SiteRole};

/// Owns all sites and channels of one simulation.
///
/// Built by an external loader through [`add_site`](Graph::add_site),
/// [`add_reservoir`](Graph::add_reservoir) and
/// [`add_channel`](Graph::add_channel). There are no removal operations.
///
/// # Examples
///
/// ```
/// use hopkmc_core::{CarrierKind, ProcessKind, RateTable, Vec3};
/// use hopkmc_graph::Graph;
///
/// let mut g = Graph::new();
/// let a = g.add_site(Vec3::new(0.0, 0.0, 0.0)).unwrap();
/// let b = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
/// let rates = RateTable::new().with(ProcessKind::ElectronHop, 2.0);
/// let ab = g.connect(a, b, rates).unwrap();
///
/// assert_eq!(g.channels_from(a).collect::<Vec<_>>(), vec![ab]);
/// assert_eq!(g.channel(ab).displacement(), Vec3::new(1.0, 0.0, 0.0));
/// assert_eq!(g.transfer_processes(CarrierKind::Electron, ab).len(), 1);
/// assert!(g.transfer_processes(CarrierKind::Hole, ab).is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    sites: Vec<Site>,
    channels: Vec<Channel>,
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bulk site at `position`.
    pub fn add_site(&mut self, position: Vec3) -> Result<SiteId, GraphError> {
        self.push_site(position, SiteRole::Bulk)
    }

    /// Add a reservoir (electrode) site at `position`.
    pub fn add_reservoir(&mut self, position: Vec3) -> Result<SiteId, GraphError> {
        self.push_site(position, SiteRole::Reservoir)
    }

    fn push_site(&mut self, position: Vec3, role: SiteRole) -> Result<SiteId, GraphError> {
        if !position.is_finite() {
            return Err(GraphError::NonFiniteVector { what: "position" });
        }
        let id = SiteId(u32::try_from(self.sites.len()).expect("site count exceeds u32::MAX"));
        self.sites.push(Site {
            id,
            position,
            role,
            channels: SmallVec::new(),
        });
        Ok(id)
    }

    /// Add a directed channel with an explicit displacement vector.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either endpoint is unknown, the channel is a
    /// self-loop, both endpoints are reservoirs, the displacement is not
    /// finite, or any rate is negative or non-finite.
    pub fn add_channel(
        &mut self,
        origin: SiteId,
        destination: SiteId,
        displacement: Vec3,
        rates: RateTable,
    ) -> Result<ChannelId, GraphError> {
        let from = self.try_site(origin).ok_or(GraphError::UnknownSite(origin))?;
        let to = self
            .try_site(destination)
            .ok_or(GraphError::UnknownSite(destination))?;
        if origin == destination {
            return Err(GraphError::SelfLoop(origin));
        }
        if from.is_reservoir() && to.is_reservoir() {
            return Err(GraphError::ReservoirLink {
                origin,
                destination,
            });
        }
        if !displacement.is_finite() {
            return Err(GraphError::NonFiniteVector {
                what: "displacement",
            });
        }
        if let Some((process, value)) = rates.first_invalid() {
            return Err(GraphError::InvalidRate {
                origin,
                destination,
                process,
                value,
            });
        }

        let id = ChannelId(
            u32::try_from(self.channels.len()).expect("channel count exceeds u32::MAX"),
        );
        self.channels.push(Channel {
            id,
            origin,
            destination,
            displacement,
            rates,
        });
        self.sites[origin.index()].channels.push(id);
        Ok(id)
    }

    /// Add a directed channel whose displacement is the position difference.
    pub fn connect(
        &mut self,
        origin: SiteId,
        destination: SiteId,
        rates: RateTable,
    ) -> Result<ChannelId, GraphError> {
        let from = self.try_site(origin).ok_or(GraphError::UnknownSite(origin))?;
        let to = self
            .try_site(destination)
            .ok_or(GraphError::UnknownSite(destination))?;
        let displacement = to.position - from.position;
        self.add_channel(origin, destination, displacement, rates)
    }

    /// Look up a site.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this graph.
    pub fn site(&self, id: SiteId) -> &Site {
        match self.sites.get(id.index()) {
            Some(site) => site,
            None => panic!("site {id} does not exist ({} sites)", self.sites.len()),
        }
    }

    /// Look up a site, returning `None` if it does not exist.
    pub fn try_site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.index())
    }

    /// `true` if `id` names a site of this graph.
    pub fn contains(&self, id: SiteId) -> bool {
        id.index() < self.sites.len()
    }

    /// Look up a channel.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this graph.
    pub fn channel(&self, id: ChannelId) -> &Channel {
        match self.channels.get(id.index()) {
            Some(channel) => channel,
            None => panic!(
                "channel {id} does not exist ({} channels)",
                self.channels.len()
            ),
        }
    }

    /// Outgoing channels of `site`, in insertion order.
    pub fn channels_from(&self, site: SiteId) -> impl Iterator<Item = ChannelId> + '_ {
        self.site(site).channels.iter().copied()
    }

    /// All sites in id order.
    pub fn sites(&self) -> impl Iterator<Item = &Site> + '_ {
        self.sites.iter()
    }

    /// All channels in id order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.iter()
    }

    /// Number of sites (bulk and reservoir).
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Number of bulk sites.
    pub fn bulk_site_count(&self) -> usize {
        self.sites.iter().filter(|s| !s.is_reservoir()).count()
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Transfer processes a carrier of `kind` can use on `channel`, with
    /// their rates, in enumeration order.
    ///
    /// - bulk → bulk: the kind's bulk processes
    ///   ([`CarrierKind::bulk_processes`]);
    /// - reservoir → bulk: injection;
    /// - bulk → reservoir: collection, then return.
    ///
    /// Processes with a zero rate are omitted.
    pub fn transfer_processes(
        &self,
        kind: CarrierKind,
        channel: ChannelId,
    ) -> SmallVec<[(ProcessKind, f64); 2]> {
        let ch = self.channel(channel);
        let from = self.site(ch.origin).role;
        let to = self.site(ch.destination).role;
        let candidates: SmallVec<[ProcessKind; 2]> = match (from, to) {
            (SiteRole::Bulk, SiteRole::Bulk) => kind.bulk_processes().iter().copied().collect(),
            (SiteRole::Reservoir, SiteRole::Bulk) => smallvec![ProcessKind::Injection],
            (SiteRole::Bulk, SiteRole::Reservoir) => {
                ProcessKind::INTO_RESERVOIR.iter().copied().collect()
            }
            (SiteRole::Reservoir, SiteRole::Reservoir) => SmallVec::new(),
        };
        candidates
            .into_iter()
            .map(|p| (p, ch.rate(p)))
            .filter(|&(_, r)| r > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(rate: f64) -> RateTable {
        RateTable::new()
            .with(ProcessKind::ElectronHop, rate)
            .with(ProcessKind::HoleHop, rate)
            .with(ProcessKind::Dexter, rate)
            .with(ProcessKind::Forster, rate)
    }

    fn line3() -> (Graph, [SiteId; 3]) {
        let mut g = Graph::new();
        let a = g.add_site(Vec3::new(0.0, 0.0, 0.0)).unwrap();
        let b = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let c = g.add_site(Vec3::new(2.0, 0.0, 0.0)).unwrap();
        (g, [a, b, c])
    }

    #[test]
    fn ids_are_sequential() {
        let (g, [a, b, c]) = line3();
        assert_eq!((a, b, c), (SiteId(0), SiteId(1), SiteId(2)));
        assert_eq!(g.site_count(), 3);
        assert_eq!(g.bulk_site_count(), 3);
        assert!(g.contains(c));
        assert!(!g.contains(SiteId(3)));
    }

    #[test]
    fn channels_from_preserves_insertion_order() {
        let (mut g, [a, b, c]) = line3();
        let ac = g.connect(a, c, hop(1.0)).unwrap();
        let ab = g.connect(a, b, hop(2.0)).unwrap();
        let ba = g.connect(b, a, hop(2.0)).unwrap();
        assert_eq!(g.channels_from(a).collect::<Vec<_>>(), vec![ac, ab]);
        assert_eq!(g.channels_from(b).collect::<Vec<_>>(), vec![ba]);
        assert_eq!(g.channels_from(c).count(), 0);
        assert_eq!(g.channel_count(), 3);
    }

    #[test]
    fn connect_uses_position_difference() {
        let (mut g, [a, _, c]) = line3();
        let ca = g.connect(c, a, hop(1.0)).unwrap();
        assert_eq!(g.channel(ca).displacement(), Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(g.channel(ca).origin(), c);
        assert_eq!(g.channel(ca).destination(), a);
    }

    #[test]
    fn explicit_displacement_is_kept() {
        let (mut g, [a, b, _]) = line3();
        let wrap = Vec3::new(-1.0, 0.0, 0.0);
        let ch = g.add_channel(a, b, wrap, hop(1.0)).unwrap();
        assert_eq!(g.channel(ch).displacement(), wrap);
    }

    #[test]
    fn rejects_unknown_site() {
        let (mut g, [a, _, _]) = line3();
        assert_eq!(
            g.connect(a, SiteId(99), hop(1.0)),
            Err(GraphError::UnknownSite(SiteId(99)))
        );
    }

    #[test]
    fn rejects_self_loop() {
        let (mut g, [a, _, _]) = line3();
        assert_eq!(g.connect(a, a, hop(1.0)), Err(GraphError::SelfLoop(a)));
    }

    #[test]
    fn rejects_negative_rate() {
        let (mut g, [a, b, _]) = line3();
        let bad = RateTable::new().with(ProcessKind::HoleHop, -0.5);
        match g.connect(a, b, bad) {
            Err(GraphError::InvalidRate { process, .. }) => {
                assert_eq!(process, ProcessKind::HoleHop)
            }
            other => panic!("expected InvalidRate, got {other:?}"),
        }
        assert_eq!(g.channel_count(), 0);
    }

    #[test]
    fn rejects_non_finite_position() {
        let mut g = Graph::new();
        assert!(matches!(
            g.add_site(Vec3::new(f64::NAN, 0.0, 0.0)),
            Err(GraphError::NonFiniteVector { .. })
        ));
    }

    #[test]
    fn rejects_reservoir_to_reservoir() {
        let mut g = Graph::new();
        let l = g.add_reservoir(Vec3::ZERO).unwrap();
        let r = g.add_reservoir(Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert!(matches!(
            g.connect(l, r, hop(1.0)),
            Err(GraphError::ReservoirLink { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn site_lookup_of_unknown_id_panics() {
        let (g, _) = line3();
        let _ = g.site(SiteId(17));
    }

    #[test]
    fn bulk_processes_per_kind() {
        let (mut g, [a, b, _]) = line3();
        let ab = g.connect(a, b, hop(1.5)).unwrap();
        let e = g.transfer_processes(CarrierKind::Electron, ab);
        assert_eq!(e.as_slice(), &[(ProcessKind::ElectronHop, 1.5)]);
        let x = g.transfer_processes(CarrierKind::Exciton, ab);
        assert_eq!(
            x.as_slice(),
            &[(ProcessKind::Dexter, 1.5), (ProcessKind::Forster, 1.5)]
        );
    }

    #[test]
    fn zero_rates_are_skipped() {
        let (mut g, [a, b, _]) = line3();
        let ab = g
            .connect(a, b, RateTable::new().with(ProcessKind::Forster, 0.3))
            .unwrap();
        let x = g.transfer_processes(CarrierKind::Exciton, ab);
        assert_eq!(x.as_slice(), &[(ProcessKind::Forster, 0.3)]);
        assert!(g.transfer_processes(CarrierKind::Electron, ab).is_empty());
    }

    #[test]
    fn boundary_processes_follow_site_roles() {
        let mut g = Graph::new();
        let src = g.add_reservoir(Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let s = g.add_site(Vec3::ZERO).unwrap();
        let rates = hop(1.0)
            .with(ProcessKind::Injection, 4.0)
            .with(ProcessKind::Collection, 3.0)
            .with(ProcessKind::Return, 0.5);
        let inj = g.connect(src, s, rates).unwrap();
        let out = g.connect(s, src, rates).unwrap();

        assert_eq!(
            g.transfer_processes(CarrierKind::Hole, inj).as_slice(),
            &[(ProcessKind::Injection, 4.0)]
        );
        assert_eq!(
            g.transfer_processes(CarrierKind::Hole, out).as_slice(),
            &[(ProcessKind::Collection, 3.0), (ProcessKind::Return, 0.5)]
        );
        assert!(g.site(src).is_reservoir());
        assert_eq!(g.bulk_site_count(), 1);
    }
}
