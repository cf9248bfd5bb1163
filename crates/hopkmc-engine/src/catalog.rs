//! Transfer-event slots and re-validation lists.
//!
//! A slot is the ordered set of transfer events usable from one site by
//! one carrier kind. Bulk slots are shared by whichever carrier of that
//! kind currently sits on the site (there is at most one). Reservoir
//! slots are private to a single carrier, since reservoirs hold many.
//!
//! The inbound list of `(kind, site)` names every transfer event whose
//! destination is that bulk site. When a carrier of `kind` vacates the
//! site, exactly these events are re-validated.

use hopkmc_core::{CarrierId, CarrierKind, SiteId};
use hopkmc_graph::Graph;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::arena::EventArena;
use crate::event::{EventHandle, TransferEvent};

/// Key of a transfer-event slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SlotKey {
    pub(crate) kind: CarrierKind,
    pub(crate) site: SiteId,
    pub(crate) owner: Option<CarrierId>,
}

impl SlotKey {
    /// Slot used by `carrier` of `kind` standing on `site`.
    pub(crate) fn for_carrier(
        graph: &Graph,
        kind: CarrierKind,
        site: SiteId,
        carrier: CarrierId,
    ) -> Self {
        let owner = graph.site(site).is_reservoir().then_some(carrier);
        Self { kind, site, owner }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TransferCatalog {
    slots: IndexMap<SlotKey, SmallVec<[EventHandle; 8]>>,
    inbound: IndexMap<(CarrierKind, SiteId), Vec<EventHandle>>,
}

impl TransferCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the slot for `key`, allocating its transfer events on
    /// first use.
    pub(crate) fn ensure_slot(
        &mut self,
        arena: &mut EventArena,
        graph: &Graph,
        key: SlotKey,
    ) -> &[EventHandle] {
        if !self.slots.contains_key(&key) {
            let mut set = SmallVec::new();
            for channel in graph.channels_from(key.site) {
                let destination = graph.channel(channel).destination();
                for (process, rate) in graph.transfer_processes(key.kind, channel) {
                    let h = arena.push_transfer(TransferEvent::new(
                        key.kind,
                        channel,
                        process,
                        key.site,
                        destination,
                        rate,
                    ));
                    set.push(h);
                    if !graph.site(destination).is_reservoir() {
                        self.inbound
                            .entry((key.kind, destination))
                            .or_default()
                            .push(h);
                    }
                }
            }
            self.slots.insert(key, set);
        }
        &self.slots[&key]
    }

    pub(crate) fn slot(&self, key: &SlotKey) -> Option<&[EventHandle]> {
        self.slots.get(key).map(|s| s.as_slice())
    }

    /// Transfer events of `kind` that lead into `site`.
    pub(crate) fn inbound(&self, kind: CarrierKind, site: SiteId) -> &[EventHandle] {
        self.inbound
            .get(&(kind, site))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopkmc_core::{ProcessKind, RateTable, Vec3};

    fn star() -> (Graph, [SiteId; 4]) {
        let mut g = Graph::new();
        let a = g.add_site(Vec3::ZERO).unwrap();
        let b = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let c = g.add_site(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let r = g.add_reservoir(Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let hop = RateTable::new()
            .with(ProcessKind::ElectronHop, 1.0)
            .with(ProcessKind::Dexter, 1.0)
            .with(ProcessKind::Forster, 2.0)
            .with(ProcessKind::Injection, 3.0)
            .with(ProcessKind::Collection, 4.0);
        g.connect(a, b, hop).unwrap();
        g.connect(a, c, hop).unwrap();
        g.connect(b, a, hop).unwrap();
        g.connect(r, a, hop).unwrap();
        g.connect(c, r, hop).unwrap();
        (g, [a, b, c, r])
    }

    #[test]
    fn bulk_slot_is_shared_and_lazy() {
        let (g, [a, _, _, _]) = star();
        let mut arena = EventArena::new();
        let mut cat = TransferCatalog::new();
        let k0 = SlotKey::for_carrier(&g, CarrierKind::Electron, a, CarrierId(0));
        let k1 = SlotKey::for_carrier(&g, CarrierKind::Electron, a, CarrierId(1));
        assert_eq!(k0, k1);
        let first = cat.ensure_slot(&mut arena, &g, k0).to_vec();
        let again = cat.ensure_slot(&mut arena, &g, k1).to_vec();
        assert_eq!(first, again);
        assert_eq!(first.len(), 2);
        assert_eq!(cat.slot_count(), 1);
    }

    #[test]
    fn exciton_slot_has_one_event_per_process() {
        let (g, [a, b, c, _]) = star();
        let mut arena = EventArena::new();
        let mut cat = TransferCatalog::new();
        let key = SlotKey::for_carrier(&g, CarrierKind::Exciton, a, CarrierId(0));
        let set = cat.ensure_slot(&mut arena, &g, key).to_vec();
        let described: Vec<_> = set
            .iter()
            .map(|&h| {
                let t = arena.transfer(h);
                (t.destination(), t.process(), t.base_rate())
            })
            .collect();
        assert_eq!(
            described,
            vec![
                (b, ProcessKind::Dexter, 1.0),
                (b, ProcessKind::Forster, 2.0),
                (c, ProcessKind::Dexter, 1.0),
                (c, ProcessKind::Forster, 2.0),
            ]
        );
    }

    #[test]
    fn reservoir_slots_are_per_carrier() {
        let (g, [_, _, _, r]) = star();
        let mut arena = EventArena::new();
        let mut cat = TransferCatalog::new();
        let k0 = SlotKey::for_carrier(&g, CarrierKind::Electron, r, CarrierId(0));
        let k1 = SlotKey::for_carrier(&g, CarrierKind::Electron, r, CarrierId(1));
        assert_ne!(k0, k1);
        let s0 = cat.ensure_slot(&mut arena, &g, k0).to_vec();
        let s1 = cat.ensure_slot(&mut arena, &g, k1).to_vec();
        assert_eq!(s0.len(), 1);
        assert_eq!(s1.len(), 1);
        assert_ne!(s0, s1);
        assert_eq!(arena.transfer(s0[0]).process(), ProcessKind::Injection);
    }

    #[test]
    fn inbound_lists_cover_every_slot_including_boundary() {
        let (g, [a, b, c, r]) = star();
        let mut arena = EventArena::new();
        let mut cat = TransferCatalog::new();
        for site in [a, b, c] {
            let key = SlotKey::for_carrier(&g, CarrierKind::Electron, site, CarrierId(0));
            cat.ensure_slot(&mut arena, &g, key);
        }
        let key = SlotKey::for_carrier(&g, CarrierKind::Electron, r, CarrierId(0));
        cat.ensure_slot(&mut arena, &g, key);

        // b -> a and the injection r -> a both lead into a.
        let into_a: Vec<_> = cat
            .inbound(CarrierKind::Electron, a)
            .iter()
            .map(|&h| arena.transfer(h).origin())
            .collect();
        assert_eq!(into_a, vec![b, r]);
        assert_eq!(cat.inbound(CarrierKind::Electron, b).len(), 1);
        // Reservoir destinations never need re-validation.
        assert!(cat.inbound(CarrierKind::Electron, r).is_empty());
        assert!(cat.inbound(CarrierKind::Hole, a).is_empty());
    }
}
