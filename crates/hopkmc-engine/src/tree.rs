//! Event-tree maintenance: building the tree and executing transfers.

use hopkmc_core::{CarrierId, CarrierKind, ChannelId, ProcessKind, SiteId};
use hopkmc_graph::{Graph, Occupancy};
use smallvec::SmallVec;

use crate::arena::EventArena;
use crate::carrier::Carrier;
use crate::catalog::{SlotKey, TransferCatalog};
use crate::event::EventHandle;

/// Result of executing one selected transfer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Execution {
    /// The carrier moved and the tree was rewired.
    Moved {
        carrier: CarrierId,
        origin: SiteId,
        destination: SiteId,
        channel: ChannelId,
        process: ProcessKind,
        revalidated: usize,
    },
    /// The destination was occupied; the event is now unavailable.
    Contended {
        carrier: CarrierId,
        channel: ChannelId,
        process: ProcessKind,
    },
}

/// Arena, slot catalog, and the escape handle of every carrier.
#[derive(Clone, Debug)]
pub(crate) struct EventTree {
    pub(crate) arena: EventArena,
    pub(crate) catalog: TransferCatalog,
    /// Indexed by carrier id.
    pub(crate) escapes: Vec<EventHandle>,
}

impl EventTree {
    /// Build the tree for carriers already placed on `graph`.
    ///
    /// Bulk slots are allocated up front for every kind present, so the
    /// inbound list of every bulk site is complete before the first
    /// step. Reservoir slots are allocated when first visited.
    pub(crate) fn build(graph: &Graph, carriers: &[Carrier]) -> Self {
        let mut arena = EventArena::new();
        let mut catalog = TransferCatalog::new();

        for kind in CarrierKind::ALL {
            if !carriers.iter().any(|c| c.kind() == kind) {
                continue;
            }
            for site in graph.sites().filter(|s| !s.is_reservoir()) {
                let key = SlotKey {
                    kind,
                    site: site.id(),
                    owner: None,
                };
                catalog.ensure_slot(&mut arena, graph, key);
            }
        }

        let mut escapes = Vec::with_capacity(carriers.len());
        for carrier in carriers {
            let escape = arena.push_escape(carrier.id(), carrier.kind());
            let key =
                SlotKey::for_carrier(graph, carrier.kind(), carrier.current_site(), carrier.id());
            let slot = catalog.ensure_slot(&mut arena, graph, key);
            arena.bind(escape, slot);
            escapes.push(escape);
        }

        Self {
            arena,
            catalog,
            escapes,
        }
    }

    /// Escape event of `carrier`.
    pub(crate) fn escape_of(&self, carrier: CarrierId) -> EventHandle {
        self.escapes[carrier.index()]
    }

    /// Execute `transfer`.
    ///
    /// On success the carrier's escape is rebound to the slot at the new
    /// site and every event leading into the vacated origin is
    /// re-validated. On contention the event is marked unavailable and
    /// nothing else changes.
    ///
    /// # Panics
    ///
    /// Panics if `transfer` is not bound to a carrier.
    pub(crate) fn execute(
        &mut self,
        transfer: EventHandle,
        graph: &Graph,
        occupancy: &mut Occupancy,
        carriers: &mut [Carrier],
    ) -> Execution {
        let t = self.arena.transfer(transfer);
        let Some(id) = t.carrier() else {
            panic!("executing unbound transfer event {transfer}");
        };
        let (channel, process) = (t.channel(), t.process());
        let carrier = &mut carriers[id.index()];
        let origin = carrier.current_site();

        if !carrier.try_move(graph, graph.channel(channel), process, occupancy) {
            self.arena.mark_unavailable(transfer);
            tracing::debug!(
                carrier = %id,
                %channel,
                %process,
                destination = %graph.channel(channel).destination(),
                "hop contended, transfer event unavailable"
            );
            return Execution::Contended {
                carrier: id,
                channel,
                process,
            };
        }

        let kind = carrier.kind();
        let destination = carrier.current_site();
        let escape = self.escapes[id.index()];

        self.arena.unbind_all(escape);
        let key = SlotKey::for_carrier(graph, kind, destination, id);
        let slot = self.catalog.ensure_slot(&mut self.arena, graph, key);
        self.arena.bind(escape, slot);

        let mut revalidated = 0;
        if !graph.site(origin).is_reservoir() {
            let mut touched: SmallVec<[EventHandle; 8]> = SmallVec::new();
            for &h in self.catalog.inbound(kind, origin) {
                if self.arena.revalidate(h) {
                    revalidated += 1;
                    if let Some(parent) = self.arena.transfer(h).parent() {
                        if !touched.contains(&parent) {
                            touched.push(parent);
                        }
                    }
                }
            }
            for parent in touched {
                self.arena.refresh(parent);
            }
            if revalidated > 0 {
                tracing::debug!(site = %origin, %kind, revalidated, "re-validated inbound events");
            }
        }

        tracing::trace!(carrier = %id, %origin, %destination, %process, "hop");
        Execution::Moved {
            carrier: id,
            origin,
            destination,
            channel,
            process,
            revalidated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TransferState;
    use hopkmc_core::{RateTable, Vec3};

    fn pair() -> (Graph, SiteId, SiteId) {
        let mut g = Graph::new();
        let a = g.add_site(Vec3::ZERO).unwrap();
        let b = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let r = RateTable::new().with(ProcessKind::ElectronHop, 1.0);
        g.connect(a, b, r).unwrap();
        g.connect(b, a, r).unwrap();
        (g, a, b)
    }

    fn place(graph: &Graph, at: &[(CarrierKind, SiteId)]) -> (Vec<Carrier>, Occupancy) {
        let mut occ = Occupancy::new();
        let carriers = at
            .iter()
            .enumerate()
            .map(|(i, &(kind, site))| {
                if !graph.site(site).is_reservoir() {
                    occ.occupy(kind, site);
                }
                Carrier::new(CarrierId(i as u32), kind, site)
            })
            .collect();
        (carriers, occ)
    }

    #[test]
    fn build_binds_each_carrier_to_its_site() {
        let (g, a, b) = pair();
        let (carriers, _) = place(&g, &[(CarrierKind::Electron, a)]);
        let tree = EventTree::build(&g, &carriers);
        let esc = tree.arena.escape(tree.escape_of(CarrierId(0)));
        assert_eq!(esc.children().len(), 1);
        let t = tree.arena.transfer(esc.children()[0]);
        assert_eq!((t.origin(), t.destination()), (a, b));
        // The slot at b exists but is unbound.
        assert_eq!(tree.catalog.slot_count(), 2);
        assert_eq!(tree.arena.total_rate(), 1.0);
    }

    #[test]
    fn successful_execution_rebinds_escape() {
        let (g, a, b) = pair();
        let (mut carriers, mut occ) = place(&g, &[(CarrierKind::Electron, a)]);
        let mut tree = EventTree::build(&g, &carriers);
        let ab = tree.arena.escape(tree.escape_of(CarrierId(0))).children()[0];

        let out = tree.execute(ab, &g, &mut occ, &mut carriers);
        assert!(matches!(out, Execution::Moved { destination, .. } if destination == b));
        assert_eq!(tree.arena.transfer(ab).state(), TransferState::Unbound);
        let esc = tree.arena.escape(tree.escape_of(CarrierId(0)));
        let ba = esc.children()[0];
        assert_eq!(tree.arena.transfer(ba).destination(), a);
        assert_eq!(tree.arena.transfer(ba).state(), TransferState::Enabled);
    }

    #[test]
    fn contention_then_revalidation() {
        let mut g = Graph::new();
        let a = g.add_site(Vec3::ZERO).unwrap();
        let b = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let c = g.add_site(Vec3::new(2.0, 0.0, 0.0)).unwrap();
        let r = RateTable::new().with(ProcessKind::ElectronHop, 1.0);
        g.connect(a, b, r).unwrap();
        g.connect(b, c, r).unwrap();
        let (mut carriers, mut occ) =
            place(&g, &[(CarrierKind::Electron, a), (CarrierKind::Electron, b)]);
        let mut tree = EventTree::build(&g, &carriers);
        let ab = tree.arena.escape(tree.escape_of(CarrierId(0))).children()[0];
        let bc = tree.arena.escape(tree.escape_of(CarrierId(1))).children()[0];

        let out = tree.execute(ab, &g, &mut occ, &mut carriers);
        assert!(matches!(out, Execution::Contended { .. }));
        assert_eq!(tree.arena.transfer(ab).state(), TransferState::Unavailable);
        assert_eq!(tree.arena.total_rate(), 1.0);

        let out = tree.execute(bc, &g, &mut occ, &mut carriers);
        assert!(matches!(out, Execution::Moved { revalidated: 1, .. }));
        assert_eq!(tree.arena.transfer(ab).state(), TransferState::Enabled);
        assert_eq!(
            tree.arena.cumulative_rate(tree.escape_of(CarrierId(0))),
            1.0
        );
    }

    #[test]
    fn reservoir_carriers_get_private_slots() {
        let mut g = Graph::new();
        let src = g.add_reservoir(Vec3::ZERO).unwrap();
        let a = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let b = g.add_site(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        let inj = RateTable::new().with(ProcessKind::Injection, 1.0);
        g.connect(src, a, inj).unwrap();
        g.connect(src, b, inj).unwrap();
        let (carriers, _) = place(
            &g,
            &[(CarrierKind::Hole, src), (CarrierKind::Hole, src)],
        );
        let tree = EventTree::build(&g, &carriers);
        let c0 = tree.arena.escape(tree.escape_of(CarrierId(0))).children().to_vec();
        let c1 = tree.arena.escape(tree.escape_of(CarrierId(1))).children().to_vec();
        assert_eq!(c0.len(), 2);
        assert!(c0.iter().all(|h| !c1.contains(h)));
        assert_eq!(tree.arena.total_rate(), 4.0);
    }

    #[test]
    #[should_panic(expected = "unbound transfer")]
    fn executing_unbound_event_panics() {
        let (g, a, b) = pair();
        let (mut carriers, mut occ) = place(&g, &[(CarrierKind::Electron, a)]);
        let mut tree = EventTree::build(&g, &carriers);
        let key = SlotKey {
            kind: CarrierKind::Electron,
            site: b,
            owner: None,
        };
        let ba = tree.catalog.slot(&key).unwrap()[0];
        tree.execute(ba, &g, &mut occ, &mut carriers);
    }
}
