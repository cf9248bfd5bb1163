//! Whole-state consistency checks.
//!
//! [`check`] walks every carrier, occupancy map, and event and reports
//! the first inconsistency. It is O(events) and meant for tests and
//! debugging, not for the step loop.

use std::fmt;

use hopkmc_core::{CarrierId, CarrierKind, SiteId};
use hopkmc_graph::{Graph, Occupancy};

use crate::carrier::Carrier;
use crate::catalog::SlotKey;
use crate::event::EventHandle;
use crate::tree::EventTree;

/// A broken engine invariant.
#[derive(Clone, Debug, PartialEq)]
pub enum InvariantViolation {
    /// Two carriers of one kind stand on the same bulk site.
    SharedSite {
        /// Kind of both carriers.
        kind: CarrierKind,
        /// The shared site.
        site: SiteId,
        /// First carrier found there.
        first: CarrierId,
        /// Second carrier found there.
        second: CarrierId,
    },
    /// The occupancy map of `kind` disagrees with carrier positions.
    OccupancyMismatch {
        /// Kind whose map is wrong.
        kind: CarrierKind,
        /// Sites in the map.
        mapped: usize,
        /// Carriers of that kind on bulk sites.
        carriers: usize,
    },
    /// An escape's cached rate differs from a fresh sum of its children.
    RateMismatch {
        /// Owner of the escape.
        carrier: CarrierId,
        /// Cached cumulative rate.
        cached: f64,
        /// Freshly summed rate.
        fresh: f64,
    },
    /// An unavailable event points at a destination that is free.
    StaleUnavailable {
        /// The stuck event.
        event: EventHandle,
        /// Its destination.
        destination: SiteId,
    },
    /// An escape's children are not the slot for its carrier's site.
    ChildSetMismatch {
        /// Owner of the escape.
        carrier: CarrierId,
        /// The carrier's current site.
        site: SiteId,
    },
    /// An enabled transfer event has no carrier.
    EnabledWithoutCarrier {
        /// The offending event.
        event: EventHandle,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedSite {
                kind,
                site,
                first,
                second,
            } => write!(f, "{kind} carriers {first} and {second} share {site}"),
            Self::OccupancyMismatch {
                kind,
                mapped,
                carriers,
            } => write!(
                f,
                "{kind} occupancy map has {mapped} sites but {carriers} carriers are on bulk sites"
            ),
            Self::RateMismatch {
                carrier,
                cached,
                fresh,
            } => write!(
                f,
                "escape of {carrier} caches rate {cached} but its children sum to {fresh}"
            ),
            Self::StaleUnavailable { event, destination } => {
                write!(f, "{event} is unavailable but {destination} is free")
            }
            Self::ChildSetMismatch { carrier, site } => {
                write!(f, "escape of {carrier} is not bound to the slot at {site}")
            }
            Self::EnabledWithoutCarrier { event } => {
                write!(f, "{event} is enabled without a carrier")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

pub(crate) fn check(
    graph: &Graph,
    occupancy: &Occupancy,
    carriers: &[Carrier],
    tree: &EventTree,
) -> Result<(), InvariantViolation> {
    let mut seen: [Vec<Option<CarrierId>>; CarrierKind::COUNT] =
        std::array::from_fn(|_| vec![None; graph.site_count()]);
    let mut on_bulk = [0usize; CarrierKind::COUNT];
    for c in carriers {
        let site = c.current_site();
        if graph.site(site).is_reservoir() {
            continue;
        }
        let kind = c.kind();
        on_bulk[kind.index()] += 1;
        if let Some(first) = seen[kind.index()][site.index()].replace(c.id()) {
            return Err(InvariantViolation::SharedSite {
                kind,
                site,
                first,
                second: c.id(),
            });
        }
        if !occupancy.is_occupied(kind, site) {
            return Err(InvariantViolation::OccupancyMismatch {
                kind,
                mapped: occupancy.map(kind).len(),
                carriers: on_bulk[kind.index()],
            });
        }
    }
    for kind in CarrierKind::ALL {
        let mapped = occupancy.map(kind).len();
        if mapped != on_bulk[kind.index()] {
            return Err(InvariantViolation::OccupancyMismatch {
                kind,
                mapped,
                carriers: on_bulk[kind.index()],
            });
        }
    }

    let arena = &tree.arena;
    for c in carriers {
        let escape = arena.escape(tree.escape_of(c.id()));
        let key = SlotKey::for_carrier(graph, c.kind(), c.current_site(), c.id());
        if tree.catalog.slot(&key) != Some(escape.children()) {
            return Err(InvariantViolation::ChildSetMismatch {
                carrier: c.id(),
                site: c.current_site(),
            });
        }
        let cached = escape.cumulative_rate();
        let fresh = arena.fresh_rate(tree.escape_of(c.id()));
        if cached.to_bits() != fresh.to_bits() {
            return Err(InvariantViolation::RateMismatch {
                carrier: c.id(),
                cached,
                fresh,
            });
        }
    }

    for (h, t) in arena.transfers() {
        if t.is_enabled() && t.carrier().is_none() {
            return Err(InvariantViolation::EnabledWithoutCarrier { event: h });
        }
        let destination = t.destination();
        if t.is_unavailable()
            && !graph.site(destination).is_reservoir()
            && !occupancy.is_occupied(t.kind(), destination)
        {
            return Err(InvariantViolation::StaleUnavailable {
                event: h,
                destination,
            });
        }
    }
    Ok(())
}
