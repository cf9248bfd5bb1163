//! Arena storage for the event tree.
//!
//! Every node lives in one `Vec<Event>` addressed by [`EventHandle`].
//! Node 0 is always the head. Escape events are appended once per
//! carrier and transfer events once per (kind, site) slot; nothing is
//! ever removed, so handles stay valid for the life of the arena.
//!
//! Each escape caches the sum of its enabled children's rates. The cache
//! is recomputed from scratch (in child order) whenever the child set or
//! a child's enabled flag changes, so it is always bit-identical to a
//! fresh walk of the same children.

use hopkmc_core::{CarrierId, CarrierKind};
use smallvec::SmallVec;

use crate::event::{EscapeEvent, Event, EventHandle, HeadEvent, TransferEvent};

const HEAD: EventHandle = EventHandle(0);

/// Owner of all event nodes of one simulation.
#[derive(Clone, Debug)]
pub struct EventArena {
    nodes: Vec<Event>,
}

impl Default for EventArena {
    fn default() -> Self {
        Self::new()
    }
}

impl EventArena {
    /// An arena holding only the head event.
    pub fn new() -> Self {
        Self {
            nodes: vec![Event::Head(HeadEvent::default())],
        }
    }

    /// Handle of the head event.
    pub fn head(&self) -> EventHandle {
        HEAD
    }

    /// Total number of nodes, head included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the head is created with the arena.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up any node.
    pub fn get(&self, handle: EventHandle) -> &Event {
        &self.nodes[handle.index()]
    }

    /// The head event.
    pub fn head_event(&self) -> &HeadEvent {
        match &self.nodes[HEAD.index()] {
            Event::Head(h) => h,
            _ => unreachable!("node 0 is always the head"),
        }
    }

    /// Look up an escape event.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not an escape event.
    pub fn escape(&self, handle: EventHandle) -> &EscapeEvent {
        match &self.nodes[handle.index()] {
            Event::Escape(e) => e,
            other => panic!("{handle} is not an escape event: {other:?}"),
        }
    }

    /// Look up a transfer event.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not a transfer event.
    pub fn transfer(&self, handle: EventHandle) -> &TransferEvent {
        match &self.nodes[handle.index()] {
            Event::Transfer(t) => t,
            other => panic!("{handle} is not a transfer event: {other:?}"),
        }
    }

    fn escape_mut(&mut self, handle: EventHandle) -> &mut EscapeEvent {
        match &mut self.nodes[handle.index()] {
            Event::Escape(e) => e,
            other => panic!("{handle} is not an escape event: {other:?}"),
        }
    }

    fn transfer_mut(&mut self, handle: EventHandle) -> &mut TransferEvent {
        match &mut self.nodes[handle.index()] {
            Event::Transfer(t) => t,
            other => panic!("{handle} is not a transfer event: {other:?}"),
        }
    }

    /// All transfer events with their handles, in creation order.
    pub fn transfers(&self) -> impl Iterator<Item = (EventHandle, &TransferEvent)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            Event::Transfer(t) => Some((EventHandle(i as u32), t)),
            _ => None,
        })
    }

    /// Escape events in carrier order.
    pub fn escapes(&self) -> impl Iterator<Item = (EventHandle, &EscapeEvent)> + '_ {
        self.head_event()
            .children
            .iter()
            .map(move |&h| (h, self.escape(h)))
    }

    pub(crate) fn push_escape(&mut self, carrier: CarrierId, kind: CarrierKind) -> EventHandle {
        let handle = self.next_handle();
        self.nodes.push(Event::Escape(EscapeEvent {
            carrier,
            kind,
            enabled: true,
            cached_rate: 0.0,
            children: SmallVec::new(),
        }));
        match &mut self.nodes[HEAD.index()] {
            Event::Head(h) => h.children.push(handle),
            _ => unreachable!("node 0 is always the head"),
        }
        handle
    }

    pub(crate) fn push_transfer(&mut self, event: TransferEvent) -> EventHandle {
        let handle = self.next_handle();
        self.nodes.push(Event::Transfer(event));
        handle
    }

    fn next_handle(&self) -> EventHandle {
        EventHandle(u32::try_from(self.nodes.len()).expect("event count exceeds u32::MAX"))
    }

    /// Cumulative rate of a node.
    ///
    /// Transfer: own rate (zero unless enabled). Escape: cached sum of
    /// enabled children. Head: sum over enabled escapes, in carrier order.
    pub fn cumulative_rate(&self, handle: EventHandle) -> f64 {
        match &self.nodes[handle.index()] {
            Event::Transfer(t) => t.rate(),
            Event::Escape(e) => e.cached_rate,
            Event::Head(h) => h
                .children
                .iter()
                .map(|&c| self.escape(c))
                .filter(|e| e.enabled)
                .map(|e| e.cached_rate)
                .sum(),
        }
    }

    /// Cumulative rate recomputed from the leaves, bypassing caches.
    pub fn fresh_rate(&self, handle: EventHandle) -> f64 {
        match &self.nodes[handle.index()] {
            Event::Transfer(t) => t.rate(),
            Event::Escape(e) => e
                .children
                .iter()
                .map(|&c| self.transfer(c))
                .filter(|t| t.enabled)
                .map(|t| t.rate())
                .sum(),
            Event::Head(h) => h
                .children
                .iter()
                .filter(|&&c| self.escape(c).enabled)
                .map(|&c| self.fresh_rate(c))
                .sum(),
        }
    }

    /// Total rate of the tree: the head's cumulative rate.
    pub fn total_rate(&self) -> f64 {
        self.cumulative_rate(HEAD)
    }

    pub(crate) fn refresh(&mut self, escape: EventHandle) {
        let sum = self.fresh_rate(escape);
        self.escape_mut(escape).cached_rate = sum;
    }

    /// Make `set` the child set of `escape`, binding each transfer to the
    /// escape's carrier. Events still marked unavailable stay disabled.
    ///
    /// # Panics
    ///
    /// Panics if any event in `set` is already bound.
    pub(crate) fn bind(&mut self, escape: EventHandle, set: &[EventHandle]) {
        let carrier = self.escape(escape).carrier;
        for &h in set {
            let t = self.transfer_mut(h);
            if let Some(other) = t.carrier {
                panic!("transfer event {h} is already bound to carrier {other}");
            }
            t.carrier = Some(carrier);
            t.parent = Some(escape);
            t.enabled = !t.unavailable;
        }
        let e = self.escape_mut(escape);
        e.children.clear();
        e.children.extend_from_slice(set);
        self.refresh(escape);
    }

    /// Disable and unbind every child of `escape`, leaving it empty.
    pub(crate) fn unbind_all(&mut self, escape: EventHandle) {
        let children = std::mem::take(&mut self.escape_mut(escape).children);
        for h in children {
            self.disable(h);
            let t = self.transfer_mut(h);
            t.carrier = None;
            t.parent = None;
        }
        self.escape_mut(escape).cached_rate = 0.0;
    }

    /// Switch a transfer event off. Does not refresh the parent.
    pub(crate) fn disable(&mut self, handle: EventHandle) {
        self.transfer_mut(handle).enabled = false;
    }

    /// Record a failed attempt: the event becomes unavailable and
    /// disabled, and its parent's cached rate drops accordingly.
    pub(crate) fn mark_unavailable(&mut self, handle: EventHandle) {
        let t = self.transfer_mut(handle);
        t.enabled = false;
        t.unavailable = true;
        let parent = t.parent;
        if let Some(parent) = parent {
            self.refresh(parent);
        }
    }

    /// Clear the unavailable flag after the destination was vacated.
    ///
    /// Bound events are re-enabled. Returns `true` if the flag was set.
    /// The caller refreshes the parent.
    pub(crate) fn revalidate(&mut self, handle: EventHandle) -> bool {
        let t = self.transfer_mut(handle);
        if !t.unavailable {
            return false;
        }
        t.unavailable = false;
        if t.carrier.is_some() {
            t.enabled = true;
        }
        true
    }

    /// Weighted descent: pick the transfer event at position `v` in
    /// `[0, total_rate)`.
    ///
    /// Walks escapes in carrier order subtracting each cumulative rate
    /// until the remainder fits, then does the same over that escape's
    /// children. Zero-rate nodes are skipped. If rounding leaves `v`
    /// past the last node, the last positive-rate node is chosen.
    pub fn select(&self, v: f64) -> Option<EventHandle> {
        let head = self.head_event();
        let (escape, remainder) = walk(&head.children, v, |h| {
            let e = self.escape(h);
            if e.enabled {
                e.cached_rate
            } else {
                0.0
            }
        })?;
        let children = &self.escape(escape).children;
        walk(children, remainder, |h| self.transfer(h).rate()).map(|(h, _)| h)
    }
}

/// One level of the weighted descent. Returns the chosen handle and the
/// remaining offset inside it.
fn walk(
    children: &[EventHandle],
    mut v: f64,
    rate_of: impl Fn(EventHandle) -> f64,
) -> Option<(EventHandle, f64)> {
    let mut last = None;
    for &h in children {
        let r = rate_of(h);
        if r <= 0.0 {
            continue;
        }
        if v <= r {
            return Some((h, v));
        }
        v -= r;
        last = Some((h, r));
    }
    last
}
