//! Event tree node types.
//!
//! The tree has three levels, stored as one tagged union in the
//! [`EventArena`](crate::arena::EventArena):
//!
//! ```text
//! Head ──┬── Escape (carrier 0) ──┬── Transfer (channel, process)
//!        │                        └── Transfer ...
//!        └── Escape (carrier 1) ──── ...
//! ```
//!
//! Parents and children are arena handles, never pointers. Replacing an
//! escape's child set only rewrites handle lists; transfer events are
//! never freed during a run.

use std::fmt;

use hopkmc_core::{CarrierId, CarrierKind, ChannelId, ProcessKind, SiteId};
use smallvec::SmallVec;

/// Stable index of an event in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHandle(pub(crate) u32);

impl EventHandle {
    /// The handle as a `usize` index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Observable state of a transfer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferState {
    /// No carrier is assigned.
    Unbound,
    /// Bound but switched off explicitly.
    Disabled,
    /// Bound and selectable.
    Enabled,
    /// Bound, but the last attempt found the destination occupied.
    /// Switched back on when the destination is vacated.
    Unavailable,
}

/// Leaf event: one (channel, process) pair usable by one carrier kind.
#[derive(Clone, Debug)]
pub struct TransferEvent {
    pub(crate) kind: CarrierKind,
    pub(crate) channel: ChannelId,
    pub(crate) process: ProcessKind,
    pub(crate) origin: SiteId,
    pub(crate) destination: SiteId,
    pub(crate) rate: f64,
    pub(crate) carrier: Option<CarrierId>,
    pub(crate) parent: Option<EventHandle>,
    pub(crate) enabled: bool,
    pub(crate) unavailable: bool,
}

impl TransferEvent {
    pub(crate) fn new(
        kind: CarrierKind,
        channel: ChannelId,
        process: ProcessKind,
        origin: SiteId,
        destination: SiteId,
        rate: f64,
    ) -> Self {
        Self {
            kind,
            channel,
            process,
            origin,
            destination,
            rate,
            carrier: None,
            parent: None,
            enabled: false,
            unavailable: false,
        }
    }

    /// The process rate if enabled, else `0.0`.
    #[inline]
    pub fn rate(&self) -> f64 {
        if self.enabled {
            self.rate
        } else {
            0.0
        }
    }

    /// The channel's rate for this process, regardless of state.
    pub fn base_rate(&self) -> f64 {
        self.rate
    }

    /// Current state.
    pub fn state(&self) -> TransferState {
        match (self.carrier, self.unavailable, self.enabled) {
            (None, _, _) => TransferState::Unbound,
            (Some(_), true, _) => TransferState::Unavailable,
            (Some(_), false, true) => TransferState::Enabled,
            (Some(_), false, false) => TransferState::Disabled,
        }
    }

    /// `true` if selectable.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` if the last attempt found the destination occupied and the
    /// destination has not been vacated since.
    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    /// Carrier kind this event serves.
    pub fn kind(&self) -> CarrierKind {
        self.kind
    }

    /// Channel traversed on execution.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Process that drives the transfer.
    pub fn process(&self) -> ProcessKind {
        self.process
    }

    /// Channel origin.
    pub fn origin(&self) -> SiteId {
        self.origin
    }

    /// Channel destination.
    pub fn destination(&self) -> SiteId {
        self.destination
    }

    /// Bound carrier, if any.
    pub fn carrier(&self) -> Option<CarrierId> {
        self.carrier
    }

    /// Owning escape event, if bound.
    pub fn parent(&self) -> Option<EventHandle> {
        self.parent
    }
}

/// Aggregate of every transfer usable by one carrier from its site.
#[derive(Clone, Debug)]
pub struct EscapeEvent {
    pub(crate) carrier: CarrierId,
    pub(crate) kind: CarrierKind,
    pub(crate) enabled: bool,
    pub(crate) cached_rate: f64,
    pub(crate) children: SmallVec<[EventHandle; 8]>,
}

impl EscapeEvent {
    /// The carrier this escape belongs to.
    pub fn carrier(&self) -> CarrierId {
        self.carrier
    }

    /// Kind of the carrier.
    pub fn kind(&self) -> CarrierKind {
        self.kind
    }

    /// Escape events stay enabled for the whole run.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sum of the rates of enabled children, as last refreshed.
    pub fn cumulative_rate(&self) -> f64 {
        self.cached_rate
    }

    /// Current child transfer events, in enumeration order.
    pub fn children(&self) -> &[EventHandle] {
        &self.children
    }
}

/// Root of the event tree.
#[derive(Clone, Debug, Default)]
pub struct HeadEvent {
    pub(crate) children: Vec<EventHandle>,
}

impl HeadEvent {
    /// Escape events in carrier order.
    pub fn children(&self) -> &[EventHandle] {
        &self.children
    }
}

/// A node of the event tree.
#[derive(Clone, Debug)]
pub enum Event {
    /// The root.
    Head(HeadEvent),
    /// Per-carrier aggregate.
    Escape(EscapeEvent),
    /// Leaf transfer.
    Transfer(TransferEvent),
}

impl Event {
    /// Whether the node contributes to its parent's cumulative rate.
    pub fn is_enabled(&self) -> bool {
        match self {
            Event::Head(_) => true,
            Event::Escape(e) => e.enabled,
            Event::Transfer(t) => t.enabled,
        }
    }

    /// Children handles; empty for transfer events.
    pub fn children(&self) -> &[EventHandle] {
        match self {
            Event::Head(h) => &h.children,
            Event::Escape(e) => &e.children,
            Event::Transfer(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> TransferEvent {
        TransferEvent::new(
            CarrierKind::Electron,
            ChannelId(0),
            ProcessKind::ElectronHop,
            SiteId(0),
            SiteId(1),
            2.5,
        )
    }

    #[test]
    fn new_transfer_is_unbound_and_contributes_nothing() {
        let t = leaf();
        assert_eq!(t.state(), TransferState::Unbound);
        assert_eq!(t.rate(), 0.0);
        assert_eq!(t.base_rate(), 2.5);
    }

    #[test]
    fn state_reflects_flags() {
        let mut t = leaf();
        t.carrier = Some(CarrierId(0));
        assert_eq!(t.state(), TransferState::Disabled);
        t.enabled = true;
        assert_eq!(t.state(), TransferState::Enabled);
        assert_eq!(t.rate(), 2.5);
        t.enabled = false;
        t.unavailable = true;
        assert_eq!(t.state(), TransferState::Unavailable);
        assert_eq!(t.rate(), 0.0);
        t.carrier = None;
        assert_eq!(t.state(), TransferState::Unbound);
    }

    #[test]
    fn transfer_has_no_children() {
        assert!(Event::Transfer(leaf()).children().is_empty());
    }
}
