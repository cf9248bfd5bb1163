//! The per-hop record streamed to observers and replay tooling.

use std::fmt;

use crate::id::{CarrierId, ChannelId, SiteId};
use crate::kind::{CarrierKind, ProcessKind};

/// One executed hop.
///
/// Emitted by the engine after a transfer event commits. Contended
/// selections (destination occupied) never produce a record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HopRecord {
    /// Zero-based index of the scheduler iteration that executed the hop.
    pub step: u64,
    /// Simulated time at which the hop happened (after the time advance).
    pub time: f64,
    /// The carrier that moved.
    pub carrier: CarrierId,
    /// Kind of the carrier that moved.
    pub kind: CarrierKind,
    /// Site the carrier left.
    pub origin: SiteId,
    /// Site the carrier entered.
    pub destination: SiteId,
    /// Channel that was traversed.
    pub channel: ChannelId,
    /// Process that drove the transfer.
    pub process: ProcessKind,
}

impl fmt::Display for HopRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} t={:.6e} {} ({}) {} -> {} via {} [{}]",
            self.step,
            self.time,
            self.carrier,
            self.kind,
            self.origin,
            self.destination,
            self.channel,
            self.process,
        )
    }
}
