//! Carrier kinds and transfer processes.

use std::fmt;

/// The kind of a transport entity.
///
/// Each kind has its own occupancy map: two carriers of the same kind
/// never share a bulk site, but an electron and a hole may.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CarrierKind {
    /// Negative charge carrier.
    Electron,
    /// Positive charge carrier.
    Hole,
    /// Neutral excitation (energy transfer).
    Exciton,
}

impl CarrierKind {
    /// Number of carrier kinds.
    pub const COUNT: usize = 3;

    /// All kinds in index order.
    pub const ALL: [CarrierKind; Self::COUNT] =
        [CarrierKind::Electron, CarrierKind::Hole, CarrierKind::Exciton];

    /// Dense index in `0..COUNT`, used for per-kind tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            CarrierKind::Electron => 0,
            CarrierKind::Hole => 1,
            CarrierKind::Exciton => 2,
        }
    }

    /// Processes this kind uses for bulk-to-bulk hops.
    ///
    /// Excitons have two independent energy-transfer mechanisms; each
    /// becomes its own transfer event on the same channel.
    pub fn bulk_processes(self) -> &'static [ProcessKind] {
        match self {
            CarrierKind::Electron => &[ProcessKind::ElectronHop],
            CarrierKind::Hole => &[ProcessKind::HoleHop],
            CarrierKind::Exciton => &[ProcessKind::Dexter, ProcessKind::Forster],
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CarrierKind::Electron => "electron",
            CarrierKind::Hole => "hole",
            CarrierKind::Exciton => "exciton",
        };
        f.write_str(s)
    }
}

/// A physical transfer process with its own rate on each channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessKind {
    /// Electron hop between two bulk sites.
    ElectronHop,
    /// Hole hop between two bulk sites.
    HoleHop,
    /// Dexter (exchange) energy transfer.
    Dexter,
    /// Förster (dipole-dipole) energy transfer.
    Forster,
    /// Injection from a reservoir into a bulk site.
    Injection,
    /// Collection from a bulk site into a reservoir.
    Collection,
    /// Back-transfer from a bulk site into a reservoir.
    Return,
}

impl ProcessKind {
    /// Number of process kinds.
    pub const COUNT: usize = 7;

    /// All processes in index order.
    pub const ALL: [ProcessKind; Self::COUNT] = [
        ProcessKind::ElectronHop,
        ProcessKind::HoleHop,
        ProcessKind::Dexter,
        ProcessKind::Forster,
        ProcessKind::Injection,
        ProcessKind::Collection,
        ProcessKind::Return,
    ];

    /// Processes that cross a reservoir boundary, from a bulk site.
    pub const INTO_RESERVOIR: [ProcessKind; 2] = [ProcessKind::Collection, ProcessKind::Return];

    /// Dense index in `0..COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ProcessKind::ElectronHop => 0,
            ProcessKind::HoleHop => 1,
            ProcessKind::Dexter => 2,
            ProcessKind::Forster => 3,
            ProcessKind::Injection => 4,
            ProcessKind::Collection => 5,
            ProcessKind::Return => 6,
        }
    }

    /// `true` for injection, collection, and return.
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            ProcessKind::Injection | ProcessKind::Collection | ProcessKind::Return
        )
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessKind::ElectronHop => "electron-hop",
            ProcessKind::HoleHop => "hole-hop",
            ProcessKind::Dexter => "dexter",
            ProcessKind::Forster => "forster",
            ProcessKind::Injection => "injection",
            ProcessKind::Collection => "collection",
            ProcessKind::Return => "return",
        };
        f.write_str(s)
    }
}
