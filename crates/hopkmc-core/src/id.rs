//! Strongly-typed identifiers for sites, channels, and carriers.
//!
//! All identifiers are dense indices assigned in creation order, so
//! they double as positions in the owning `Vec`.

use std::fmt;

/// Identifies a site in the hopping graph.
///
/// Sites are created at graph-load time and assigned sequential IDs.
/// `SiteId(n)` is the n-th site added to the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u32);

impl SiteId {
    /// The id as a `usize` index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl From<u32> for SiteId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a directed transfer channel (origin → destination).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

impl ChannelId {
    /// The id as a `usize` index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl From<u32> for ChannelId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a carrier (electron, hole, or exciton).
///
/// Carriers are numbered in placement order. The engine enumerates
/// carriers in ascending id order when walking the event tree, which
/// fixes the tie-break order of the weighted selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarrierId(pub u32);

impl CarrierId {
    /// The id as a `usize` index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl From<u32> for CarrierId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        assert_eq!(SiteId(3).to_string(), "S3");
        assert_eq!(ChannelId(7).to_string(), "C7");
        assert_eq!(CarrierId(0).to_string(), "Q0");
    }

    #[test]
    fn index_matches_raw() {
        assert_eq!(SiteId::from(12).index(), 12);
        assert_eq!(ChannelId::from(4).index(), 4);
        assert_eq!(CarrierId::from(9).index(), 9);
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(CarrierId(1) < CarrierId(2));
        assert!(SiteId(0) < SiteId(10));
    }
}
