//! Identifiers used throughout RideMatch.
//!
//! Host-facing record IDs ([`OfferId`], [`RequestId`], [`UserId`]) use UUIDv7
//! for time-ordered sorting. Graph handles ([`DriverKey`], [`RiderKey`]) are
//! monotonically increasing sequence numbers assigned by the match graph and
//! never reused, so a stale handle can never alias a newer node.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OfferId
// ---------------------------------------------------------------------------

/// Identifier of a persisted ride offer (driver side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OfferId(pub Uuid);

impl OfferId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offer:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Identifier of a persisted ride request (rider side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Unique identifier for a user account (driver or passenger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Graph handles
// ---------------------------------------------------------------------------

/// Stable handle of a driver node inside a match graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DriverKey(pub u64);

impl fmt::Display for DriverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver#{}", self.0)
    }
}

/// Stable handle of a rider node inside a match graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RiderKey(pub u64);

impl fmt::Display for RiderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rider#{}", self.0)
    }
}

/// A handle to either side of the bipartite graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum NodeRef {
    Driver(DriverKey),
    Rider(RiderKey),
}

impl NodeRef {
    #[must_use]
    pub fn as_driver(self) -> Option<DriverKey> {
        match self {
            Self::Driver(key) => Some(key),
            Self::Rider(_) => None,
        }
    }

    #[must_use]
    pub fn as_rider(self) -> Option<RiderKey> {
        match self {
            Self::Rider(key) => Some(key),
            Self::Driver(_) => None,
        }
    }
}

impl From<DriverKey> for NodeRef {
    fn from(key: DriverKey) -> Self {
        Self::Driver(key)
    }
}

impl From<RiderKey> for NodeRef {
    fn from(key: RiderKey) -> Self {
        Self::Rider(key)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(key) => key.fmt(f),
            Self::Rider(key) => key.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_id_uniqueness() {
        let a = OfferId::new();
        let b = OfferId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn from_bytes_is_stable() {
        assert_eq!(RequestId::from_bytes([9; 16]), RequestId::from_bytes([9; 16]));
        assert_ne!(OfferId::from_bytes([1; 16]), OfferId::from_bytes([2; 16]));
    }

    #[test]
    fn handle_display() {
        assert_eq!(DriverKey(4).to_string(), "driver#4");
        assert_eq!(NodeRef::Rider(RiderKey(0)).to_string(), "rider#0");
    }

    #[test]
    fn node_ref_projections() {
        let d = NodeRef::from(DriverKey(1));
        assert_eq!(d.as_driver(), Some(DriverKey(1)));
        assert_eq!(d.as_rider(), None);
        let r = NodeRef::from(RiderKey(2));
        assert_eq!(r.as_rider(), Some(RiderKey(2)));
        assert_eq!(r.as_driver(), None);
    }

    #[test]
    fn serde_roundtrips() {
        let oid = OfferId::new();
        let json = serde_json::to_string(&oid).unwrap();
        let back: OfferId = serde_json::from_str(&json).unwrap();
        assert_eq!(oid, back);

        let node = NodeRef::Driver(DriverKey(12));
        let json = serde_json::to_string(&node).unwrap();
        let back: NodeRef = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
