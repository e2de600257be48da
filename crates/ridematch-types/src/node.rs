//! Ride offers, ride requests, and the role they play in the match graph.
//!
//! A [`RideOffer`] becomes a driver node, a [`RideRequest`] a rider node.
//! Both expose an origin and a destination [`Location`]; everything else is
//! payload the engine carries but does not interpret.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Location, OfferId, RequestId, RidematchError, Result, UserId};

/// Which side of the bipartite graph a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum NodeRole {
    Driver,
    Rider,
}

impl NodeRole {
    /// The opposite side of the graph.
    #[must_use]
    pub fn counterpart(self) -> Self {
        match self {
            Self::Driver => Self::Rider,
            Self::Rider => Self::Driver,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver => write!(f, "DRIVER"),
            Self::Rider => write!(f, "RIDER"),
        }
    }
}

impl FromStr for NodeRole {
    type Err = RidematchError;

    /// Parse a role string supplied by the host (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driver" | "offer" => Ok(Self::Driver),
            "rider" | "passenger" | "request" => Ok(Self::Rider),
            _ => Err(RidematchError::UnknownRole(s.to_string())),
        }
    }
}

/// A driver's offer to take passengers from `origin` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideOffer {
    pub id: OfferId,
    pub driver_id: UserId,
    pub origin: Location,
    pub destination: Location,
    pub departure_time: DateTime<Utc>,
    pub available_seats: u8,
    pub description: Option<String>,
}

impl RideOffer {
    #[must_use]
    pub fn has_free_seat(&self) -> bool {
        self.available_seats > 0
    }
}

/// A passenger's request to travel from `origin` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RequestId,
    pub rider_id: UserId,
    pub origin: Location,
    pub destination: Location,
    pub departure_time: DateTime<Utc>,
}

/// A node entering the matching pool, tagged by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MatchNode {
    Driver(RideOffer),
    Rider(RideRequest),
}

impl MatchNode {
    #[must_use]
    pub fn role(&self) -> NodeRole {
        match self {
            Self::Driver(_) => NodeRole::Driver,
            Self::Rider(_) => NodeRole::Rider,
        }
    }

    #[must_use]
    pub fn origin(&self) -> &Location {
        match self {
            Self::Driver(offer) => &offer.origin,
            Self::Rider(request) => &request.origin,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &Location {
        match self {
            Self::Driver(offer) => &offer.destination,
            Self::Rider(request) => &request.destination,
        }
    }
}

impl From<RideOffer> for MatchNode {
    fn from(offer: RideOffer) -> Self {
        Self::Driver(offer)
    }
}

impl From<RideRequest> for MatchNode {
    fn from(request: RideRequest) -> Self {
        Self::Rider(request)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl RideOffer {
    /// An offer with one free seat departing now.
    pub fn dummy(origin: &str, destination: &str) -> Self {
        Self {
            id: OfferId::new(),
            driver_id: UserId::new(),
            origin: Location::dummy(origin),
            destination: Location::dummy(destination),
            departure_time: Utc::now(),
            available_seats: 1,
            description: None,
        }
    }

    /// Same as [`RideOffer::dummy`] with a fixed id and seat count.
    pub fn dummy_with_seats(id: OfferId, origin: &str, destination: &str, seats: u8) -> Self {
        Self {
            id,
            available_seats: seats,
            ..Self::dummy(origin, destination)
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl RideRequest {
    /// A request departing now.
    pub fn dummy(origin: &str, destination: &str) -> Self {
        Self {
            id: RequestId::new(),
            rider_id: UserId::new(),
            origin: Location::dummy(origin),
            destination: Location::dummy(destination),
            departure_time: Utc::now(),
        }
    }

    /// Same as [`RideRequest::dummy`] with a fixed id.
    pub fn dummy_with_id(id: RequestId, origin: &str, destination: &str) -> Self {
        Self {
            id,
            ..Self::dummy(origin, destination)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing() {
        assert_eq!("driver".parse::<NodeRole>().unwrap(), NodeRole::Driver);
        assert_eq!(" Passenger ".parse::<NodeRole>().unwrap(), NodeRole::Rider);
        assert_eq!("REQUEST".parse::<NodeRole>().unwrap(), NodeRole::Rider);
        let err = "pilot".parse::<NodeRole>().unwrap_err();
        assert!(matches!(err, RidematchError::UnknownRole(ref s) if s == "pilot"));
    }

    #[test]
    fn role_counterpart() {
        assert_eq!(NodeRole::Driver.counterpart(), NodeRole::Rider);
        assert_eq!(NodeRole::Rider.counterpart(), NodeRole::Driver);
    }

    #[test]
    fn match_node_accessors() {
        let node = MatchNode::from(RideOffer::dummy("place_id:A", "place_id:D"));
        assert_eq!(node.role(), NodeRole::Driver);
        assert_eq!(node.origin().as_str(), "place_id:A");
        assert_eq!(node.destination().as_str(), "place_id:D");
    }

    #[test]
    fn match_node_serde_is_tagged() {
        let node = MatchNode::from(RideRequest::dummy("place_id:B", "place_id:C"));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"role\":\"rider\""), "Got: {json}");
        let back: MatchNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn seat_tracking() {
        let mut offer = RideOffer::dummy("place_id:A", "place_id:D");
        assert!(offer.has_free_seat());
        offer.available_seats = 0;
        assert!(!offer.has_free_seat());
    }
}
