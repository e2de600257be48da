//! Pairwise travel data reported by the distance oracle.

use serde::{Deserialize, Serialize};

/// Distance and duration of travelling from one location to another.
///
/// The oracle signals an unreachable pair with `duration_seconds == 0`;
/// `distance_meters` is only meaningful when the duration is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TravelLeg {
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl TravelLeg {
    /// The leg from a location to itself.
    pub const ZERO: Self = Self {
        distance_meters: 0,
        duration_seconds: 0,
    };

    #[must_use]
    pub const fn new(distance_meters: u64, duration_seconds: u64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
        }
    }

    /// Whether the oracle encoded this leg as unreachable.
    ///
    /// Only meaningful between two distinct locations: the diagonal is
    /// always zero.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        self.duration_seconds == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_leg_is_default() {
        assert_eq!(TravelLeg::ZERO, TravelLeg::default());
        assert!(TravelLeg::ZERO.is_unreachable());
    }

    #[test]
    fn positive_duration_is_reachable() {
        let leg = TravelLeg::new(1000, 600);
        assert!(!leg.is_unreachable());
        assert_eq!(leg.distance_meters, 1000);
    }
}
