//! Detour cost of serving a rider with a driver's trip.
//!
//! With durations in seconds read from the distance matrix:
//!
//! ```text
//! a = driver.origin      -> rider.origin
//! b = driver.origin      -> driver.destination
//! c = rider.origin       -> rider.destination
//! d = rider.destination  -> driver.destination
//!
//! detour_from_src    = a / 60
//! detour_from_dest   = d / 60
//! excess_travel_time = (a + c + d - b) / 60
//! total_cost         = detour_from_src + detour_from_dest + excess_travel_time
//! ```
//!
//! Everything is in minutes. A negative total is possible when oracle noise
//! makes the rider-inclusive route look shorter than the direct one; it is
//! not clamped.

use ridematch_matrix::DistanceMatrixCache;
use ridematch_types::{Location, Result, RideOffer, RideRequest, constants};
use serde::{Deserialize, Serialize};

/// The cost components of one (rider, driver) pair, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetourCost {
    pub detour_from_src: f64,
    pub detour_from_dest: f64,
    pub excess_travel_time: f64,
    pub total_cost: f64,
}

impl DetourCost {
    /// Apply the detour formula to the four leg durations (seconds).
    #[must_use]
    pub fn from_durations(a: u64, b: u64, c: u64, d: u64) -> Self {
        let (a, b, c, d) = (a as f64, b as f64, c as f64, d as f64);
        let detour_from_src = a / constants::SECONDS_PER_MINUTE;
        let detour_from_dest = d / constants::SECONDS_PER_MINUTE;
        let excess_travel_time = (a + c + d - b) / constants::SECONDS_PER_MINUTE;
        Self {
            detour_from_src,
            detour_from_dest,
            excess_travel_time,
            total_cost: detour_from_src + detour_from_dest + excess_travel_time,
        }
    }
}

/// Compute the detour cost of `rider` joining `driver`.
///
/// # Errors
/// - `MissingMatrixEntry` if any of the four locations is not in the matrix
/// - `Unreachable` if a leg between two distinct locations has zero duration
pub fn detour_cost(
    matrix: &DistanceMatrixCache,
    rider: &RideRequest,
    driver: &RideOffer,
) -> Result<DetourCost> {
    let a = duration(matrix, &driver.origin, &rider.origin)?;
    let b = duration(matrix, &driver.origin, &driver.destination)?;
    let c = duration(matrix, &rider.origin, &rider.destination)?;
    let d = duration(matrix, &rider.destination, &driver.destination)?;
    Ok(DetourCost::from_durations(a, b, c, d))
}

fn duration(matrix: &DistanceMatrixCache, from: &Location, to: &Location) -> Result<u64> {
    Ok(matrix.lookup_locations(from, to)?.duration_seconds)
}
