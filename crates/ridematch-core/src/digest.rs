//! Pool state digest.
//!
//! A host that rebuilds the engine on restart from its persisted offers and
//! requests can compare digests to confirm the reconstruction reproduced the
//! same pool. The digest covers:
//! - driver and rider handles with their record ids, locations and seats
//! - every edge with the exact bits of its costs
//!
//! all in insertion order.

use ridematch_types::Location;
use sha2::{Digest, Sha256};

use crate::graph::MatchGraph;

const DOMAIN: &[u8] = b"ridematch:pool:v1:";

/// Compute the SHA-256 digest of a match graph.
#[must_use]
pub fn compute_pool_digest(graph: &MatchGraph) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);

    hasher.update((graph.driver_count() as u64).to_le_bytes());
    for (key, offer) in graph.drivers() {
        hasher.update(key.0.to_le_bytes());
        hasher.update(offer.id.0.as_bytes());
        update_location(&mut hasher, &offer.origin);
        update_location(&mut hasher, &offer.destination);
        hasher.update([offer.available_seats]);
    }

    hasher.update((graph.rider_count() as u64).to_le_bytes());
    for (key, request) in graph.riders() {
        hasher.update(key.0.to_le_bytes());
        hasher.update(request.id.0.as_bytes());
        update_location(&mut hasher, &request.origin);
        update_location(&mut hasher, &request.destination);
    }

    hasher.update((graph.edge_count() as u64).to_le_bytes());
    for (driver, _) in graph.drivers() {
        let Some(edges) = graph.driver_edges(driver) else {
            continue;
        };
        for (rider, cost) in edges {
            hasher.update(driver.0.to_le_bytes());
            hasher.update(rider.0.to_le_bytes());
            hasher.update(cost.total_cost.to_bits().to_le_bytes());
            hasher.update(cost.excess_travel_time.to_bits().to_le_bytes());
        }
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Recompute the digest and compare it with `expected`.
#[must_use]
pub fn verify_pool_digest(graph: &MatchGraph, expected: &[u8; 32]) -> bool {
    compute_pool_digest(graph) == *expected
}

/// Lowercase hex rendering for logs.
#[must_use]
pub fn digest_hex(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

/// Length-prefixed so adjacent identifiers cannot run together.
fn update_location(hasher: &mut Sha256, location: &Location) {
    let bytes = location.as_str().as_bytes();
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ridematch_matrix::{DistanceMatrixCache, TableOracle};
    use ridematch_types::{OfferId, RequestId, RideOffer, RideRequest};

    use super::*;

    fn matrix() -> DistanceMatrixCache {
        let oracle = TableOracle::new()
            .with_symmetric_leg("A", "B", 1000, 600)
            .with_symmetric_leg("A", "D", 3000, 1800)
            .with_symmetric_leg("B", "C", 1500, 900)
            .with_symmetric_leg("C", "D", 1000, 600);
        let locs: Vec<Location> = ["A", "B", "C", "D"]
            .iter()
            .map(|id| Location::dummy(id))
            .collect();
        let mut cache = DistanceMatrixCache::new();
        cache.initialize(&oracle, &locs, Duration::from_secs(1)).unwrap();
        cache
    }

    fn pool(offer: &RideOffer, request: &RideRequest) -> MatchGraph {
        let matrix = matrix();
        let mut graph = MatchGraph::new();
        graph.add_driver(offer.clone(), &matrix).unwrap();
        graph.add_rider(request.clone(), &matrix).unwrap();
        graph
    }

    #[test]
    fn empty_graph_is_deterministic() {
        let a = compute_pool_digest(&MatchGraph::new());
        let b = compute_pool_digest(&MatchGraph::new());
        assert_eq!(a, b);
        assert_eq!(digest_hex(&a).len(), 64);
    }

    #[test]
    fn same_records_same_digest() {
        let offer = RideOffer::dummy_with_seats(OfferId::from_bytes([1; 16]), "A", "D", 2);
        let request = RideRequest::dummy_with_id(RequestId::from_bytes([2; 16]), "B", "C");
        let first = compute_pool_digest(&pool(&offer, &request));
        let second = pool(&offer, &request);
        assert!(verify_pool_digest(&second, &first));
    }

    #[test]
    fn seat_change_changes_digest() {
        let offer = RideOffer::dummy_with_seats(OfferId::from_bytes([1; 16]), "A", "D", 2);
        let request = RideRequest::dummy_with_id(RequestId::from_bytes([2; 16]), "B", "C");
        let mut graph = pool(&offer, &request);
        let before = compute_pool_digest(&graph);
        let (driver, _) = graph.drivers().next().unwrap();
        graph.set_available_seats(driver, 1).unwrap();
        assert!(!verify_pool_digest(&graph, &before));
    }

    #[test]
    fn insertion_order_matters() {
        let offer = RideOffer::dummy_with_seats(OfferId::from_bytes([1; 16]), "A", "D", 2);
        let request = RideRequest::dummy_with_id(RequestId::from_bytes([2; 16]), "B", "C");
        let matrix = matrix();
        let mut reversed = MatchGraph::new();
        reversed.add_rider(request.clone(), &matrix).unwrap();
        reversed.add_driver(offer.clone(), &matrix).unwrap();
        assert_ne!(
            compute_pool_digest(&pool(&offer, &request)),
            compute_pool_digest(&reversed)
        );
    }
}
