//! The bipartite driver/rider cost graph.
//!
//! Nodes live in an arena keyed by stable handles ([`DriverKey`],
//! [`RiderKey`]) drawn from one monotonically increasing sequence, so map
//! order is insertion order and a removed handle is never reused.
//!
//! Edges are stored twice, once per endpoint:
//! - **Driver view**: `BTreeMap<DriverKey, BTreeMap<RiderKey, DetourCost>>`
//! - **Rider view**: `BTreeMap<RiderKey, BTreeMap<DriverKey, DetourCost>>`
//!
//! Every mutation updates both views together; [`MatchGraph::check_consistency`]
//! verifies that each edge appears in both with the identical cost.

use std::collections::{BTreeMap, HashMap};

use ridematch_matrix::DistanceMatrixCache;
use ridematch_types::{
    DriverKey, Location, MatchNode, NodeRef, OfferId, RequestId, Result, RideOffer, RideRequest,
    RidematchError, RiderKey,
};
use serde::{Deserialize, Serialize};

use crate::cost::{DetourCost, detour_cost};

/// An edge as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// The node on the other side.
    pub counterpart: NodeRef,
    /// Total detour cost in minutes.
    pub cost: f64,
    /// Excess travel time in minutes.
    pub excess_travel_time: f64,
}

impl Edge {
    fn new(counterpart: NodeRef, cost: &DetourCost) -> Self {
        Self {
            counterpart,
            cost: cost.total_cost,
            excess_travel_time: cost.excess_travel_time,
        }
    }
}

type DriverAdjacency = BTreeMap<DriverKey, BTreeMap<RiderKey, DetourCost>>;
type RiderAdjacency = BTreeMap<RiderKey, BTreeMap<DriverKey, DetourCost>>;

/// Owner of every driver node, rider node and edge in one matching pool.
#[derive(Debug, Clone, Default)]
pub struct MatchGraph {
    drivers: BTreeMap<DriverKey, RideOffer>,
    riders: BTreeMap<RiderKey, RideRequest>,
    /// Fast lookup: `OfferId -> DriverKey` for idempotent insertion.
    offer_index: HashMap<OfferId, DriverKey>,
    /// Fast lookup: `RequestId -> RiderKey` for idempotent insertion.
    request_index: HashMap<RequestId, RiderKey>,
    driver_adj: DriverAdjacency,
    rider_adj: RiderAdjacency,
    next_seq: u64,
}

impl MatchGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Add a driver and connect it to every existing rider.
    ///
    /// Idempotent by offer id: re-adding returns the existing handle and
    /// creates no edges. All costs are computed before anything is stored,
    /// so a lookup failure leaves the graph untouched.
    pub fn add_driver(&mut self, offer: RideOffer, matrix: &DistanceMatrixCache) -> Result<DriverKey> {
        if let Some(&key) = self.offer_index.get(&offer.id) {
            tracing::debug!(offer = %offer.id, driver = %key, "Driver already in pool");
            return Ok(key);
        }
        matrix.index_of(&offer.origin)?;
        matrix.index_of(&offer.destination)?;

        let mut edges = BTreeMap::new();
        for (&rider_key, request) in &self.riders {
            if let Some(cost) = edge_cost(matrix, request, &offer)? {
                edges.insert(rider_key, cost);
            }
        }

        let key = DriverKey(self.next_sequence());
        for (rider_key, cost) in &edges {
            self.rider_adj.entry(*rider_key).or_default().insert(key, *cost);
        }
        tracing::info!(
            driver = %key,
            offer = %offer.id,
            edges = edges.len(),
            "Driver added to pool"
        );
        self.offer_index.insert(offer.id, key);
        self.drivers.insert(key, offer);
        self.driver_adj.insert(key, edges);
        Ok(key)
    }

    /// Add a rider and connect it to every existing driver.
    ///
    /// Same idempotency and atomicity as [`MatchGraph::add_driver`].
    pub fn add_rider(&mut self, request: RideRequest, matrix: &DistanceMatrixCache) -> Result<RiderKey> {
        if let Some(&key) = self.request_index.get(&request.id) {
            tracing::debug!(request = %request.id, rider = %key, "Rider already in pool");
            return Ok(key);
        }
        matrix.index_of(&request.origin)?;
        matrix.index_of(&request.destination)?;

        let mut edges = BTreeMap::new();
        for (&driver_key, offer) in &self.drivers {
            if let Some(cost) = edge_cost(matrix, &request, offer)? {
                edges.insert(driver_key, cost);
            }
        }

        let key = RiderKey(self.next_sequence());
        for (driver_key, cost) in &edges {
            self.driver_adj.entry(*driver_key).or_default().insert(key, *cost);
        }
        tracing::info!(
            rider = %key,
            request = %request.id,
            edges = edges.len(),
            "Rider added to pool"
        );
        self.request_index.insert(request.id, key);
        self.riders.insert(key, request);
        self.rider_adj.insert(key, edges);
        Ok(key)
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // =================================================================
    // Removal
    // =================================================================

    /// Remove a driver and every incident edge. Returns the offer.
    pub fn remove_driver(&mut self, key: DriverKey) -> Result<RideOffer> {
        let offer = self
            .drivers
            .remove(&key)
            .ok_or(RidematchError::NodeNotFound(key.into()))?;
        self.offer_index.remove(&offer.id);
        let edges = self.driver_adj.remove(&key).unwrap_or_default();
        for rider_key in edges.keys() {
            if let Some(adj) = self.rider_adj.get_mut(rider_key) {
                adj.remove(&key);
            }
        }
        tracing::info!(driver = %key, offer = %offer.id, edges = edges.len(), "Driver removed from pool");
        Ok(offer)
    }

    /// Remove a rider and every incident edge. Returns the request.
    pub fn remove_rider(&mut self, key: RiderKey) -> Result<RideRequest> {
        let request = self
            .riders
            .remove(&key)
            .ok_or(RidematchError::NodeNotFound(key.into()))?;
        self.request_index.remove(&request.id);
        let edges = self.rider_adj.remove(&key).unwrap_or_default();
        for driver_key in edges.keys() {
            if let Some(adj) = self.driver_adj.get_mut(driver_key) {
                adj.remove(&key);
            }
        }
        tracing::info!(rider = %key, request = %request.id, edges = edges.len(), "Rider removed from pool");
        Ok(request)
    }

    /// Remove either kind of node.
    pub fn remove_node(&mut self, node: NodeRef) -> Result<MatchNode> {
        match node {
            NodeRef::Driver(key) => self.remove_driver(key).map(MatchNode::Driver),
            NodeRef::Rider(key) => self.remove_rider(key).map(MatchNode::Rider),
        }
    }

    // =================================================================
    // Maintenance
    // =================================================================

    /// Recompute every edge against a new matrix.
    ///
    /// Used after the matrix is re-initialized. Atomic: on failure the
    /// existing edges are kept.
    pub fn rebuild_edges(&mut self, matrix: &DistanceMatrixCache) -> Result<()> {
        let mut driver_adj: DriverAdjacency = self.drivers.keys().map(|&k| (k, BTreeMap::new())).collect();
        let mut rider_adj: RiderAdjacency = self.riders.keys().map(|&k| (k, BTreeMap::new())).collect();

        for (&driver_key, offer) in &self.drivers {
            for (&rider_key, request) in &self.riders {
                if let Some(cost) = edge_cost(matrix, request, offer)? {
                    driver_adj.entry(driver_key).or_default().insert(rider_key, cost);
                    rider_adj.entry(rider_key).or_default().insert(driver_key, cost);
                }
            }
        }

        self.driver_adj = driver_adj;
        self.rider_adj = rider_adj;
        tracing::info!(
            drivers = self.drivers.len(),
            riders = self.riders.len(),
            edges = self.edge_count(),
            "Edges rebuilt"
        );
        Ok(())
    }

    /// Update the free seats of an offer.
    pub fn set_available_seats(&mut self, key: DriverKey, seats: u8) -> Result<()> {
        let offer = self
            .drivers
            .get_mut(&key)
            .ok_or(RidematchError::NodeNotFound(key.into()))?;
        offer.available_seats = seats;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn driver(&self, key: DriverKey) -> Option<&RideOffer> {
        self.drivers.get(&key)
    }

    #[must_use]
    pub fn rider(&self, key: RiderKey) -> Option<&RideRequest> {
        self.riders.get(&key)
    }

    #[must_use]
    pub fn driver_key(&self, offer: &OfferId) -> Option<DriverKey> {
        self.offer_index.get(offer).copied()
    }

    #[must_use]
    pub fn rider_key(&self, request: &RequestId) -> Option<RiderKey> {
        self.request_index.get(request).copied()
    }

    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Driver(key) => self.drivers.contains_key(&key),
            NodeRef::Rider(key) => self.riders.contains_key(&key),
        }
    }

    /// Drivers in insertion order.
    pub fn drivers(&self) -> impl Iterator<Item = (DriverKey, &RideOffer)> {
        self.drivers.iter().map(|(&k, offer)| (k, offer))
    }

    /// Riders in insertion order.
    pub fn riders(&self) -> impl Iterator<Item = (RiderKey, &RideRequest)> {
        self.riders.iter().map(|(&k, request)| (k, request))
    }

    #[must_use]
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    #[must_use]
    pub fn rider_count(&self) -> usize {
        self.riders.len()
    }

    /// Number of distinct (driver, rider) edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.driver_adj.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty() && self.riders.is_empty()
    }

    /// Cost of the edge between a driver and a rider, if they are compatible.
    #[must_use]
    pub fn pair_cost(&self, driver: DriverKey, rider: RiderKey) -> Option<DetourCost> {
        self.driver_adj.get(&driver)?.get(&rider).copied()
    }

    /// Riders adjacent to a driver, keyed in insertion order.
    #[must_use]
    pub fn driver_edges(&self, key: DriverKey) -> Option<&BTreeMap<RiderKey, DetourCost>> {
        self.driver_adj.get(&key)
    }

    /// Drivers adjacent to a rider, keyed in insertion order.
    #[must_use]
    pub fn rider_edges(&self, key: RiderKey) -> Option<&BTreeMap<DriverKey, DetourCost>> {
        self.rider_adj.get(&key)
    }

    /// All edges incident to a node, in counterpart insertion order.
    pub fn edges_of(&self, node: NodeRef) -> Result<Vec<Edge>> {
        match node {
            NodeRef::Driver(key) => {
                let adj = self
                    .driver_adj
                    .get(&key)
                    .ok_or(RidematchError::NodeNotFound(node))?;
                Ok(adj
                    .iter()
                    .map(|(&rider, cost)| Edge::new(rider.into(), cost))
                    .collect())
            }
            NodeRef::Rider(key) => {
                let adj = self
                    .rider_adj
                    .get(&key)
                    .ok_or(RidematchError::NodeNotFound(node))?;
                Ok(adj
                    .iter()
                    .map(|(&driver, cost)| Edge::new(driver.into(), cost))
                    .collect())
            }
        }
    }

    /// Every location referenced by a live node, in node order.
    #[must_use]
    pub fn locations_in_use(&self) -> Vec<Location> {
        let mut out = Vec::with_capacity(2 * (self.drivers.len() + self.riders.len()));
        for offer in self.drivers.values() {
            out.push(offer.origin.clone());
            out.push(offer.destination.clone());
        }
        for request in self.riders.values() {
            out.push(request.origin.clone());
            out.push(request.destination.clone());
        }
        out
    }

    /// Verify that both adjacency views hold exactly the same edges with
    /// bit-identical costs and only reference live nodes.
    #[must_use]
    pub fn check_consistency(&self) -> bool {
        let forward = self.edge_count();
        let backward: usize = self.rider_adj.values().map(BTreeMap::len).sum();
        if forward != backward {
            return false;
        }
        let driver_side_ok = self.driver_adj.iter().all(|(driver, edges)| {
            self.drivers.contains_key(driver)
                && edges.iter().all(|(rider, cost)| {
                    self.rider_adj
                        .get(rider)
                        .and_then(|adj| adj.get(driver))
                        .is_some_and(|back| same_bits(back, cost))
                })
        });
        let rider_side_ok = self
            .rider_adj
            .keys()
            .all(|rider| self.riders.contains_key(rider));
        driver_side_ok && rider_side_ok
    }
}

/// Cost of an edge, or `None` when some leg is unreachable.
fn edge_cost(
    matrix: &DistanceMatrixCache,
    request: &RideRequest,
    offer: &RideOffer,
) -> Result<Option<DetourCost>> {
    match detour_cost(matrix, request, offer) {
        Ok(cost) => Ok(Some(cost)),
        Err(RidematchError::Unreachable { from, to }) => {
            tracing::warn!(
                offer = %offer.id,
                request = %request.id,
                %from,
                %to,
                "Pair skipped: unreachable leg"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn same_bits(a: &DetourCost, b: &DetourCost) -> bool {
    a.total_cost.to_bits() == b.total_cost.to_bits()
        && a.excess_travel_time.to_bits() == b.excess_travel_time.to_bits()
}
