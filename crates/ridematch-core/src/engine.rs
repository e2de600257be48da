//! The matching engine: one oracle, one distance matrix, one match graph.
//!
//! [`MatchEngine`] is what the host application talks to. It keeps the
//! matrix and the graph in step:
//!
//! ```text
//! add_with_location(node)
//!   ├─ matrix.extend(origin)       (oracle call only for a new location)
//!   ├─ matrix.extend(destination)
//!   └─ graph.add_driver / add_rider (edges against every counterpart)
//! ```
//!
//! Mutations take `&mut self`; queries take `&self`. The engine holds no
//! durable state: on restart the host replays its persisted offers and
//! requests and may compare [`MatchEngine::digest`] values.

use ridematch_matrix::{DistanceMatrixCache, DistanceOracle};
use ridematch_types::{
    DriverKey, EngineConfig, Location, LocationIndex, MatchNode, NodeRef, OfferId, Result,
    RideOffer, RideRequest, RidematchError, RiderKey, constants,
};
use serde::{Deserialize, Serialize};

use crate::{
    assignment::{Assignment, optimal_assignment},
    cost::DetourCost,
    digest::{compute_pool_digest, digest_hex},
    graph::{Edge, MatchGraph},
    ranker::top_k,
};

/// Outcome of [`MatchEngine::confirm_match`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedMatch {
    pub driver: DriverKey,
    pub offer_id: OfferId,
    /// The request that left the pool.
    pub request: RideRequest,
    pub cost: DetourCost,
    /// Seats left on the offer after this rider.
    pub remaining_seats: u8,
    /// Whether the offer left the pool because it is now full.
    pub driver_removed: bool,
}

/// Ride-matching engine for one pool.
#[derive(Debug)]
pub struct MatchEngine<O> {
    oracle: O,
    config: EngineConfig,
    matrix: DistanceMatrixCache,
    graph: MatchGraph,
}

impl<O: DistanceOracle> MatchEngine<O> {
    /// Create an empty engine.
    ///
    /// # Errors
    /// `Configuration` if `config` does not validate.
    pub fn new(oracle: O, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            oracle_timeout_ms = config.oracle_timeout_ms,
            extension_mode = ?config.extension_mode,
            "Match engine created"
        );
        Ok(Self {
            oracle,
            config,
            matrix: DistanceMatrixCache::new(),
            graph: MatchGraph::new(),
        })
    }

    // =================================================================
    // Matrix
    // =================================================================

    /// Rebuild the distance matrix from scratch with one all-pairs request.
    ///
    /// Locations referenced by nodes already in the pool are kept (appended
    /// after `locations`) and every edge is recomputed against the new
    /// matrix. On failure both matrix and graph keep their previous state.
    pub fn initialize(&mut self, locations: &[Location]) -> Result<()> {
        let mut all = locations.to_vec();
        all.extend(self.graph.locations_in_use());

        let mut matrix = DistanceMatrixCache::new();
        matrix.initialize(&self.oracle, &all, self.config.oracle_timeout())?;
        self.graph.rebuild_edges(&matrix)?;
        self.matrix = matrix;

        tracing::info!(
            locations = self.matrix.len(),
            drivers = self.graph.driver_count(),
            riders = self.graph.rider_count(),
            "Match engine initialized"
        );
        Ok(())
    }

    /// Register `location` and extend the matrix if it is new.
    pub fn ensure_location(&mut self, location: &Location) -> Result<LocationIndex> {
        self.matrix.extend(
            &self.oracle,
            location,
            self.config.extension_mode,
            self.config.oracle_timeout(),
        )
    }

    // =================================================================
    // Pool mutation
    // =================================================================

    /// Add an offer or request, first extending the matrix for any new
    /// origin or destination.
    ///
    /// If the destination extension fails after the origin succeeded, the
    /// origin stays in the matrix; the node itself is not added.
    pub fn add_with_location(&mut self, node: MatchNode) -> Result<NodeRef> {
        self.ensure_location(node.origin())?;
        self.ensure_location(node.destination())?;
        match node {
            MatchNode::Driver(offer) => self.add_driver(offer).map(NodeRef::Driver),
            MatchNode::Rider(request) => self.add_rider(request).map(NodeRef::Rider),
        }
    }

    /// Add an offer whose locations are already in the matrix.
    pub fn add_driver(&mut self, offer: RideOffer) -> Result<DriverKey> {
        self.graph.add_driver(offer, &self.matrix)
    }

    /// Add a request whose locations are already in the matrix.
    pub fn add_rider(&mut self, request: RideRequest) -> Result<RiderKey> {
        self.graph.add_rider(request, &self.matrix)
    }

    /// Remove a node and its edges, returning its record.
    pub fn remove_node(&mut self, node: NodeRef) -> Result<MatchNode> {
        self.graph.remove_node(node)
    }

    /// Seat `rider` in `driver`'s car.
    ///
    /// Takes one seat from the offer and removes the rider from the pool. The
    /// offer leaves the pool once its last seat is taken.
    ///
    /// # Errors
    /// - `NodeNotFound` if either handle is unknown
    /// - `NoEdge` if the pair is incompatible
    /// - `NoSeatsAvailable` if the offer is already full
    pub fn confirm_match(&mut self, driver: DriverKey, rider: RiderKey) -> Result<ConfirmedMatch> {
        let offer = self
            .graph
            .driver(driver)
            .ok_or(RidematchError::NodeNotFound(driver.into()))?;
        if self.graph.rider(rider).is_none() {
            return Err(RidematchError::NodeNotFound(rider.into()));
        }
        let cost = self
            .graph
            .pair_cost(driver, rider)
            .ok_or(RidematchError::NoEdge {
                driver: driver.into(),
                rider: rider.into(),
            })?;
        let Some(remaining_seats) = offer.available_seats.checked_sub(1) else {
            return Err(RidematchError::NoSeatsAvailable(driver.into()));
        };
        let offer_id = offer.id;

        self.graph.set_available_seats(driver, remaining_seats)?;
        let request = self.graph.remove_rider(rider)?;
        let driver_removed = remaining_seats == 0;
        if driver_removed {
            self.graph.remove_driver(driver)?;
        }

        tracing::info!(
            %driver,
            %rider,
            offer = %offer_id,
            request = %request.id,
            remaining_seats,
            cost = cost.total_cost,
            "Match confirmed"
        );
        Ok(ConfirmedMatch {
            driver,
            offer_id,
            request,
            cost,
            remaining_seats,
            driver_removed,
        })
    }

    // =================================================================
    // Ranking
    // =================================================================

    /// The `k` cheapest counterparts of `node`, ascending by cost.
    pub fn top_k(&self, node: NodeRef, k: usize) -> Result<Vec<Edge>> {
        top_k(&self.graph, node, k)
    }

    /// [`MatchEngine::top_k`] with the configured default `k`.
    pub fn top_k_default(&self, node: NodeRef) -> Result<Vec<Edge>> {
        top_k(&self.graph, node, self.config.default_top_k)
    }

    /// Optimal one-to-one assignment between the given nodes.
    pub fn optimal_assignment(
        &self,
        drivers: &[DriverKey],
        riders: &[RiderKey],
    ) -> Result<Assignment> {
        optimal_assignment(&self.graph, drivers, riders)
    }

    /// Optimal assignment over every rider and every driver with a free seat.
    pub fn optimal_assignment_all(&self) -> Result<Assignment> {
        let drivers: Vec<DriverKey> = self
            .graph
            .drivers()
            .filter(|(_, offer)| offer.has_free_seat())
            .map(|(key, _)| key)
            .collect();
        let riders: Vec<RiderKey> = self.graph.riders().map(|(key, _)| key).collect();
        optimal_assignment(&self.graph, &drivers, &riders)
    }

    // =================================================================
    // Inspection
    // =================================================================

    /// SHA-256 digest of the pool state.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let digest = compute_pool_digest(&self.graph);
        tracing::debug!(digest = %digest_hex(&digest), "Pool digest computed");
        digest
    }

    #[must_use]
    pub fn graph(&self) -> &MatchGraph {
        &self.graph
    }

    #[must_use]
    pub fn matrix(&self) -> &DistanceMatrixCache {
        &self.matrix
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}
