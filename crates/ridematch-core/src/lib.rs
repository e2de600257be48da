//! # ridematch-core
//!
//! Ride-matching engine for the **RideMatch** system.
//!
//! - [`cost`]: detour cost of a (rider, driver) pair from the distance matrix
//! - [`MatchGraph`]: bipartite driver/rider graph with edges in both views
//! - [`top_k`]: cheapest counterparts of one node
//! - [`optimal_assignment`]: globally optimal one-to-one assignment
//!   (Kuhn-Munkres)
//! - [`digest`]: SHA-256 digest of the pool for restart verification
//! - [`MatchEngine`]: facade tying oracle, matrix and graph together
//!
//! ## Flow
//!
//! ```text
//! offer / request
//!   → LocationRegistry (new location?)
//!   → DistanceMatrixCache::extend (oracle, O(n))
//!   → MatchGraph (cost against every counterpart)
//!   → top_k(node, k) | optimal_assignment(drivers, riders)
//! ```

pub mod assignment;
pub mod cost;
pub mod digest;
pub mod engine;
pub mod graph;
pub mod ranker;

pub use assignment::{AssignedPair, Assignment, optimal_assignment};
pub use cost::{DetourCost, detour_cost};
pub use digest::{compute_pool_digest, digest_hex, verify_pool_digest};
pub use engine::{ConfirmedMatch, MatchEngine};
pub use graph::{Edge, MatchGraph};
pub use ranker::top_k;
