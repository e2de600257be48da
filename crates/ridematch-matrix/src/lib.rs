//! # ridematch-matrix
//!
//! **Travel-data plane for RideMatch.**
//!
//! Keeps a deduplicated, ordered set of known locations and a square matrix
//! of [`TravelLeg`](ridematch_types::TravelLeg)s between every pair of them.
//!
//! - **LocationRegistry**: assigns each location a stable matrix index
//! - **DistanceOracle**: the injected collaborator that answers travel queries
//! - **DistanceMatrixCache**: bulk initialization plus O(n) incremental
//!   extension; every mutation is atomic with respect to oracle failures
//!
//! ```text
//! register(location) ─┬─ Existing(idx) → no oracle call
//!                     └─ Inserted(idx) → oracle.one_to_many / many_to_one
//!                                       → grow matrix by one row + column
//! ```

pub mod cache;
pub mod oracle;
pub mod registry;

pub use cache::DistanceMatrixCache;
pub use oracle::{DistanceOracle, OracleError};
pub use registry::{LocationRegistry, Registration};

#[cfg(any(test, feature = "test-helpers"))]
pub use oracle::TableOracle;
