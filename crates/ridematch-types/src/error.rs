//! Error types for the RideMatch engine.
//!
//! All errors use the `RM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Location / matrix lookup errors
//! - 2xx: Distance oracle errors
//! - 3xx: Match graph errors
//! - 4xx: Assignment errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{LocationIndex, NodeRef};

/// Central error enum for all RideMatch operations.
#[derive(Debug, Error)]
pub enum RidematchError {
    // =================================================================
    // Location Errors (1xx)
    // =================================================================
    /// The location identifier is empty or malformed.
    #[error("RM_ERR_100: Invalid location: {reason}")]
    InvalidLocation { reason: String },

    /// A matrix index is out of bounds (location never registered).
    #[error("RM_ERR_101: Unknown location index: {0}")]
    UnknownLocation(LocationIndex),

    /// A node references a location that has no row in the distance matrix.
    #[error("RM_ERR_102: Missing matrix entry for location {location}")]
    MissingMatrixEntry { location: String },

    // =================================================================
    // Oracle Errors (2xx)
    // =================================================================
    /// The distance oracle reported a failure.
    #[error("RM_ERR_200: Distance oracle failure: {reason}")]
    OracleFailure { reason: String },

    /// The distance oracle did not answer within the configured timeout.
    #[error("RM_ERR_201: Distance oracle timed out after {elapsed_ms}ms (limit {timeout_ms}ms)")]
    OracleTimeout { elapsed_ms: u64, timeout_ms: u64 },

    /// The oracle answered with a response of the wrong shape.
    #[error("RM_ERR_202: Malformed oracle response: expected {expected} legs, got {actual}")]
    MalformedOracleResponse { expected: usize, actual: usize },

    // =================================================================
    // Graph Errors (3xx)
    // =================================================================
    /// The node is not (or no longer) part of the match graph.
    #[error("RM_ERR_300: Node not found: {0}")]
    NodeNotFound(NodeRef),

    /// The role string supplied by the host is neither driver nor rider.
    #[error("RM_ERR_301: Unknown node role: {0}")]
    UnknownRole(String),

    /// A travel leg between two distinct locations is unreachable.
    #[error("RM_ERR_302: Unreachable leg: {from} -> {to}")]
    Unreachable { from: LocationIndex, to: LocationIndex },

    /// The driver and rider have no compatible edge.
    #[error("RM_ERR_303: No edge between {driver} and {rider}")]
    NoEdge { driver: NodeRef, rider: NodeRef },

    /// The offer has no seats left to confirm another rider.
    #[error("RM_ERR_304: No seats available on {0}")]
    NoSeatsAvailable(NodeRef),

    // =================================================================
    // Assignment Errors (4xx)
    // =================================================================
    /// The assignment solver could not run on the given cost matrix.
    #[error("RM_ERR_400: Assignment failed: {reason}")]
    AssignmentFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("RM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("RM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("RM_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl RidematchError {
    /// Whether the host may retry the failed operation unchanged.
    ///
    /// Oracle failures leave the engine in its last-good state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OracleFailure { .. }
                | Self::OracleTimeout { .. }
                | Self::MalformedOracleResponse { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RidematchError>;

impl From<serde_json::Error> for RidematchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverKey;

    #[test]
    fn error_display_contains_prefix() {
        let err = RidematchError::UnknownLocation(LocationIndex(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("RM_ERR_101"), "Got: {msg}");
        assert!(msg.contains('7'));
    }

    #[test]
    fn oracle_timeout_display() {
        let err = RidematchError::OracleTimeout {
            elapsed_ms: 1500,
            timeout_ms: 1000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("RM_ERR_201"));
        assert!(msg.contains("1500"));
        assert!(msg.contains("1000"));
    }

    #[test]
    fn node_not_found_names_the_node() {
        let err = RidematchError::NodeNotFound(NodeRef::Driver(DriverKey(3)));
        assert_eq!(format!("{err}"), "RM_ERR_300: Node not found: driver#3");
    }

    #[test]
    fn only_oracle_errors_are_retryable() {
        assert!(RidematchError::OracleFailure { reason: "503".into() }.is_retryable());
        assert!(
            RidematchError::OracleTimeout {
                elapsed_ms: 1,
                timeout_ms: 1
            }
            .is_retryable()
        );
        assert!(!RidematchError::UnknownRole("pilot".into()).is_retryable());
        assert!(!RidematchError::Internal("x".into()).is_retryable());
    }

    #[test]
    fn all_errors_have_rm_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(RidematchError::InvalidLocation {
                reason: "empty".into(),
            }),
            Box::new(RidematchError::MissingMatrixEntry {
                location: "place_id:x".into(),
            }),
            Box::new(RidematchError::MalformedOracleResponse {
                expected: 4,
                actual: 3,
            }),
            Box::new(RidematchError::AssignmentFailed {
                reason: "overflow".into(),
            }),
            Box::new(RidematchError::Configuration("bad".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("RM_ERR_"),
                "Error missing RM_ERR_ prefix: {msg}"
            );
        }
    }
}
