//! System-wide constants for the RideMatch engine.

/// Maximum length of a location identifier in bytes.
///
/// Matches the width of the origin/destination columns of persisted
/// offers and requests.
pub const MAX_LOCATION_LEN: usize = 200;

/// Seconds per minute, used to express detour costs in minutes.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Default timeout for a single distance-oracle request in milliseconds.
pub const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 10_000;

/// Default number of candidates returned by a ranking query.
pub const DEFAULT_TOP_K: usize = 5;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "RideMatch";
