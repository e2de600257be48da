//! Square matrix of travel legs between every pair of registered locations.
//!
//! Two ways to populate it:
//!
//! - [`DistanceMatrixCache::initialize`]: one all-pairs oracle request,
//!   replaces the whole matrix.
//! - [`DistanceMatrixCache::extend`]: one (or two, in
//!   [`ExtensionMode::Directed`]) O(n) oracle requests for a single new
//!   location, then the matrix grows by one row and one column. Existing
//!   cells are never touched.
//!
//! Both operations build the new data completely before mutating `self`, so
//! an oracle failure leaves registry and matrix in their last-good state.

use std::time::{Duration, Instant};

use ridematch_types::{ExtensionMode, Location, LocationIndex, Result, RidematchError, TravelLeg};

use crate::{DistanceOracle, LocationRegistry, OracleError, Registration};

/// Travel-leg matrix indexed by registry position.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrixCache {
    registry: LocationRegistry,
    /// `rows[from][to]`; always `registry.len()` × `registry.len()`.
    rows: Vec<Vec<TravelLeg>>,
}

impl DistanceMatrixCache {
    /// An empty cache covering no locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Replace the matrix with one all-pairs oracle request.
    ///
    /// Duplicate locations are collapsed (first occurrence wins). The
    /// diagonal is forced to zero whatever the oracle reports.
    pub fn initialize<O: DistanceOracle + ?Sized>(
        &mut self,
        oracle: &O,
        locations: &[Location],
        timeout: Duration,
    ) -> Result<()> {
        let registry = LocationRegistry::from_locations(locations);
        let n = registry.len();

        let mut rows = if n == 0 {
            Vec::new()
        } else {
            timed(timeout, || oracle.all_pairs(registry.as_slice(), timeout))?
        };

        if rows.len() != n {
            return Err(malformed(n, rows.len()));
        }
        for row in &rows {
            if row.len() != n {
                return Err(malformed(n, row.len()));
            }
        }
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = TravelLeg::ZERO;
        }

        tracing::info!(locations = n, "Distance matrix initialized");

        self.registry = registry;
        self.rows = rows;
        Ok(())
    }

    /// Make sure `location` is covered by the matrix, returning its index.
    ///
    /// A known location costs nothing. A new one costs one oracle request in
    /// [`ExtensionMode::Mirrored`] and two in [`ExtensionMode::Directed`];
    /// the matrix then grows by one row and one column with a zero diagonal.
    pub fn extend<O: DistanceOracle + ?Sized>(
        &mut self,
        oracle: &O,
        location: &Location,
        mode: ExtensionMode,
        timeout: Duration,
    ) -> Result<LocationIndex> {
        if let Some(idx) = self.registry.index_of(location) {
            return Ok(idx);
        }

        let existing = self.registry.as_slice();
        let n = existing.len();

        let (outbound, inbound) = if n == 0 {
            (Vec::new(), Vec::new())
        } else {
            let outbound = timed(timeout, || oracle.one_to_many(location, existing, timeout))?;
            if outbound.len() != n {
                return Err(malformed(n, outbound.len()));
            }
            let inbound = match mode {
                ExtensionMode::Directed => {
                    let inbound =
                        timed(timeout, || oracle.many_to_one(existing, location, timeout))?;
                    if inbound.len() != n {
                        return Err(malformed(n, inbound.len()));
                    }
                    inbound
                }
                ExtensionMode::Mirrored => outbound.clone(),
            };
            (outbound, inbound)
        };

        // Commit: nothing below can fail.
        let Registration::Inserted(idx) = self.registry.register(location.clone()) else {
            return Err(RidematchError::Internal(format!(
                "location {location} registered concurrently with extension"
            )));
        };
        for (row, leg) in self.rows.iter_mut().zip(inbound) {
            row.push(leg);
        }
        let mut new_row = outbound;
        new_row.push(TravelLeg::ZERO);
        self.rows.push(new_row);

        tracing::debug!(
            location = %location,
            index = idx.0,
            size = self.rows.len(),
            mode = ?mode,
            "Distance matrix extended"
        );
        Ok(idx)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// O(1) read of the leg `from -> to`.
    ///
    /// # Errors
    /// - `UnknownLocation` if either index is out of bounds
    /// - `Unreachable` if the oracle reported no route between two distinct
    ///   locations (zero duration)
    pub fn lookup(&self, from: LocationIndex, to: LocationIndex) -> Result<TravelLeg> {
        let row = self
            .rows
            .get(from.0)
            .ok_or(RidematchError::UnknownLocation(from))?;
        let leg = row
            .get(to.0)
            .copied()
            .ok_or(RidematchError::UnknownLocation(to))?;
        if from != to && leg.is_unreachable() {
            return Err(RidematchError::Unreachable { from, to });
        }
        Ok(leg)
    }

    /// Matrix index of a location.
    ///
    /// # Errors
    /// `MissingMatrixEntry` if the location was never registered.
    pub fn index_of(&self, location: &Location) -> Result<LocationIndex> {
        self.registry
            .index_of(location)
            .ok_or_else(|| RidematchError::MissingMatrixEntry {
                location: location.to_string(),
            })
    }

    /// Leg between two locations by identifier.
    pub fn lookup_locations(&self, from: &Location, to: &Location) -> Result<TravelLeg> {
        self.lookup(self.index_of(from)?, self.index_of(to)?)
    }

    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.registry.contains(location)
    }

    #[must_use]
    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Number of locations (the matrix dimension).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every leg equals its reverse.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let n = self.rows.len();
        (0..n).all(|i| ((i + 1)..n).all(|j| self.rows[i][j] == self.rows[j][i]))
    }
}

/// Run one oracle request, translating failures and enforcing the deadline.
///
/// A response that arrives after `timeout` is discarded.
fn timed<T>(timeout: Duration, call: impl FnOnce() -> std::result::Result<T, OracleError>) -> Result<T> {
    let started = Instant::now();
    let outcome = call();
    let elapsed = started.elapsed();
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(_) if elapsed > timeout => {
            tracing::warn!(elapsed_ms, timeout_ms, "Distance oracle answered after deadline");
            Err(RidematchError::OracleTimeout {
                elapsed_ms,
                timeout_ms,
            })
        }
        Ok(value) => Ok(value),
        Err(OracleError::Timeout) => {
            tracing::warn!(elapsed_ms, timeout_ms, "Distance oracle timed out");
            Err(RidematchError::OracleTimeout {
                elapsed_ms,
                timeout_ms,
            })
        }
        Err(err) => {
            tracing::warn!(error = %err, elapsed_ms, "Distance oracle request failed");
            Err(RidematchError::OracleFailure {
                reason: err.to_string(),
            })
        }
    }
}

fn malformed(expected: usize, actual: usize) -> RidematchError {
    tracing::warn!(expected, actual, "Distance oracle returned a malformed response");
    RidematchError::MalformedOracleResponse { expected, actual }
}
