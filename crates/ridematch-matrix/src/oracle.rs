//! The distance/duration oracle the matrix cache delegates to.
//!
//! The engine never talks to a travel-time provider itself; the host injects
//! an implementation of [`DistanceOracle`] (an HTTP client for a routing
//! service, a precomputed table, ...). All three queries are blocking and
//! receive the caller's timeout. Unreachable pairs are reported as a
//! [`TravelLeg`] with `duration_seconds == 0`.

use std::{sync::Arc, time::Duration};

use ridematch_types::{Location, TravelLeg};
use thiserror::Error;

/// Failure reported by an oracle implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider could not be reached or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider gave up before the deadline elapsed.
    #[error("request timed out")]
    Timeout,
}

/// Pairwise travel-data provider.
///
/// Implementations must be `Send + Sync` so one oracle can serve several
/// matching pools.
pub trait DistanceOracle: Send + Sync {
    /// Full matrix: `result[i][j]` is the leg from `locations[i]` to
    /// `locations[j]`.
    fn all_pairs(
        &self,
        locations: &[Location],
        timeout: Duration,
    ) -> Result<Vec<Vec<TravelLeg>>, OracleError>;

    /// Row query: `result[j]` is the leg from `origin` to `destinations[j]`.
    fn one_to_many(
        &self,
        origin: &Location,
        destinations: &[Location],
        timeout: Duration,
    ) -> Result<Vec<TravelLeg>, OracleError>;

    /// Column query: `result[i]` is the leg from `origins[i]` to
    /// `destination`.
    fn many_to_one(
        &self,
        origins: &[Location],
        destination: &Location,
        timeout: Duration,
    ) -> Result<Vec<TravelLeg>, OracleError>;
}

impl<T: DistanceOracle + ?Sized> DistanceOracle for &T {
    fn all_pairs(
        &self,
        locations: &[Location],
        timeout: Duration,
    ) -> Result<Vec<Vec<TravelLeg>>, OracleError> {
        (**self).all_pairs(locations, timeout)
    }

    fn one_to_many(
        &self,
        origin: &Location,
        destinations: &[Location],
        timeout: Duration,
    ) -> Result<Vec<TravelLeg>, OracleError> {
        (**self).one_to_many(origin, destinations, timeout)
    }

    fn many_to_one(
        &self,
        origins: &[Location],
        destination: &Location,
        timeout: Duration,
    ) -> Result<Vec<TravelLeg>, OracleError> {
        (**self).many_to_one(origins, destination, timeout)
    }
}

impl<T: DistanceOracle + ?Sized> DistanceOracle for Arc<T> {
    fn all_pairs(
        &self,
        locations: &[Location],
        timeout: Duration,
    ) -> Result<Vec<Vec<TravelLeg>>, OracleError> {
        (**self).all_pairs(locations, timeout)
    }

    fn one_to_many(
        &self,
        origin: &Location,
        destinations: &[Location],
        timeout: Duration,
    ) -> Result<Vec<TravelLeg>, OracleError> {
        (**self).one_to_many(origin, destinations, timeout)
    }

    fn many_to_one(
        &self,
        origins: &[Location],
        destination: &Location,
        timeout: Duration,
    ) -> Result<Vec<TravelLeg>, OracleError> {
        (**self).many_to_one(origins, destination, timeout)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use table::TableOracle;

/// In-memory oracle for tests.
#[cfg(any(test, feature = "test-helpers"))]
mod table {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use ridematch_types::{Location, TravelLeg};

    use super::{DistanceOracle, OracleError};

    /// Directed lookup table with call counting, failure injection and an
    /// optional artificial delay.
    ///
    /// Pairs missing from the table are reported as unreachable.
    #[derive(Debug, Default)]
    pub struct TableOracle {
        legs: HashMap<(String, String), TravelLeg>,
        calls: AtomicUsize,
        failures_pending: AtomicUsize,
        delay: Mutex<Option<Duration>>,
    }

    impl TableOracle {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a directed leg.
        #[must_use]
        pub fn with_leg(mut self, from: &str, to: &str, meters: u64, seconds: u64) -> Self {
            self.legs.insert(
                (from.to_string(), to.to_string()),
                TravelLeg::new(meters, seconds),
            );
            self
        }

        /// Add the same leg in both directions.
        #[must_use]
        pub fn with_symmetric_leg(self, a: &str, b: &str, meters: u64, seconds: u64) -> Self {
            self.with_leg(a, b, meters, seconds)
                .with_leg(b, a, meters, seconds)
        }

        /// Make the next `n` requests fail with a 503 status.
        pub fn fail_next(&self, n: usize) {
            self.failures_pending.store(n, Ordering::SeqCst);
        }

        /// Sleep this long inside every request.
        ///
        /// # Panics
        /// Panics if the delay mutex is poisoned.
        pub fn set_delay(&self, delay: Option<Duration>) {
            *self.delay.lock().expect("delay lock") = delay;
        }

        /// Number of requests answered or failed so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// The leg this table reports for `from -> to`.
        pub fn leg(&self, from: &Location, to: &Location) -> TravelLeg {
            if from == to {
                return TravelLeg::ZERO;
            }
            self.legs
                .get(&(from.as_str().to_string(), to.as_str().to_string()))
                .copied()
                .unwrap_or(TravelLeg::ZERO)
        }

        fn begin_call(&self) -> Result<(), OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.delay.lock().expect("delay lock");
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
            let failing = self
                .failures_pending
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(OracleError::Status {
                    status: 503,
                    message: "injected failure".to_string(),
                });
            }
            Ok(())
        }
    }

    impl DistanceOracle for TableOracle {
        fn all_pairs(
            &self,
            locations: &[Location],
            _timeout: Duration,
        ) -> Result<Vec<Vec<TravelLeg>>, OracleError> {
            self.begin_call()?;
            Ok(locations
                .iter()
                .map(|from| locations.iter().map(|to| self.leg(from, to)).collect())
                .collect())
        }

        fn one_to_many(
            &self,
            origin: &Location,
            destinations: &[Location],
            _timeout: Duration,
        ) -> Result<Vec<TravelLeg>, OracleError> {
            self.begin_call()?;
            Ok(destinations.iter().map(|to| self.leg(origin, to)).collect())
        }

        fn many_to_one(
            &self,
            origins: &[Location],
            destination: &Location,
            _timeout: Duration,
        ) -> Result<Vec<TravelLeg>, OracleError> {
            self.begin_call()?;
            Ok(origins.iter().map(|from| self.leg(from, destination)).collect())
        }
    }
}
