//! Globally optimal one-to-one driver/rider assignment.
//!
//! Builds a rectangular weight matrix from the graph's existing edges and
//! solves it with the Kuhn-Munkres (Hungarian) algorithm from `pathfinding`.
//!
//! The solver maximizes total weight, so each feasible pair is weighted with
//! its negated cost in whole seconds (`total_cost * 60` is an integer for the
//! detour model). Pairs without an edge get a penalty large enough that
//! trading one of them for a feasible pair always pays off: the result has
//! the maximum number of compatible pairs, and among those the minimum total
//! cost. Penalized pairs are dropped from the output.

use std::collections::BTreeSet;

use pathfinding::kuhn_munkres::{Weights, kuhn_munkres};
use ridematch_types::{DriverKey, NodeRef, Result, RidematchError, RiderKey, constants};
use serde::{Deserialize, Serialize};

use crate::{cost::DetourCost, graph::MatchGraph};

/// One matched pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignedPair {
    pub driver: DriverKey,
    pub rider: RiderKey,
    pub cost: DetourCost,
}

/// Result of [`optimal_assignment`]: pairs ordered by driver handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub pairs: Vec<AssignedPair>,
    /// Sum of `total_cost` over all pairs, in minutes.
    pub total_cost: f64,
}

impl Assignment {
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The rider assigned to `driver`, if any.
    #[must_use]
    pub fn rider_for(&self, driver: DriverKey) -> Option<RiderKey> {
        self.pairs
            .iter()
            .find(|pair| pair.driver == driver)
            .map(|pair| pair.rider)
    }
}

/// Dense `i64` weight matrix for the solver.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|row| row.iter().map(|&w| w.saturating_neg()).collect())
                .collect(),
        )
    }
}

/// Minimum-cost maximum-cardinality assignment between the given drivers and
/// riders, using only edges already present in the graph.
///
/// Duplicate handles are ignored. An empty side, or a selection without any
/// edge, yields an empty assignment.
///
/// # Errors
/// - `NodeNotFound` if a handle is not in the graph
/// - `AssignmentFailed` if the costs are too large to solve exactly
pub fn optimal_assignment(
    graph: &MatchGraph,
    drivers: &[DriverKey],
    riders: &[RiderKey],
) -> Result<Assignment> {
    let drivers = distinct_known(drivers, |key| graph.driver(key).is_some(), NodeRef::Driver)?;
    let riders = distinct_known(riders, |key| graph.rider(key).is_some(), NodeRef::Rider)?;
    if drivers.is_empty() || riders.is_empty() {
        return Ok(Assignment::default());
    }

    let costs: Vec<Vec<Option<DetourCost>>> = drivers
        .iter()
        .map(|&driver| {
            riders
                .iter()
                .map(|&rider| graph.pair_cost(driver, rider))
                .collect()
        })
        .collect();
    let seconds: Vec<Vec<Option<i64>>> = costs
        .iter()
        .map(|row| row.iter().map(|cell| cell.map(|c| cost_seconds(&c))).collect())
        .collect();

    let mut pairs = Vec::new();
    for (row, col) in solve(&seconds)? {
        if let Some(cost) = costs[row][col] {
            pairs.push(AssignedPair {
                driver: drivers[row],
                rider: riders[col],
                cost,
            });
        }
    }
    pairs.sort_by_key(|pair| pair.driver);
    let total_cost = pairs.iter().map(|pair| pair.cost.total_cost).sum();

    tracing::info!(
        drivers = drivers.len(),
        riders = riders.len(),
        pairs = pairs.len(),
        total_cost,
        "Assignment solved"
    );
    Ok(Assignment { pairs, total_cost })
}

/// Deduplicate handles in key order and reject unknown ones.
fn distinct_known<K: Copy + Ord>(
    keys: &[K],
    exists: impl Fn(K) -> bool,
    to_ref: impl Fn(K) -> NodeRef,
) -> Result<Vec<K>> {
    let distinct: BTreeSet<K> = keys.iter().copied().collect();
    if let Some(&missing) = distinct.iter().find(|&&key| !exists(key)) {
        return Err(RidematchError::NodeNotFound(to_ref(missing)));
    }
    Ok(distinct.into_iter().collect())
}

#[allow(clippy::cast_possible_truncation)]
fn cost_seconds(cost: &DetourCost) -> i64 {
    (cost.total_cost * constants::SECONDS_PER_MINUTE).round() as i64
}

/// Solve a min-cost table where `None` marks an incompatible pair.
///
/// Returns `(row, col)` index pairs of compatible cells only.
fn solve(table: &[Vec<Option<i64>>]) -> Result<Vec<(usize, usize)>> {
    let rows = table.len();
    let cols = table.first().map_or(0, Vec::len);
    let max_abs = table
        .iter()
        .flatten()
        .flatten()
        .map(|cost| cost.unsigned_abs())
        .max();
    let Some(max_abs) = max_abs else {
        return Ok(Vec::new());
    };

    let transposed = rows > cols;
    let (n, m) = if transposed { (cols, rows) } else { (rows, cols) };
    let cell = |r: usize, c: usize| {
        if transposed { table[c][r] } else { table[r][c] }
    };

    let penalty = infeasible_penalty(max_abs, n)?;
    let weights = I64Weights(
        (0..n)
            .map(|r| {
                (0..m)
                    .map(|c| cell(r, c).map_or(penalty, |cost| -cost))
                    .collect()
            })
            .collect(),
    );

    let (_, assigned) = kuhn_munkres(&weights);
    Ok(assigned
        .into_iter()
        .enumerate()
        .filter(|&(r, c)| cell(r, c).is_some())
        .map(|(r, c)| if transposed { (c, r) } else { (r, c) })
        .collect())
}

/// Weight of an incompatible pair: below `-(2n + 2) * (max_abs + 1)`, so
/// one extra compatible pair outweighs any cost difference among `n` pairs.
fn infeasible_penalty(max_abs: u64, n: usize) -> Result<i64> {
    let overflow = || RidematchError::AssignmentFailed {
        reason: format!("cost range too large: max |cost| {max_abs}s over {n} rows"),
    };
    let n = i64::try_from(n).map_err(|_| overflow())?;
    let max_abs = i64::try_from(max_abs).map_err(|_| overflow())?;
    let penalty = max_abs
        .checked_add(1)
        .and_then(|v| v.checked_mul(2 * n + 2))
        .ok_or_else(overflow)?;
    // Leave room for the solver's label sums over all rows.
    penalty.checked_mul(4 * (n + 1)).ok_or_else(overflow)?;
    Ok(-penalty)
}
