//! Top-k candidate selection for a single node.
//!
//! Partial selection with a max-heap bounded to `k` entries: every incident
//! edge is pushed, and the worst entry is evicted whenever the heap grows past
//! `k`. O(n log k) over the node's degree.

use std::{cmp::Ordering, collections::BinaryHeap};

use ridematch_types::{NodeRef, Result};

use crate::graph::{Edge, MatchGraph};

/// Heap entry ordered by cost, then by counterpart insertion sequence.
#[derive(Debug)]
struct Candidate {
    seq: u64,
    edge: Edge,
}

impl Candidate {
    fn new(edge: Edge) -> Self {
        let seq = match edge.counterpart {
            NodeRef::Driver(key) => key.0,
            NodeRef::Rider(key) => key.0,
        };
        Self { seq, edge }
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.edge
            .cost
            .total_cmp(&other.edge.cost)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// The `k` cheapest edges incident to `node`, ascending by cost.
///
/// Ties are broken by counterpart insertion order. A node with fewer than `k`
/// edges yields all of them; `k == 0` yields nothing.
///
/// # Errors
/// `NodeNotFound` if `node` is not in the graph.
pub fn top_k(graph: &MatchGraph, node: NodeRef, k: usize) -> Result<Vec<Edge>> {
    let edges = graph.edges_of(node)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut heap = BinaryHeap::with_capacity(k.min(edges.len()) + 1);
    for edge in edges {
        heap.push(Candidate::new(edge));
        if heap.len() > k {
            heap.pop();
        }
    }

    let ranked: Vec<Edge> = heap
        .into_sorted_vec()
        .into_iter()
        .map(|candidate| candidate.edge)
        .collect();
    tracing::debug!(%node, k, returned = ranked.len(), "Top-k computed");
    Ok(ranked)
}
