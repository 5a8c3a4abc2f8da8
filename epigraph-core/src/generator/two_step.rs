//! Two-step generation: sample the edge count, then place distinct edges.
//!
//! Edges are placed by rejection sampling of uniform node pairs. Rejections
//! become frequent once the target approaches the number of available pairs,
//! so dense targets and exhausted retry budgets switch to drawing the
//! remaining edges from an explicit list of unused pairs.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};
use tracing::warn;

use crate::{
    Graph,
    error::Result,
    sampling::{edge_count, pair_count},
};

/// Minimum number of pair draws allowed before falling back.
const MIN_ATTEMPT_BUDGET: usize = 64;
/// Pair draws allowed per requested edge before falling back.
const ATTEMPTS_PER_EDGE: usize = 32;

pub(super) fn populate<R: Rng + ?Sized>(rng: &mut R, graph: &mut Graph, p: f64) -> Result<()> {
    let num_nodes = graph.num_nodes();
    let total_pairs = usize::try_from(pair_count(num_nodes)).unwrap_or(usize::MAX);
    let target = usize::try_from(edge_count(rng, num_nodes, p)?)
        .unwrap_or(usize::MAX)
        .min(total_pairs);

    let mut placed: HashSet<(usize, usize)> = HashSet::with_capacity(target);
    if target.saturating_mul(2) > total_pairs {
        return fill_exhaustively(rng, graph, &mut placed, target);
    }

    let budget = target
        .saturating_mul(ATTEMPTS_PER_EDGE)
        .max(MIN_ATTEMPT_BUDGET);
    let mut attempts = 0_usize;
    while placed.len() < target {
        if attempts == budget {
            warn!(
                target,
                placed = placed.len(),
                attempts,
                "rejection budget exhausted, sampling remaining edges exhaustively"
            );
            return fill_exhaustively(rng, graph, &mut placed, target);
        }
        attempts += 1;

        let i = rng.gen_range(0..num_nodes);
        let j = rng.gen_range(0..num_nodes);
        if i == j {
            continue;
        }
        if placed.insert(canonical(i, j)) {
            graph.add_edge(i, j)?;
        }
    }
    Ok(())
}

/// Adds uniformly chosen unused pairs until `target` edges are placed.
fn fill_exhaustively<R: Rng + ?Sized>(
    rng: &mut R,
    graph: &mut Graph,
    placed: &mut HashSet<(usize, usize)>,
    target: usize,
) -> Result<()> {
    let needed = target.saturating_sub(placed.len());
    if needed == 0 {
        return Ok(());
    }
    let num_nodes = graph.num_nodes();
    let mut candidates: Vec<(usize, usize)> = (0..num_nodes)
        .flat_map(|i| ((i + 1)..num_nodes).map(move |j| (i, j)))
        .filter(|pair| !placed.contains(pair))
        .collect();
    let (chosen, _) = candidates.partial_shuffle(rng, needed);
    for &(i, j) in chosen.iter() {
        placed.insert((i, j));
        graph.add_edge(i, j)?;
    }
    Ok(())
}

const fn canonical(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}
