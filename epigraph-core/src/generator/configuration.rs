//! Configuration-model pairing of randomly drawn degree stubs.

use std::iter;

use rand::{Rng, seq::SliceRandom};

use crate::{Graph, error::Result};

/// Draws a stub count per node with `draw`, shuffles the stubs and joins
/// consecutive pairs. A trailing odd stub is dropped.
///
/// Stubs belonging to the same node may be paired, and the same two nodes may
/// be paired more than once; both outcomes are kept.
pub(super) fn populate<R, F>(rng: &mut R, graph: &mut Graph, mut draw: F) -> Result<()>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> Result<u64>,
{
    let mut stubs = Vec::new();
    for node in 0..graph.num_nodes() {
        let count = usize::try_from(draw(&mut *rng)?).unwrap_or(usize::MAX);
        stubs.extend(iter::repeat_n(node, count));
    }
    stubs.shuffle(rng);
    for pair in stubs.chunks_exact(2) {
        if let &[source, target] = pair {
            graph.add_edge(source, target)?;
        }
    }
    Ok(())
}
