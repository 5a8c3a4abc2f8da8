use epigraph_core::Graph;

/// Builds an undirected graph from an edge list.
#[must_use]
pub fn graph_from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new(num_nodes, false).expect("graph needs nodes");
    for &(i, j) in edges {
        graph.add_edge(i, j).expect("edge endpoints are in range");
    }
    graph
}

/// Builds an undirected cycle on `num_nodes` nodes.
#[must_use]
pub fn ring(num_nodes: usize) -> Graph {
    let edges: Vec<_> = (0..num_nodes)
        .map(|node| (node, (node + 1) % num_nodes))
        .collect();
    graph_from_edges(num_nodes, &edges)
}
