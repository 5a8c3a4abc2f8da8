//! Disjoint-set union over node indices.
//!
//! Outbreak sampling merges the endpoints of every retained edge and then
//! asks for the size of one node's component, so the structure tracks
//! component sizes at the roots instead of ranks.

#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

#[expect(
    clippy::indexing_slicing,
    reason = "every index is a node of the graph the set was sized for"
)]
impl DisjointSet {
    pub(super) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub(super) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges the components of `left` and `right`, attaching the smaller
    /// tree below the larger one. Returns the surviving root.
    pub(super) fn union(&mut self, left: usize, right: usize) -> usize {
        let mut keep = self.find(left);
        let mut absorb = self.find(right);
        if keep == absorb {
            return keep;
        }
        if self.size[keep] < self.size[absorb] {
            std::mem::swap(&mut keep, &mut absorb);
        }
        self.parent[absorb] = keep;
        self.size[keep] += self.size[absorb];
        keep
    }

    pub(super) fn component_size(&mut self, node: usize) -> usize {
        let root = self.find(node);
        self.size[root]
    }
}

#[cfg(test)]
mod tests {
    use super::DisjointSet;

    #[test]
    fn singletons_have_size_one() {
        let mut set = DisjointSet::new(3);
        assert_eq!(set.component_size(2), 1);
        assert_eq!(set.find(1), 1);
    }

    #[test]
    fn union_accumulates_sizes_once() {
        let mut set = DisjointSet::new(5);
        set.union(0, 1);
        set.union(3, 4);
        set.union(1, 4);
        set.union(0, 3);
        assert_eq!(set.component_size(4), 4);
        assert_eq!(set.component_size(2), 1);
        assert_eq!(set.find(0), set.find(3));
    }

    #[test]
    fn smaller_tree_is_attached_below_larger() {
        let mut set = DisjointSet::new(4);
        let big = set.union(0, 1);
        let root = set.union(2, big);
        assert_eq!(root, big);
        assert_eq!(set.union(3, 3), 3);
    }
}
