use crate::node::{Node, NodeArena, NodeIndex};
use hashbrown::hash_map::Values;
use hashbrown::HashMap;

/// Iterator over the live nodes of a ring.
///
/// Walks the id index, so every item is a node that `get` would return.
/// Order is unspecified.
pub struct Nodes<'a> {
    indices: Values<'a, String, NodeIndex>,
    arena: &'a NodeArena,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(index: &'a HashMap<String, NodeIndex>, arena: &'a NodeArena) -> Self {
        Self {
            indices: index.values(),
            arena,
        }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        // The index only holds live handles.
        let arena = self.arena;
        self.indices.by_ref().find_map(|&index| arena.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl ExactSizeIterator for Nodes<'_> {}
