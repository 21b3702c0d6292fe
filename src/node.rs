/// Handle to a physical node.
///
/// Indices are generational: once a node is removed its index never resolves
/// again, even after the arena slot is reused by a later node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex {
    slot: u32,
    generation: u32,
}

impl NodeIndex {
    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.slot as usize
    }
}

/// A physical node registered on the ring.
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    index: NodeIndex,
    weight: u16,
    pub(crate) load: usize,
    pub(crate) max_load: usize,
}

impl Node {
    /// Unique identifier the node was registered with.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Arena handle of this node.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Number of virtual nodes, i.e. the relative capacity share.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Resources allocated to this node in the current batch.
    pub fn load(&self) -> usize {
        self.load
    }

    /// Load bound for the current batch. Zero until the first `prepare`.
    pub fn max_load(&self) -> usize {
        self.max_load
    }

    #[inline]
    pub(crate) fn has_capacity(&self) -> bool {
        self.load < self.max_load
    }

    /// Owned copy of the node's current state.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id.clone(),
            weight: self.weight,
            load: self.load,
            max_load: self.max_load,
        }
    }
}

/// Point-in-time copy of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Node identifier.
    pub id: String,
    /// Node weight.
    pub weight: u16,
    /// Load in the current batch.
    pub load: usize,
    /// Load bound in the current batch.
    pub max_load: usize,
}

/// One position on the ring. Does not own its node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VirtualNode {
    pub hash: u64,
    pub owner: NodeIndex,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Generational arena owning every live node.
#[derive(Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub fn insert(&mut self, id: String, weight: u16) -> NodeIndex {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let entry = &mut self.slots[slot as usize];
        let index = NodeIndex {
            slot,
            generation: entry.generation,
        };
        entry.node = Some(Node {
            id,
            index,
            weight,
            load: 0,
            max_load: 0,
        });
        self.live += 1;
        index
    }

    /// Release a node. Its index goes stale immediately.
    pub fn remove(&mut self, index: NodeIndex) -> Option<Node> {
        let entry = self.slots.get_mut(index.slot())?;
        if entry.generation != index.generation {
            return None;
        }
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index.slot);
        self.live -= 1;
        Some(node)
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        let entry = self.slots.get(index.slot())?;
        if entry.generation != index.generation {
            return None;
        }
        entry.node.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        let entry = self.slots.get_mut(index.slot())?;
        if entry.generation != index.generation {
            return None;
        }
        entry.node.as_mut()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.slots.iter_mut().filter_map(|slot| slot.node.as_mut())
    }
}
