use crate::config::{create_hasher, Config};
use crate::error::Error;
use crate::hash::RingHasher;
use crate::iter::Nodes;
use crate::node::{Node, NodeArena, NodeIndex, VirtualNode};
use crate::partitioned::PartitionedRing;
use crate::stats::Stats;
use hashbrown::{HashMap, HashSet};
use tracing::{debug, error, trace, warn};

/// Consistent hashing ring with bounded loads.
///
/// Each node is placed on the ring `weight` times. Lookups walk clockwise from
/// the key's hash and take the first node still under its load bound, where
/// the bound for a batch of `n` items is `ceil(n * load_factor * weight / vnodes)`.
///
/// Topology changes are applied lazily: `add` and `remove` only mark the ring
/// dirty, and the next [`Ring::prepare`] filters and sorts it. A dirty ring is
/// never read.
///
/// The ring is not safe for concurrent use. Wrap it in a lock if it must be
/// shared between threads.
///
/// # Example
///
/// ```rust
/// use boundring::Ring;
///
/// let mut ring = Ring::new();
/// ring.add("node0", 100)?;
/// ring.add("node1", 100)?;
/// ring.add("node2", 200)?;
///
/// let keys: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
/// let owners = ring.allocate_many(&keys)?;
/// assert!(owners.iter().all(Option::is_some));
///
/// for node in ring.iter() {
///     assert!(node.load() <= node.max_load());
/// }
/// # Ok::<(), boundring::Error>(())
/// ```
pub struct Ring {
    hasher: Box<dyn RingHasher>,
    load_factor: f64,
    ring: Vec<VirtualNode>,
    nodes: NodeArena,
    index: HashMap<String, NodeIndex>,
    needs_sort: bool,
    needs_filter: bool,
    generation: u64,
}

impl Ring {
    /// Create a new ring with defaults (load factor 1.25, ahash).
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new ring with custom config.
    pub fn with_config(config: Config) -> Self {
        let hasher = create_hasher(&config);
        Self::with_hasher(config, hasher)
    }

    pub(crate) fn with_hasher(config: Config, hasher: Box<dyn RingHasher>) -> Self {
        Self {
            hasher,
            load_factor: config.load_factor,
            ring: Vec::with_capacity(config.virtual_node_capacity.unwrap_or(0)),
            nodes: NodeArena::default(),
            index: HashMap::new(),
            needs_sort: false,
            needs_filter: false,
            generation: 0,
        }
    }

    /// Wrap this ring in a partitioned overlay with `partition_count` partitions.
    pub fn partitioned(self, partition_count: usize) -> Result<PartitionedRing, Error> {
        PartitionedRing::new(self, partition_count)
    }

    /// Add a physical node with `weight` virtual nodes.
    ///
    /// Returns `Ok(false)` if a node with the same id already exists; the
    /// existing node is left untouched. A weight outside `1..=65535` is
    /// rejected without modifying the ring.
    pub fn add(&mut self, id: impl Into<String>, weight: u32) -> Result<bool, Error> {
        let weight = u16::try_from(weight)
            .ok()
            .filter(|&w| w > 0)
            .ok_or(Error::InvalidWeight(weight))?;

        let id = id.into();
        if self.index.contains_key(&id) {
            return Ok(false);
        }

        let node = self.nodes.insert(id.clone(), weight);

        // Sub-indices accumulate on one hasher state per node.
        self.hasher.reset();
        self.hasher.write(id.as_bytes());
        self.ring.reserve(weight as usize);
        for i in 0..weight {
            self.hasher.write(&i.to_le_bytes());
            self.ring.push(VirtualNode {
                hash: self.hasher.sum64(),
                owner: node,
            });
        }

        trace!(id = %id, weight, "added node");
        self.index.insert(id, node);
        self.needs_sort = true;
        self.generation += 1;
        Ok(true)
    }

    /// Remove a physical node. Returns `false` if it does not exist.
    ///
    /// The node disappears from lookups immediately; its virtual nodes are
    /// purged by the next `prepare`.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.index.remove(id) else {
            return false;
        };
        self.nodes.remove(index);
        self.needs_filter = true;
        self.generation += 1;
        trace!(id, "removed node");
        true
    }

    /// Get a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).and_then(|&index| self.nodes.get(index))
    }

    /// Resolve a node handle. Returns `None` for removed nodes.
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Check whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All live nodes, in no particular order.
    pub fn list(&self) -> Vec<&Node> {
        self.iter().collect()
    }

    /// Iterate over live nodes, in no particular order.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes::new(&self.index, &self.nodes)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the ring has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Number of entries on the ring, including stale ones not yet filtered.
    pub fn virtual_node_count(&self) -> usize {
        self.ring.len()
    }

    /// The configured load factor.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Counter bumped by every successful `add` or `remove`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the ring has pending topology changes not yet applied by `prepare`.
    pub fn is_dirty(&self) -> bool {
        self.needs_sort || self.needs_filter
    }

    /// Rebuild the ring if needed and compute load bounds for a batch of
    /// `total_load` items. Resets every node's load to zero.
    pub fn prepare(&mut self, total_load: usize) {
        if self.needs_filter {
            let before = self.ring.len();
            let nodes = &self.nodes;
            self.ring.retain(|vnode| nodes.get(vnode.owner).is_some());
            self.needs_filter = false;
            debug!(
                purged = before - self.ring.len(),
                virtual_nodes = self.ring.len(),
                "filtered ring"
            );
        }

        if self.needs_sort {
            // Stable: equal hashes keep insertion order.
            self.ring.sort_by_key(|vnode| vnode.hash);
            self.needs_sort = false;
            debug!(virtual_nodes = self.ring.len(), "sorted ring");
        }

        if self.ring.is_empty() {
            return;
        }

        let base_max_load = total_load as f64 * self.load_factor / self.ring.len() as f64;
        for node in self.nodes.iter_mut() {
            node.load = 0;
            node.max_load = (base_max_load * f64::from(node.weight())).ceil() as usize;
        }
    }

    /// Allocate a batch of keys. See [`Ring::allocate_many_by_hash`].
    pub fn allocate_many<K: AsRef<[u8]>>(
        &mut self,
        keys: &[K],
    ) -> Result<Vec<Option<NodeIndex>>, Error> {
        if self.is_empty() {
            return Ok(vec![None; keys.len()]);
        }
        let hashes: Vec<u64> = keys.iter().map(|key| self.hash(key.as_ref())).collect();
        self.allocate_many_by_hash(&hashes)
    }

    /// Allocate a batch of hashes, preparing the ring for exactly this batch.
    ///
    /// The output is in input order. With no live nodes every entry is `None`
    /// and the ring is not prepared.
    pub fn allocate_many_by_hash(
        &mut self,
        hashes: &[u64],
    ) -> Result<Vec<Option<NodeIndex>>, Error> {
        if self.is_empty() {
            return Ok(vec![None; hashes.len()]);
        }

        self.prepare(hashes.len());
        hashes
            .iter()
            .map(|&hash| self.allocate_by_hash(hash).map(Some))
            .collect()
    }

    /// Allocate a single key. The ring must have been prepared.
    pub fn allocate(&mut self, key: impl AsRef<[u8]>) -> Result<NodeIndex, Error> {
        let hash = self.hash(key.as_ref());
        self.allocate_by_hash(hash)
    }

    /// Allocate a single hash against the bounds of the last `prepare`.
    ///
    /// Fails with [`Error::NotPrepared`] on a dirty ring and with
    /// [`Error::NoCapacity`] when every node is at its bound. Never returns
    /// an overloaded node.
    pub fn allocate_by_hash(&mut self, hash: u64) -> Result<NodeIndex, Error> {
        if self.is_dirty() {
            return Err(Error::NotPrepared);
        }

        let owner = self.locate_by_hash(hash).ok_or_else(|| {
            error!(hash, virtual_nodes = self.ring.len(), "no node under load bound");
            Error::NoCapacity
        })?;

        if let Some(node) = self.nodes.get_mut(owner) {
            node.load += 1;
        }
        Ok(owner)
    }

    /// Locate the node that would take `key`, without changing any load.
    pub fn locate(&mut self, key: impl AsRef<[u8]>) -> Option<NodeIndex> {
        let hash = self.hash(key.as_ref());
        self.locate_by_hash(hash)
    }

    /// Locate the node that would take `hash`, without changing any load.
    ///
    /// Returns `None` if the ring is empty, dirty, or every node is at its bound.
    pub fn locate_by_hash(&self, hash: u64) -> Option<NodeIndex> {
        if self.is_dirty() {
            warn!("locate on a ring that has not been prepared");
            return None;
        }
        self.scan(hash).find(|&owner| {
            self.nodes
                .get(owner)
                .is_some_and(|node| node.has_capacity())
        })
    }

    /// Locate up to `n` distinct nodes for `key`.
    pub fn locate_n(&mut self, key: impl AsRef<[u8]>, n: usize) -> Vec<NodeIndex> {
        let hash = self.hash(key.as_ref());
        self.locate_n_by_hash(hash, n)
    }

    /// Locate up to `n` distinct nodes in ring order starting at `hash`.
    ///
    /// The first node is the one [`Ring::locate_by_hash`] returns; the rest
    /// are the following distinct nodes regardless of their bound, so `n`
    /// replicas are found whenever `n` nodes exist.
    pub fn locate_n_by_hash(&self, hash: u64, n: usize) -> Vec<NodeIndex> {
        if n == 0 {
            return Vec::new();
        }
        if self.is_dirty() {
            warn!("locate_n on a ring that has not been prepared");
            return Vec::new();
        }

        let mut found = Vec::with_capacity(n.min(self.len()));
        let mut seen = HashSet::with_capacity(n.min(self.len()));

        for owner in self.scan(hash) {
            if seen.contains(&owner) {
                continue;
            }
            let Some(node) = self.nodes.get(owner) else {
                continue;
            };
            if found.is_empty() && !node.has_capacity() {
                continue;
            }
            seen.insert(owner);
            found.push(owner);
            if found.len() == n {
                break;
            }
        }
        found
    }

    /// Hash a byte slice with the ring's hash primitive.
    pub fn hash(&mut self, data: &[u8]) -> u64 {
        self.hasher.reset();
        self.hasher.write(data);
        self.hasher.sum64()
    }

    /// Hash a string with the ring's hash primitive.
    pub fn hash_str(&mut self, data: &str) -> u64 {
        self.hash(data.as_bytes())
    }

    /// Load and bound of every live node.
    pub fn stats(&self) -> Stats {
        Stats::collect(self.iter(), self.ring.len())
    }

    pub(crate) fn hasher_mut(&mut self) -> &mut dyn RingHasher {
        self.hasher.as_mut()
    }

    /// Owners of the ring in clockwise order from the successor of `hash`.
    fn scan(&self, hash: u64) -> impl Iterator<Item = NodeIndex> + '_ {
        let len = self.ring.len();
        let start = self.successor(hash);
        (0..len).map(move |offset| self.ring[(start + offset) % len].owner)
    }

    /// Index of the first virtual node with hash >= `hash`, wrapping to 0.
    #[inline]
    fn successor(&self, hash: u64) -> usize {
        let index = self.ring.partition_point(|vnode| vnode.hash < hash);
        if index == self.ring.len() {
            0
        } else {
            index
        }
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("load_factor", &self.load_factor)
            .field("nodes", &self.nodes.len())
            .field("virtual_nodes", &self.ring.len())
            .field("dirty", &self.is_dirty())
            .field("generation", &self.generation)
            .finish()
    }
}
