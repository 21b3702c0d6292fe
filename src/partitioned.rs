use crate::error::Error;
use crate::iter::Nodes;
use crate::node::{Node, NodeIndex};
use crate::ring::Ring;
use crate::stats::Stats;
use hashbrown::HashSet;
use tracing::debug;

/// Partition-to-node mapping cached for one ring topology.
struct Allocation {
    generation: u64,
    owners: Vec<Option<NodeIndex>>,
}

/// A fixed set of partitions placed on a bounded-load ring.
///
/// Keys map to partitions by `hash % partition_count`, and partitions map to
/// nodes through the ring, allocated as a single batch. The mapping is cached
/// and recomputed on the first read after a topology change, so repeated
/// lookups cost no ring scans.
///
/// # Example
///
/// ```rust
/// use boundring::RingBuilder;
///
/// let mut p = RingBuilder::new().build_partitioned(1024)?;
/// p.add("nodeA", 100)?;
/// p.add("nodeB", 200)?;
///
/// let a = p.partitions_of("nodeA")?;
/// let b = p.partitions_of("nodeB")?;
/// assert_eq!(a.len() + b.len(), 1024);
/// assert!(b.len() > a.len());
/// # Ok::<(), boundring::Error>(())
/// ```
pub struct PartitionedRing {
    ring: Ring,
    hashes: Box<[u64]>,
    allocation: Option<Allocation>,
}

impl PartitionedRing {
    /// Wrap `ring` with `partition_count` partitions.
    ///
    /// Partition `i` is placed at the hash of `i` as a little-endian `u32`.
    pub fn new(mut ring: Ring, partition_count: usize) -> Result<Self, Error> {
        if partition_count == 0 || partition_count - 1 > u32::MAX as usize {
            return Err(Error::InvalidPartitionCount(partition_count));
        }

        let hasher = ring.hasher_mut();
        let hashes = (0..partition_count)
            .map(|i| {
                hasher.reset();
                hasher.write(&(i as u32).to_le_bytes());
                hasher.sum64()
            })
            .collect();

        Ok(Self {
            ring,
            hashes,
            allocation: None,
        })
    }

    /// Add a node. The cached mapping is invalidated, not recomputed.
    pub fn add(&mut self, id: impl Into<String>, weight: u32) -> Result<bool, Error> {
        self.ring.add(id, weight)
    }

    /// Remove a node. The cached mapping is invalidated, not recomputed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ring.remove(id)
    }

    /// Get a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.ring.get(id)
    }

    /// Resolve a node handle.
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.ring.node(index)
    }

    /// All live nodes, in no particular order.
    pub fn list(&self) -> Vec<&Node> {
        self.ring.list()
    }

    /// Iterate over live nodes.
    pub fn iter(&self) -> Nodes<'_> {
        self.ring.iter()
    }

    /// The underlying ring.
    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Unwrap the underlying ring.
    pub fn into_ring(self) -> Ring {
        self.ring
    }

    /// Number of partitions.
    pub fn partition_count(&self) -> usize {
        self.hashes.len()
    }

    /// Partition of a resource hash.
    #[inline]
    pub fn partition_by_hash(&self, hash: u64) -> usize {
        (hash % self.hashes.len() as u64) as usize
    }

    /// Partition of a resource key.
    pub fn partition_by_key(&mut self, key: impl AsRef<[u8]>) -> usize {
        let hash = self.ring.hash(key.as_ref());
        self.partition_by_hash(hash)
    }

    /// Owner of every partition, indexed by partition.
    ///
    /// Entries are `None` only when the ring has no nodes.
    pub fn allocations(&mut self) -> Result<&[Option<NodeIndex>], Error> {
        let generation = self.ring.generation();
        let stale = self
            .allocation
            .as_ref()
            .map_or(true, |cached| cached.generation != generation);

        if stale {
            let owners = self.ring.allocate_many_by_hash(&self.hashes)?;
            debug!(
                partitions = owners.len(),
                nodes = self.ring.len(),
                generation,
                "recomputed partition allocation"
            );
            self.allocation = Some(Allocation { generation, owners });
        }

        Ok(self
            .allocation
            .as_ref()
            .map_or(&[][..], |cached| cached.owners.as_slice()))
    }

    /// Owner of a partition. `None` if out of range or the ring is empty.
    pub fn owner(&mut self, partition: usize) -> Result<Option<NodeIndex>, Error> {
        Ok(self.allocations()?.get(partition).copied().flatten())
    }

    /// Partitions owned by `node`.
    pub fn partitions(&mut self, node: NodeIndex) -> Result<HashSet<usize>, Error> {
        Ok(self
            .allocations()?
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == Some(node))
            .map(|(partition, _)| partition)
            .collect())
    }

    /// Partitions owned by the node with this id. Empty for unknown ids.
    pub fn partitions_of(&mut self, id: &str) -> Result<HashSet<usize>, Error> {
        match self.ring.get(id).map(Node::index) {
            Some(node) => self.partitions(node),
            None => Ok(HashSet::new()),
        }
    }

    /// Owner of the partition `hash` falls in.
    pub fn locate_by_hash(&mut self, hash: u64) -> Result<Option<NodeIndex>, Error> {
        let partition = self.partition_by_hash(hash);
        self.owner(partition)
    }

    /// Owner of the partition `key` falls in.
    pub fn locate(&mut self, key: impl AsRef<[u8]>) -> Result<Option<NodeIndex>, Error> {
        let hash = self.ring.hash(key.as_ref());
        self.locate_by_hash(hash)
    }

    /// Up to `n` distinct owners, walking partitions upward from the one
    /// `hash` falls in and wrapping around.
    pub fn locate_n_by_hash(&mut self, hash: u64, n: usize) -> Result<Vec<NodeIndex>, Error> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let start = self.partition_by_hash(hash);
        let owners = self.allocations()?;
        let count = owners.len();

        let mut found = Vec::with_capacity(n);
        let mut seen = HashSet::with_capacity(n);
        for offset in 0..count {
            if found.len() == n {
                break;
            }
            let Some(owner) = owners[(start + offset) % count] else {
                continue;
            };
            if seen.insert(owner) {
                found.push(owner);
            }
        }
        Ok(found)
    }

    /// Up to `n` distinct owners for `key`.
    pub fn locate_n(&mut self, key: impl AsRef<[u8]>, n: usize) -> Result<Vec<NodeIndex>, Error> {
        let hash = self.ring.hash(key.as_ref());
        self.locate_n_by_hash(hash, n)
    }

    /// Load statistics of the last allocation.
    pub fn stats(&self) -> Stats {
        self.ring.stats()
    }
}

impl std::fmt::Debug for PartitionedRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionedRing")
            .field("ring", &self.ring)
            .field("partitions", &self.hashes.len())
            .field(
                "cached",
                &self
                    .allocation
                    .as_ref()
                    .is_some_and(|cached| cached.generation == self.ring.generation()),
            )
            .finish()
    }
}
