//! # boundring
//!
//! Consistent hashing with bounded loads.
//!
//! A [`Ring`] places every physical node on a hash ring `weight` times and
//! assigns resources clockwise, skipping any node that has reached its load
//! bound for the current batch. The bound is
//! `ceil(batch_size * load_factor * weight / total_weight)`, so a node takes
//! at most that many resources per batch, and adding or removing a node moves
//! only a small fraction of resources.
//!
//! A [`PartitionedRing`] maps a fixed number of partitions onto a ring and
//! caches the result until the topology changes, for callers that need a
//! stable, enumerable mapping.
//!
//! ## Features
//!
//! - **Bounded**: no node exceeds its per-batch load bound
//! - **Weighted**: capacity share follows node weight
//! - **Stable**: topology changes relocate a bounded number of resources
//! - **Replicas**: `locate_n` returns distinct fallback nodes in ring order
//! - **Pluggable hashing**: ahash by default, fxhash behind a feature, or any
//!   [`RingHasher`]
//!
//! ## Example
//!
//! ```rust
//! use boundring::RingBuilder;
//!
//! let mut ring = RingBuilder::new().load_factor(1.1)?.build();
//! ring.add("node0", 100)?;
//! ring.add("node1", 100)?;
//! ring.add("node2", 200)?; // twice the capacity
//!
//! let resources: Vec<String> = (0..10_000).map(|i| i.to_string()).collect();
//! let owners = ring.allocate_many(&resources)?;
//!
//! for (resource, owner) in resources.iter().zip(&owners).take(3) {
//!     let node = ring.node(owner.unwrap()).unwrap();
//!     println!("{} -> {}", resource, node.id());
//! }
//!
//! for node in ring.iter() {
//!     assert!(node.load() <= node.max_load());
//! }
//! # Ok::<(), boundring::Error>(())
//! ```
//!
//! ## Thread safety
//!
//! Neither type is safe for concurrent use. Both are `Send`, so they can be
//! guarded by a mutex; note that reads on a [`PartitionedRing`] may recompute
//! its cache and therefore take `&mut self`.

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Hash primitive trait and implementations.
pub mod hash;
/// Node iterator.
pub mod iter;
/// Physical and virtual nodes.
pub mod node;
/// Partitioned overlay.
pub mod partitioned;
/// Bounded-load consistent hashing ring.
pub mod ring;
/// Load statistics.
pub mod stats;

// Re-export main types
pub use config::{Config, HashFunction, RingBuilder};
pub use error::Error;
pub use hash::{RingHasher, StdHasher};
pub use node::{Node, NodeIndex, NodeSnapshot};
pub use partitioned::PartitionedRing;
pub use ring::Ring;
pub use stats::Stats;
