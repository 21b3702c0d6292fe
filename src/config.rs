use crate::error::Error;
use crate::hash::{self, RingHasher};

/// Default load factor: every node may take up to 25% more than its share.
pub const DEFAULT_LOAD_FACTOR: f64 = 1.25;

/// Which hash function to use for ring placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// Use ahash with fixed seeds (default, fast and well-distributed).
    #[default]
    AHash,
    /// Use fxhash (faster but potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
}

/// Configuration for a ring.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) load_factor: f64,
    pub(crate) hash_function: HashFunction,
    pub(crate) seeds: [u64; 4],
    pub(crate) virtual_node_capacity: Option<usize>,
}

impl Config {
    /// Create a new config with defaults (load factor 1.25, ahash).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the load factor. Must be finite and at least 1.0.
    ///
    /// With a factor of exactly 1.0 the bounds still cover every batch, but
    /// leave no slack: balance is tight and relocations grow.
    pub fn load_factor(mut self, load_factor: f64) -> Result<Self, Error> {
        if !load_factor.is_finite() || load_factor < 1.0 {
            return Err(Error::InvalidLoadFactor);
        }
        self.load_factor = load_factor;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hash_function = hash_fn;
        self
    }

    /// Set the ahash seeds. Ignored by other hash functions.
    pub fn seeds(mut self, seeds: [u64; 4]) -> Self {
        self.seeds = seeds;
        self
    }

    /// Pre-allocate room for this many virtual nodes (sum of weights).
    pub fn virtual_node_capacity(mut self, capacity: usize) -> Self {
        self.virtual_node_capacity = Some(capacity);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            load_factor: DEFAULT_LOAD_FACTOR,
            hash_function: HashFunction::AHash,
            seeds: hash::DEFAULT_SEEDS,
            virtual_node_capacity: None,
        }
    }
}

/// Builder for creating a ring with custom configuration.
pub struct RingBuilder {
    config: Config,
    hasher: Option<Box<dyn RingHasher>>,
}

impl RingBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            hasher: None,
        }
    }

    /// Start from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            hasher: None,
        }
    }

    /// Set the load factor. Must be finite and at least 1.0.
    pub fn load_factor(mut self, load_factor: f64) -> Result<Self, Error> {
        self.config = self.config.load_factor(load_factor)?;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Set the ahash seeds.
    pub fn seeds(mut self, seeds: [u64; 4]) -> Self {
        self.config = self.config.seeds(seeds);
        self
    }

    /// Pre-allocate room for this many virtual nodes.
    pub fn virtual_node_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.virtual_node_capacity(capacity);
        self
    }

    /// Use a caller-supplied hash primitive instead of `hash_function`.
    /// The hasher must not be shared with anything else.
    pub fn hasher<H: RingHasher + 'static>(mut self, hasher: H) -> Self {
        self.hasher = Some(Box::new(hasher));
        self
    }

    /// Build a ring with the configured settings.
    pub fn build(self) -> crate::Ring {
        let RingBuilder { config, hasher } = self;
        let hasher = hasher.unwrap_or_else(|| create_hasher(&config));
        crate::Ring::with_hasher(config, hasher)
    }

    /// Build a partitioned ring with `partition_count` partitions.
    pub fn build_partitioned(
        self,
        partition_count: usize,
    ) -> Result<crate::PartitionedRing, Error> {
        crate::PartitionedRing::new(self.build(), partition_count)
    }
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a hash primitive based on the configuration.
pub(crate) fn create_hasher(config: &Config) -> Box<dyn RingHasher> {
    match config.hash_function {
        HashFunction::AHash => Box::new(hash::ahash_with_seeds(config.seeds)),
        #[cfg(feature = "fxhash")]
        HashFunction::FxHash => Box::new(hash::fxhash()),
    }
}
