/// Errors that can occur when operating on a ring or a partitioned ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The node weight is outside `1..=65535`.
    InvalidWeight(u32),
    /// The load factor is not a finite number greater than or equal to 1.0.
    InvalidLoadFactor,
    /// The partition count is zero or does not fit a 32-bit partition index.
    InvalidPartitionCount(usize),
    /// The ring was mutated since the last `prepare` and cannot be read yet.
    NotPrepared,
    /// Every node on the ring is at its load bound.
    NoCapacity,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidWeight(weight) => {
                write!(f, "weight must be between 1 and 65535, got {}", weight)
            }
            Error::InvalidLoadFactor => {
                write!(f, "load factor must be a finite number of at least 1.0")
            }
            Error::InvalidPartitionCount(count) => {
                write!(
                    f,
                    "partition count must be between 1 and 2^32, got {}",
                    count
                )
            }
            Error::NotPrepared => write!(f, "ring must be prepared after a topology change"),
            Error::NoCapacity => write!(f, "no node under load bound"),
        }
    }
}

impl std::error::Error for Error {}
