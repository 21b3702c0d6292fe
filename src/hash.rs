use std::hash::{BuildHasher, Hasher};

/// A resettable 64-bit hash primitive.
///
/// The ring owns its hasher exclusively and drives it as reset, write, sum
/// within a single call, so implementations never see interleaved digests.
pub trait RingHasher: Send {
    /// Clear any absorbed state.
    fn reset(&mut self);

    /// Absorb `bytes` into the current state.
    fn write(&mut self, bytes: &[u8]);

    /// Produce the digest of everything written since the last reset.
    /// Must not consume the state: further writes extend the same input.
    fn sum64(&self) -> u64;
}

/// Adapts any [`BuildHasher`] into a [`RingHasher`].
///
/// Resetting builds a fresh hasher from the stored state, so the builder must
/// be deterministic (e.g. `ahash::RandomState::with_seeds`) for every process
/// to derive the same ring.
pub struct StdHasher<S: BuildHasher> {
    build: S,
    state: S::Hasher,
}

impl<S: BuildHasher> StdHasher<S> {
    /// Wrap a hasher builder.
    pub fn new(build: S) -> Self {
        let state = build.build_hasher();
        Self { build, state }
    }
}

impl<S> RingHasher for StdHasher<S>
where
    S: BuildHasher + Send,
    S::Hasher: Send,
{
    #[inline]
    fn reset(&mut self) {
        self.state = self.build.build_hasher();
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state.write(bytes);
    }

    #[inline]
    fn sum64(&self) -> u64 {
        self.state.finish()
    }
}

/// Default ahash seeds. Fixed so that independent clients agree on placement.
pub const DEFAULT_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// ahash-backed primitive with explicit seeds.
pub fn ahash_with_seeds(seeds: [u64; 4]) -> StdHasher<ahash::RandomState> {
    StdHasher::new(ahash::RandomState::with_seeds(
        seeds[0], seeds[1], seeds[2], seeds[3],
    ))
}

/// fxhash-backed primitive.
#[cfg(feature = "fxhash")]
pub fn fxhash() -> StdHasher<std::hash::BuildHasherDefault<fxhash::FxHasher>> {
    StdHasher::new(std::hash::BuildHasherDefault::default())
}
