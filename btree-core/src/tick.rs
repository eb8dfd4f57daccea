use crate::{rng, SplitMix64};

/// Per-tick inputs handed down the tree.
///
/// `now_ms` is supplied by the caller (wall clock or simulated); nodes never
/// read the system clock themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickContext {
    pub tick: u64,
    pub now_ms: u64,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, now_ms: u64) -> Self {
        Self {
            tick,
            now_ms,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn rng_for_node(&self, node: u64, stream: u64) -> SplitMix64 {
        SplitMix64::new(rng::derive_seed(self.seed, self.tick, node, stream))
    }
}
