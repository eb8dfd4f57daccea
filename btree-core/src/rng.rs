/// Deterministic RNG helpers.
///
/// Small and dependency-free so that lotto draws and randomized waits replay
/// identically for the same seed. **Not** cryptographic.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform value in `0..bound`. Returns 0 when `bound` is 0.
    fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // Rejection sampling keeps the draw unbiased for bounds that do not
        // divide 2^64.
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let x = self.next_u64();
            if x < zone {
                return x % bound;
            }
        }
    }

    /// Uniform value in `low..=high`. Swapped bounds are reordered.
    fn range_inclusive(&mut self, low: u64, high: u64) -> u64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        match (high - low).checked_add(1) {
            Some(span) => low + self.next_below(span),
            None => self.next_u64(),
        }
    }
}

/// SplitMix64: good seeding RNG and small deterministic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        mix64(self.state)
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Seed for one node's random stream on one tick.
pub fn derive_seed(global_seed: u64, tick: u64, node: u64, stream: u64) -> u64 {
    let x = global_seed
        ^ mix64(tick.wrapping_add(0x9E3779B97F4A7C15))
        ^ mix64(node.wrapping_mul(0xD1B54A32D192ED03).wrapping_add(stream));
    mix64(x)
}
