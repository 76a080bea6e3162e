//! Data sources for the sender.
//!
//! A data source produces one finite byte sequence on demand. The default
//! source generates uniformly random bytes from a seeded RNG so every byte
//! value (and so every parity outcome) shows up.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Produces the bytes the sender transmits.
pub trait DataSource {
    fn data(&mut self) -> Vec<u8>;
}

/// Seeded random bytes of a fixed length.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    len: usize,
}

impl RandomSource {
    pub fn new(seed: u64, len: usize) -> Self {
        Self { seed, len }
    }
}

impl DataSource for RandomSource {
    fn data(&mut self) -> Vec<u8> {
        generate_sample_data(self.seed, self.len)
    }
}

/// A fixed byte sequence.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<u8>);

#[cfg(test)]
impl DataSource for StaticSource {
    fn data(&mut self) -> Vec<u8> {
        self.0.clone()
    }
}

/// Generate `size_bytes` uniformly random bytes.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..size_bytes).map(|_| rng.gen()).collect()
}
