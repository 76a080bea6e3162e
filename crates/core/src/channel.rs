//! Noisy channel models.
//!
//! A [`Channel`] corrupts package payloads in transit. Only payload bits are
//! touched; the parity bit travels unchanged so the receiver can notice the
//! damage.
//!
//! # Noise Models
//!
//! - **None**: ideal channel, packages pass through untouched
//! - **IndependentBitFlip(p)**: one uniform sample per payload bit, flip if
//!   the sample is below `p`
//! - **SymmetricCrossover(p)**: payload bits (MSB first) go through a
//!   [`BinarySymmetricChannel`] eight at a time, one Bernoulli(p) trial per bit
//!
//! # Determinism
//!
//! All randomness comes from a seeded ChaCha8 RNG. Given the same seed,
//! model and packages, the output is bit-identical.

use crate::bitio::{from_bits, to_bits};
use crate::error::{ChannelError, Result};
use crate::package::Package;
use rand::distributions::{Bernoulli, Distribution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Noise strategy applied by a [`Channel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NoiseModel {
    /// No corruption
    #[default]
    None,
    /// Independent per-bit flips with the given probability
    IndependentBitFlip(f64),
    /// Binary symmetric channel with the given crossover probability
    SymmetricCrossover(f64),
}

impl NoiseModel {
    /// Configured flip probability (0.0 for an ideal channel).
    pub fn probability(&self) -> f64 {
        match *self {
            NoiseModel::None => 0.0,
            NoiseModel::IndependentBitFlip(p) | NoiseModel::SymmetricCrossover(p) => p,
        }
    }

    fn validate(&self) -> Result<()> {
        let p = self.probability();
        if !(0.0..=1.0).contains(&p) {
            return Err(ChannelError::InvalidProbability(p).into());
        }
        Ok(())
    }
}

/// Binary symmetric channel: every bit is flipped independently with a fixed
/// crossover probability.
#[derive(Debug, Clone, Copy)]
pub struct BinarySymmetricChannel {
    crossover: Bernoulli,
}

impl BinarySymmetricChannel {
    /// # Errors
    /// `ChannelError::InvalidProbability` if `crossover` is outside [0, 1].
    pub fn new(crossover: f64) -> Result<Self> {
        let crossover =
            Bernoulli::new(crossover).map_err(|_| ChannelError::InvalidProbability(crossover))?;
        Ok(Self { crossover })
    }

    /// Pass a sequence of 0/1 values through the channel.
    pub fn transmit<R: Rng>(&self, bits: &[u8], rng: &mut R) -> Vec<u8> {
        bits.iter()
            .map(|&bit| {
                if self.crossover.sample(rng) {
                    (bit & 1) ^ 1
                } else {
                    bit & 1
                }
            })
            .collect()
    }
}

/// Noisy channel with a seeded RNG and running statistics.
///
/// # Thread Safety
/// Not thread-safe; the link wraps it in a mutex.
#[derive(Debug, Clone)]
pub struct Channel {
    model: NoiseModel,
    bsc: Option<BinarySymmetricChannel>,
    rng: ChaCha8Rng,

    // Statistics
    packages_seen: u64,
    packages_altered: u64,
    bits_seen: u64,
    bits_flipped: u64,
}

impl Channel {
    /// Create a channel for `model`, seeding its RNG with `seed`.
    ///
    /// # Errors
    /// `ChannelError::InvalidProbability` if the model's probability is NaN or
    /// outside [0, 1].
    pub fn new(model: NoiseModel, seed: u64) -> Result<Self> {
        model.validate()?;

        let bsc = match model {
            NoiseModel::SymmetricCrossover(p) => Some(BinarySymmetricChannel::new(p)?),
            _ => None,
        };

        Ok(Self {
            model,
            bsc,
            rng: ChaCha8Rng::seed_from_u64(seed),
            packages_seen: 0,
            packages_altered: 0,
            bits_seen: 0,
            bits_flipped: 0,
        })
    }

    /// An ideal channel.
    pub fn perfect() -> Self {
        Self {
            model: NoiseModel::None,
            bsc: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            packages_seen: 0,
            packages_altered: 0,
            bits_seen: 0,
            bits_flipped: 0,
        }
    }

    pub fn model(&self) -> NoiseModel {
        self.model
    }

    /// Corrupt the payload of `package` according to the noise model.
    ///
    /// The parity bit is left untouched. A package without a payload is
    /// returned as is.
    pub fn apply_noise(&mut self, mut package: Package) -> Package {
        self.packages_seen += 1;

        if let Some(payload) = package.payload_mut() {
            self.corrupt(payload);
        }

        package
    }

    fn corrupt(&mut self, payload: &mut [u8]) {
        let original = payload.to_vec();

        match self.model {
            NoiseModel::None => {}
            NoiseModel::IndependentBitFlip(p) => flip_bits(payload, p, &mut self.rng),
            NoiseModel::SymmetricCrossover(_) => {
                if let Some(bsc) = self.bsc {
                    crossover(payload, &bsc, &mut self.rng);
                }
            }
        }

        let flipped: u32 = original
            .iter()
            .zip(payload.iter())
            .map(|(before, after)| (before ^ after).count_ones())
            .sum();

        self.bits_seen += original.len() as u64 * 8;
        self.bits_flipped += u64::from(flipped);
        if flipped > 0 {
            self.packages_altered += 1;
        }
    }

    /// Get statistics about channel behavior.
    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            packages_seen: self.packages_seen,
            packages_altered: self.packages_altered,
            bits_seen: self.bits_seen,
            bits_flipped: self.bits_flipped,
        }
    }
}

/// Flip each bit whose uniform sample falls below `probability`.
fn flip_bits<R: Rng>(payload: &mut [u8], probability: f64, rng: &mut R) {
    for byte in payload.iter_mut() {
        for index in 0..8 {
            let roll: f64 = rng.gen();
            if roll < probability {
                *byte ^= 1 << index;
            }
        }
    }
}

/// Run the payload through the binary symmetric channel one byte at a time.
fn crossover<R: Rng>(payload: &mut [u8], bsc: &BinarySymmetricChannel, rng: &mut R) {
    let bits = to_bits(payload);
    let mut noisy = Vec::with_capacity(payload.len());

    for group in bits.chunks(8) {
        noisy.extend(from_bits(&bsc.transmit(group, rng)));
    }

    payload.copy_from_slice(&noisy);
}

/// Statistics about channel behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Packages passed through the channel
    pub packages_seen: u64,

    /// Packages with at least one flipped bit
    pub packages_altered: u64,

    /// Payload bits passed through the channel
    pub bits_seen: u64,

    /// Payload bits flipped
    pub bits_flipped: u64,
}

impl ChannelStats {
    /// Observed bit error rate (flipped / seen).
    pub fn bit_error_rate(&self) -> f64 {
        if self.bits_seen == 0 {
            0.0
        } else {
            self.bits_flipped as f64 / self.bits_seen as f64
        }
    }

    /// Fraction of packages with at least one flipped bit.
    pub fn alteration_rate(&self) -> f64 {
        if self.packages_seen == 0 {
            0.0
        } else {
            self.packages_altered as f64 / self.packages_seen as f64
        }
    }
}
