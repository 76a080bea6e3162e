//! Byte <-> package translation with parity-based integrity checks.
//!
//! # Encoding
//!
//! Every input byte becomes one package: the byte is the payload block and the
//! parity bit is computed from it. Output order matches input order.
//!
//! # Decoding
//!
//! Every package is checked independently: the parity is recomputed over the
//! (possibly corrupted) payload and compared with the parity the package
//! carries. A match yields the byte; a mismatch yields
//! [`Decoded::Corrupted`]. Nothing is corrected or retried.
//!
//! # Parity Schemes
//!
//! - [`ParityScheme::Fold`] (default): the iterative fold in
//!   [`calculate_parity`]. Each step moves the extracted low bit back into the
//!   low position, so the result is always the low bit of the value no matter
//!   how many steps run. Only flips of bit 0 are detected.
//! - [`ParityScheme::Even`]: XOR of all eight data bits. Detects any odd
//!   number of flips.
//!
//! Both produce a single bit. An even number of flips under `Even`, or any
//! flip pattern that leaves bit 0 alone under `Fold`, goes undetected.

use crate::error::Result;
use crate::package::{validate_config, Package};
use std::collections::BTreeMap;

/// How the codec derives the parity bit of a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParityScheme {
    /// Iterative fold over `parity_bit_count` steps
    #[default]
    Fold,
    /// Even parity over all eight bits
    Even,
}

impl ParityScheme {
    /// Probability that a package fails the check after crossing a channel
    /// that flips each bit independently with probability `p`.
    ///
    /// `Fold` only sees bit 0, so the rate is `p`. `Even` fails on an odd
    /// number of flips among eight bits: `(1 - (1 - 2p)^8) / 2`.
    pub fn detection_probability(&self, p: f64) -> f64 {
        match self {
            ParityScheme::Fold => p,
            ParityScheme::Even => (1.0 - (1.0 - 2.0 * p).powi(8)) / 2.0,
        }
    }
}

/// Decode verdict for a single package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Parity matched; the payload byte as received
    Valid(u8),
    /// Parity mismatch (or a package that was never filled)
    Corrupted,
}

impl Decoded {
    pub fn is_corrupted(&self) -> bool {
        matches!(self, Decoded::Corrupted)
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Decoded::Valid(byte) => Some(*byte),
            Decoded::Corrupted => None,
        }
    }
}

/// Result of [`Codec::unpack`]: one entry per input package, keyed by its
/// 0-based position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unpacked {
    entries: BTreeMap<usize, Decoded>,
}

impl Unpacked {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Decoded> {
        self.entries.get(&index).copied()
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Decoded)> + '_ {
        self.entries.iter().map(|(&index, &decoded)| (index, decoded))
    }

    /// Number of entries carrying the corruption marker.
    pub fn corrupted_count(&self) -> usize {
        self.entries.values().filter(|d| d.is_corrupted()).count()
    }

    /// Bytes that passed the parity check, in index order.
    pub fn valid_bytes(&self) -> Vec<u8> {
        self.entries.values().filter_map(Decoded::value).collect()
    }

    pub fn into_map(self) -> BTreeMap<usize, Decoded> {
        self.entries
    }
}

/// Parity codec for a fixed `(package_size, parity_bit_count)` configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    package_size: u8,
    parity_bit_count: u8,
    scheme: ParityScheme,
}

impl Codec {
    /// Create a codec using the fold parity scheme.
    ///
    /// # Errors
    /// `PackageError::InvalidConfiguration` under the same rules as
    /// [`Package::new`].
    pub fn new(package_size: u8, parity_bit_count: u8) -> Result<Self> {
        Self::with_scheme(package_size, parity_bit_count, ParityScheme::Fold)
    }

    pub fn with_scheme(
        package_size: u8,
        parity_bit_count: u8,
        scheme: ParityScheme,
    ) -> Result<Self> {
        validate_config(package_size, parity_bit_count)?;

        Ok(Self {
            package_size,
            parity_bit_count,
            scheme,
        })
    }

    pub fn package_size(&self) -> u8 {
        self.package_size
    }

    pub fn parity_bit_count(&self) -> u8 {
        self.parity_bit_count
    }

    pub fn scheme(&self) -> ParityScheme {
        self.scheme
    }

    /// Parity bit of `byte` under this codec's scheme.
    pub fn parity(&self, byte: u8) -> u8 {
        match self.scheme {
            ParityScheme::Fold => calculate_parity(byte, self.parity_bit_count),
            ParityScheme::Even => even_parity(byte),
        }
    }

    /// Encode bytes into packages, one per byte.
    ///
    /// # Errors
    /// `PackageError::SizeMismatch` if the configured width is not exactly one
    /// byte (only `(7, 1)` and `(6, 2)` can carry a byte payload).
    pub fn pack(&self, data: &[u8]) -> Result<Vec<Package>> {
        let mut packages = Vec::with_capacity(data.len());

        for &byte in data {
            let mut package = Package::new(self.package_size, self.parity_bit_count)?;
            package.set_payload(vec![byte])?;
            package.set_parity(self.parity(byte));
            packages.push(package);
        }

        Ok(packages)
    }

    /// Decode packages into a per-index verdict.
    pub fn unpack(&self, packages: &[Package]) -> Unpacked {
        let entries = packages
            .iter()
            .enumerate()
            .map(|(index, package)| (index, self.verify(package)))
            .collect();

        Unpacked { entries }
    }

    fn verify(&self, package: &Package) -> Decoded {
        let byte = package.payload().and_then(|payload| payload.first().copied());

        match (byte, package.parity()) {
            (Some(byte), Some(parity)) if self.parity(byte) == parity => Decoded::Valid(byte),
            _ => Decoded::Corrupted,
        }
    }
}

/// Fold parity of `value` over `bit_count` steps.
///
/// The state starts at `value`. Each step extracts the low bit, shifts the
/// state left by one and sets the new low bit to the extracted bit. The result
/// is the low bit of the final state, which equals `value & 1` for every
/// `bit_count`.
pub fn calculate_parity(value: u8, bit_count: u8) -> u8 {
    let mut state = u64::from(value);

    for _ in 0..bit_count {
        let bit = state & 1;
        state = (state << 1) | bit;
    }

    (state & 1) as u8
}

/// Recompute the fold parity and compare it with `received`.
pub fn check_parity(value: u8, bit_count: u8, received: u8) -> bool {
    calculate_parity(value, bit_count) == received
}

/// XOR of all eight bits of `value`.
pub fn even_parity(value: u8) -> u8 {
    (value.count_ones() & 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, PackageError};

    #[test]
    fn test_codec_configuration() {
        let codec = Codec::new(6, 2).unwrap();
        assert_eq!(codec.package_size(), 6);
        assert_eq!(codec.parity_bit_count(), 2);
        assert_eq!(codec.scheme(), ParityScheme::Fold);

        let codec = Codec::with_scheme(7, 1, ParityScheme::Even).unwrap();
        assert_eq!(codec.scheme(), ParityScheme::Even);
    }

    #[test]
    fn test_parity_self_consistent() {
        for value in 0..=255u8 {
            for bits in 1..=3u8 {
                let parity = calculate_parity(value, bits);
                assert!(check_parity(value, bits, parity));
                assert!(!check_parity(value, bits, parity ^ 1));
            }
        }
    }

    #[test]
    fn test_fold_is_low_bit() {
        for value in 0..=255u8 {
            for bits in 0..=8u8 {
                assert_eq!(calculate_parity(value, bits), value & 1);
            }
        }
    }

    #[test]
    fn test_even_parity() {
        assert_eq!(even_parity(0x00), 0);
        assert_eq!(even_parity(0x01), 1);
        assert_eq!(even_parity(0x03), 0);
        assert_eq!(even_parity(0b1011_0010), 0);
        assert_eq!(even_parity(0xFF), 0);
        assert_eq!(even_parity(0xFE), 1);
    }

    #[test]
    fn test_detection_probability() {
        assert_eq!(ParityScheme::Fold.detection_probability(0.0), 0.0);
        assert_eq!(ParityScheme::Fold.detection_probability(0.5), 0.5);
        assert_eq!(ParityScheme::Even.detection_probability(0.0), 0.0);
        assert_eq!(ParityScheme::Even.detection_probability(0.5), 0.5);
        // Eight flips is an even count
        assert_eq!(ParityScheme::Even.detection_probability(1.0), 0.0);
    }

    #[test]
    fn test_codec_rejects_invalid_config() {
        for (size, bits) in [(4u8, 1u8), (8, 1), (6, 3), (5, 3), (7, 4)] {
            assert!(matches!(
                Codec::new(size, bits),
                Err(Error::Package(PackageError::InvalidConfiguration { .. }))
            ));
        }
    }

    #[test]
    fn test_pack_single_byte() {
        let codec = Codec::new(7, 1).unwrap();
        let packages = codec.pack(&[0b1011_0010]).unwrap();

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].payload(), Some(&[0b1011_0010][..]));
        assert_eq!(packages[0].parity(), Some(calculate_parity(0b1011_0010, 1)));

        let unpacked = codec.unpack(&packages);
        assert_eq!(unpacked.len(), 1);
        assert_eq!(unpacked.get(0), Some(Decoded::Valid(0b1011_0010)));
        assert_eq!(unpacked.corrupted_count(), 0);
    }

    #[test]
    fn test_pack_preserves_order() {
        let codec = Codec::new(6, 2).unwrap();
        let data: Vec<u8> = (0..=255).collect();
        let packages = codec.pack(&data).unwrap();

        assert_eq!(packages.len(), data.len());
        let unpacked = codec.unpack(&packages);
        for (index, decoded) in unpacked.iter() {
            assert_eq!(decoded, Decoded::Valid(data[index]));
        }
        assert_eq!(unpacked.valid_bytes(), data);
    }

    #[test]
    fn test_pack_width_mismatch() {
        // (5, 1) is a valid configuration but its 6-bit block can't hold a byte
        let codec = Codec::new(5, 1).unwrap();
        assert!(codec.pack(&[]).unwrap().is_empty());
        assert!(matches!(
            codec.pack(&[0x01]),
            Err(Error::Package(PackageError::SizeMismatch { .. }))
        ));
    }

    #[test]
    fn test_unpack_detects_low_bit_flip() {
        let codec = Codec::new(7, 1).unwrap();
        let mut packages = codec.pack(&[0x10, 0x10]).unwrap();

        // Bit 0 flip is caught, bit 7 flip is not
        packages[0].payload_mut().unwrap()[0] ^= 0x01;
        packages[1].payload_mut().unwrap()[0] ^= 0x80;

        let unpacked = codec.unpack(&packages);
        assert_eq!(unpacked.get(0), Some(Decoded::Corrupted));
        assert_eq!(unpacked.get(1), Some(Decoded::Valid(0x90)));
        assert_eq!(unpacked.corrupted_count(), 1);
    }

    #[test]
    fn test_even_scheme_detects_odd_flips() {
        let codec = Codec::with_scheme(7, 1, ParityScheme::Even).unwrap();
        let mut packages = codec.pack(&[0x10, 0x10, 0x10]).unwrap();

        packages[0].payload_mut().unwrap()[0] ^= 0x80;
        packages[1].payload_mut().unwrap()[0] ^= 0b0000_0111;
        // Two flips cancel out
        packages[2].payload_mut().unwrap()[0] ^= 0b1000_0001;

        let unpacked = codec.unpack(&packages);
        assert!(unpacked.get(0).unwrap().is_corrupted());
        assert!(unpacked.get(1).unwrap().is_corrupted());
        assert_eq!(unpacked.get(2), Some(Decoded::Valid(0x91)));
    }

    #[test]
    fn test_unpack_unfilled_package() {
        let codec = Codec::new(7, 1).unwrap();
        let package = Package::new(7, 1).unwrap();

        let unpacked = codec.unpack(&[package]);
        assert_eq!(unpacked.get(0), Some(Decoded::Corrupted));
    }

    #[test]
    fn test_unpack_empty() {
        let codec = Codec::new(7, 1).unwrap();
        let unpacked = codec.unpack(&[]);
        assert!(unpacked.is_empty());
        assert_eq!(unpacked.corrupted_count(), 0);
    }
}
