//! Package: one coded unit travelling over the link.
//!
//! A package carries a byte-aligned payload block together with a single
//! parity bit computed by the codec. The channel may flip payload bits in
//! place; the parity bit is never recomputed, which is what lets the receiver
//! notice the corruption.
//!
//! # Width Rule
//!
//! ```text
//! payload.len() * 8 == size + parity_bit_count
//! ```
//!
//! The data bits and the parity bits are accounted for as one block, so a
//! one-byte payload is only accepted by configurations whose total width is
//! eight bits: `(7, 1)` and `(6, 2)`.

use crate::error::{PackageError, Result};
use std::ops::RangeInclusive;

/// Allowed number of payload data bits.
pub const SIZE_RANGE: RangeInclusive<u8> = 5..=7;

/// Check a `(size, parity_bit_count)` pair.
///
/// # Errors
/// `PackageError::InvalidConfiguration` if `size` is outside [`SIZE_RANGE`] or
/// `parity_bit_count >= size / 2` (compared exactly, so `size = 7` allows up to
/// 3 parity bits and `size = 6` up to 2).
pub fn validate_config(size: u8, parity_bit_count: u8) -> Result<()> {
    let parity_fits = u16::from(parity_bit_count) * 2 < u16::from(size);
    if !SIZE_RANGE.contains(&size) || !parity_fits {
        return Err(PackageError::InvalidConfiguration {
            size,
            parity_bits: parity_bit_count,
        }
        .into());
    }
    Ok(())
}

/// A fixed-width payload plus its parity bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Number of payload data bits
    size: u8,

    /// Number of parity bits accounted for in the payload width
    parity_bit_count: u8,

    /// Payload block (None until the codec fills it)
    payload: Option<Vec<u8>>,

    /// Parity bit computed at encode time
    parity: Option<u8>,
}

impl Package {
    /// Create an empty package.
    ///
    /// # Errors
    /// See [`validate_config`].
    pub fn new(size: u8, parity_bit_count: u8) -> Result<Self> {
        validate_config(size, parity_bit_count)?;

        Ok(Self {
            size,
            parity_bit_count,
            payload: None,
            parity: None,
        })
    }

    /// Total width in bits the payload block must have.
    pub fn width_bits(&self) -> usize {
        usize::from(self.size) + usize::from(self.parity_bit_count)
    }

    /// Store the payload block.
    ///
    /// # Errors
    /// `PackageError::SizeMismatch` if `payload.len() * 8` differs from
    /// [`Package::width_bits`]. The package is left unchanged on error.
    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<()> {
        let actual_bits = payload.len() * 8;
        let expected_bits = self.width_bits();

        if actual_bits != expected_bits {
            return Err(PackageError::SizeMismatch {
                expected_bits,
                actual_bits,
            }
            .into());
        }

        self.payload = Some(payload);
        Ok(())
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Mutable view of the payload bytes.
    ///
    /// The slice cannot grow or shrink, so the width rule still holds after
    /// the caller flips bits.
    pub fn payload_mut(&mut self) -> Option<&mut [u8]> {
        self.payload.as_deref_mut()
    }

    /// Store the parity bit.
    ///
    /// A package carries a single parity bit whatever `parity_bit_count`
    /// says, so `parity` must be 0 or 1.
    pub fn set_parity(&mut self, parity: u8) {
        debug_assert!(parity <= 1, "parity must be a single bit, got {parity}");
        self.parity = Some(parity & 1);
    }

    pub fn parity(&self) -> Option<u8> {
        self.parity
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn parity_bit_count(&self) -> u8 {
        self.parity_bit_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_valid_configurations() {
        for size in 5u8..=7 {
            for parity_bits in 0..8u8 {
                let result = Package::new(size, parity_bits);
                if u16::from(parity_bits) * 2 < u16::from(size) {
                    assert!(result.is_ok(), "({size}, {parity_bits}) should be valid");
                } else {
                    assert!(matches!(
                        result,
                        Err(Error::Package(PackageError::InvalidConfiguration { .. }))
                    ));
                }
            }
        }
    }

    #[test]
    fn test_size_out_of_range() {
        for size in [0u8, 4, 8, 255] {
            let result = Package::new(size, 1);
            assert!(matches!(
                result,
                Err(Error::Package(PackageError::InvalidConfiguration { .. }))
            ));
        }
    }

    #[test]
    fn test_parity_bits_at_half_rejected() {
        // 6 / 2 = 3 exactly: strict inequality required
        assert!(Package::new(6, 3).is_err());
        assert!(Package::new(6, 2).is_ok());
        // 7 / 2 = 3.5
        assert!(Package::new(7, 3).is_ok());
        assert!(Package::new(7, 4).is_err());
    }

    #[test]
    fn test_set_payload_width() {
        let mut package = Package::new(7, 1).unwrap();
        package.set_payload(vec![0xAB]).unwrap();
        assert_eq!(package.payload(), Some(&[0xAB][..]));

        let mut package = Package::new(6, 2).unwrap();
        assert!(package.set_payload(vec![0x01]).is_ok());
    }

    #[test]
    fn test_set_payload_mismatch() {
        let mut package = Package::new(5, 1).unwrap();
        let result = package.set_payload(vec![0x01]);
        assert!(matches!(
            result,
            Err(Error::Package(PackageError::SizeMismatch {
                expected_bits: 6,
                actual_bits: 8
            }))
        ));
        assert!(package.payload().is_none());

        let mut package = Package::new(7, 1).unwrap();
        assert!(package.set_payload(vec![0x01, 0x02]).is_err());
        assert!(package.set_payload(Vec::new()).is_err());
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let mut package = Package::new(7, 1).unwrap();
        package.set_payload(vec![0x5A]).unwrap();
        package.set_parity(1);

        for _ in 0..3 {
            assert_eq!(package.payload(), Some(&[0x5A][..]));
            assert_eq!(package.parity(), Some(1));
            assert_eq!(package.size(), 7);
            assert_eq!(package.parity_bit_count(), 1);
        }
    }

    #[test]
    fn test_payload_mut_keeps_parity() {
        let mut package = Package::new(7, 1).unwrap();
        package.set_payload(vec![0b0000_0001]).unwrap();
        package.set_parity(1);

        if let Some(bytes) = package.payload_mut() {
            bytes[0] ^= 0xFF;
        }

        assert_eq!(package.payload(), Some(&[0b1111_1110][..]));
        assert_eq!(package.parity(), Some(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "parity must be a single bit")]
    fn test_set_parity_rejects_wide_value() {
        let mut package = Package::new(7, 1).unwrap();
        package.set_parity(2);
    }

    #[test]
    fn test_empty_package() {
        let package = Package::new(5, 2).unwrap();
        assert!(package.payload().is_none());
        assert!(package.parity().is_none());
        assert_eq!(package.width_bits(), 7);
    }
}
