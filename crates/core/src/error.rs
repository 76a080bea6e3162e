//! Error types for the arq-sim core.
//!
//! Configuration and width errors are fatal to the operation that raised them
//! and are returned synchronously. A failed parity check is NOT an error: it is
//! reported as [`crate::codec::Decoded::Corrupted`] in the decode result.

use thiserror::Error;

/// Top-level error type for all operations in the core.
///
/// Each variant corresponds to a specific failure domain:
/// - Package: construction or payload assignment
/// - Channel: noise model configuration
/// - Link: endpoint registration and delivery
#[derive(Debug, Error)]
pub enum Error {
    /// Package configuration or payload width error
    #[error("package error: {0}")]
    Package(#[from] PackageError),

    /// Channel configuration error
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Link registration or delivery error
    #[error("link error: {0}")]
    Link(#[from] LinkError),
}

/// Package errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    /// Size outside [5, 7] or parity bit count not strictly below half the size
    #[error(
        "invalid package configuration: size {size} (must be 5..=7), \
         parity bits {parity_bits} (must be < size / 2)"
    )]
    InvalidConfiguration { size: u8, parity_bits: u8 },

    /// Payload width doesn't match size + parity bits
    #[error("payload width mismatch: package holds {expected_bits} bits, got {actual_bits}")]
    SizeMismatch {
        expected_bits: usize,
        actual_bits: usize,
    },
}

/// Channel errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// Probability is NaN or outside [0.0, 1.0]
    #[error("invalid probability {0}: must be within [0.0, 1.0]")]
    InvalidProbability(f64),
}

/// Link errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Both endpoint slots are already taken
    #[error("link already has two endpoints connected")]
    LinkFull,

    /// Slot index other than 0 or 1
    #[error("invalid endpoint slot {0}: a link has slots 0 and 1")]
    InvalidSlot(usize),

    /// The slot opposite the sender has no endpoint
    #[error("no endpoint connected at slot {slot}")]
    PeerNotConnected { slot: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
