//! arq-sim-core: parity-checked data link over a simulated noisy channel
//!
//! This library provides the core components of a point-to-point link
//! simulation:
//! - Encodes bytes into fixed-width packages carrying a parity bit
//! - Corrupts payload bits in transit according to a noise model
//! - Decodes packages and flags those whose parity check fails
//!
//! # Architecture
//!
//! - `package`: Fixed-width payload + parity value object
//! - `codec`: Byte <-> package translation and the parity algorithms
//! - `bitio`: MSB-first bit ordering helpers
//! - `channel`: Noise models (per-bit flips, binary symmetric channel)
//! - `link`: Two-slot link with blocking single-batch mailboxes
//! - `metrics`: Transfer statistics
//!
//! # Scope
//!
//! Corruption is detected, never corrected, and nothing is retransmitted.
//! The core performs no I/O and never logs.

pub mod bitio;
pub mod channel;
pub mod codec;
pub mod error;
pub mod link;
pub mod metrics;
pub mod package;

// Re-export commonly used types
pub use channel::{Channel, ChannelStats, NoiseModel};
pub use codec::{Codec, Decoded, ParityScheme, Unpacked};
pub use error::{Error, Result};
pub use link::{Endpoint, Link};
pub use package::Package;
