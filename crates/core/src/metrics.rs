//! Metrics collection and reporting for a transfer run.
//!
//! Tracks what the sender produced, what the channel did to it and what the
//! receiver made of it:
//! - Bytes generated and packages sent/received
//! - Bits flipped by the channel
//! - Packages flagged as corrupted by the parity check
//! - Packages that passed the check but differ from what was sent
//!   (undetected corruption; only knowable when the source bytes are at hand)
//!
//! # Thread Safety
//!
//! `TransferMetrics` is NOT thread-safe. The app fills it on the main thread
//! after the receiver has finished.

use crate::channel::ChannelStats;
use crate::codec::{Decoded, Unpacked};
use std::time::{Duration, Instant};

/// Metrics for one send/receive run.
#[derive(Debug, Clone)]
pub struct TransferMetrics {
    // === Timing ===
    /// When the transfer started
    pub start_time: Instant,

    /// When the transfer ended (set on completion)
    pub end_time: Option<Instant>,

    // === Sender ===
    /// Bytes produced by the data source
    pub bytes_generated: u64,

    /// Packages handed to the link
    pub packages_sent: u64,

    // === Channel ===
    /// Channel statistics at the end of the run
    pub channel: ChannelStats,

    // === Receiver ===
    /// Packages taken from the mailbox
    pub packages_received: u64,

    /// Packages flagged by the parity check
    pub packages_corrupted: u64,

    /// Packages that passed the check with a value different from the source
    pub packages_undetected: u64,
}

impl TransferMetrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            bytes_generated: 0,
            packages_sent: 0,
            channel: ChannelStats::default(),
            packages_received: 0,
            packages_corrupted: 0,
            packages_undetected: 0,
        }
    }

    /// Tally a decode result against the bytes that were sent.
    ///
    /// Entries beyond the end of `source` only count towards received and
    /// corrupted.
    pub fn record_unpacked(&mut self, source: &[u8], unpacked: &Unpacked) {
        for (index, decoded) in unpacked.iter() {
            self.packages_received += 1;
            match decoded {
                Decoded::Corrupted => self.packages_corrupted += 1,
                Decoded::Valid(byte) => {
                    if source.get(index).is_some_and(|&sent| sent != byte) {
                        self.packages_undetected += 1;
                    }
                }
            }
        }
    }

    /// Mark the transfer as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Fraction of received packages flagged as corrupted.
    pub fn detection_rate(&self) -> f64 {
        if self.packages_received == 0 {
            0.0
        } else {
            self.packages_corrupted as f64 / self.packages_received as f64
        }
    }

    /// Fraction of received packages that slipped through with a wrong value.
    pub fn undetected_rate(&self) -> f64 {
        if self.packages_received == 0 {
            0.0
        } else {
            self.packages_undetected as f64 / self.packages_received as f64
        }
    }

    /// Whether every package arrived intact.
    pub fn is_clean(&self) -> bool {
        self.packages_sent == self.packages_received
            && self.packages_corrupted == 0
            && self.packages_undetected == 0
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Transfer Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Sender ===");
        println!("Bytes generated: {}", self.bytes_generated);
        println!("Packages sent: {}", self.packages_sent);
        println!();

        println!("=== Channel ===");
        println!("Packages altered: {} ({:.2}%)", self.channel.packages_altered, self.channel.alteration_rate() * 100.0);
        println!("Bits flipped: {} / {} ({:.2}%)", self.channel.bits_flipped, self.channel.bits_seen, self.channel.bit_error_rate() * 100.0);
        println!();

        println!("=== Receiver ===");
        println!("Packages received: {}", self.packages_received);
        println!("Corruption detected: {} ({:.2}%)", self.packages_corrupted, self.detection_rate() * 100.0);
        println!("Corruption undetected: {} ({:.2}%)", self.packages_undetected, self.undetected_rate() * 100.0);
        println!();
    }

    /// Print just the final result.
    pub fn print_result(&self) {
        if self.is_clean() {
            println!("✓ All {} packages delivered intact", self.packages_received);
        } else {
            println!(
                "✗ {} of {} packages corrupted ({} detected, {} undetected)",
                self.packages_corrupted + self.packages_undetected,
                self.packages_received,
                self.packages_corrupted,
                self.packages_undetected
            );
        }
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             bytes_generated={}\n\
             packages_sent={}\n\
             packages_received={}\n\
             bits_flipped={}\n\
             bit_error_rate={:.4}\n\
             packages_corrupted={}\n\
             detection_rate={:.4}\n\
             packages_undetected={}\n",
            self.duration().as_millis(),
            self.bytes_generated,
            self.packages_sent,
            self.packages_received,
            self.channel.bits_flipped,
            self.channel.bit_error_rate(),
            self.packages_corrupted,
            self.detection_rate(),
            self.packages_undetected,
        )
    }
}

impl Default for TransferMetrics {
    fn default() -> Self {
        Self::new()
    }
}
