//! Configuration for the arq-sim application.
//!
//! Parses command-line arguments with clap and resolves them into a
//! [`Config`]. Every option has a default, so the tool runs with zero
//! arguments; the seed is time-based unless given and is printed with the
//! rest of the configuration so runs are reproducible.

use arq_sim_core::{NoiseModel, ParityScheme};
use clap::{Parser, ValueEnum};

use crate::logging::{LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "arq-sim", version, about = "Parity-checked data link over a noisy channel")]
pub struct Cli {
    /// Probability of a bit being flipped in transit [0.0, 1.0].
    #[arg(
        long,
        value_name = "P",
        default_value_t = 0.01,
        value_parser = parse_probability,
        allow_negative_numbers = true
    )]
    pub probability: f64,

    /// Number of bytes to generate and send.
    #[arg(long, value_name = "BYTES", default_value_t = 100)]
    pub data_size: usize,

    /// Package data size in bits [5, 7].
    #[arg(long, value_name = "BITS", default_value_t = 7)]
    pub package_size: u8,

    /// Number of parity bits (must be < package size / 2).
    #[arg(long, value_name = "BITS", default_value_t = 1)]
    pub parity_bits: u8,

    /// Noise model of the channel.
    #[arg(long, value_name = "MODEL", default_value = "bit-flip")]
    pub channel: ChannelKind,

    /// How the parity bit is derived.
    #[arg(long, value_name = "SCHEME", default_value = "fold")]
    pub parity_scheme: SchemeArg,

    /// Random seed for data generation and channel noise.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Print the resolved configuration.
    #[arg(long)]
    pub print_config: bool,

    /// Don't print the metrics summary.
    #[arg(long)]
    pub no_metrics: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChannelKind {
    /// Independent per-bit flips
    BitFlip,
    /// Binary symmetric channel
    Symmetric,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    /// Iterative fold (reduces to the low bit)
    Fold,
    /// Even parity over all eight bits
    Even,
}

impl From<SchemeArg> for ParityScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Fold => ParityScheme::Fold,
            SchemeArg::Even => ParityScheme::Even,
        }
    }
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| format!("invalid probability: {s}"))?;
    if !(0.0..=1.0).contains(&p) {
        return Err(format!("probability {p} is outside [0.0, 1.0]"));
    }
    Ok(p)
}

/// Complete configuration for a transfer run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Channel ===
    /// Bit flip / crossover probability
    pub probability: f64,

    /// Noise model
    pub channel: ChannelKind,

    /// Random seed for determinism
    pub seed: u64,

    // === Data ===
    /// Bytes to generate
    pub data_size: usize,

    // === Codec ===
    /// Package data bits
    pub package_size: u8,

    /// Parity bits
    pub parity_bits: u8,

    /// Parity derivation
    pub parity_scheme: ParityScheme,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve parsed arguments, picking a time-based seed if none was given.
    pub fn from_cli(cli: &Cli) -> Self {
        let seed = cli.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|t| t.as_millis() as u64)
                .unwrap_or_default()
        });

        Config {
            probability: cli.probability,
            channel: cli.channel,
            seed,
            data_size: cli.data_size,
            package_size: cli.package_size,
            parity_bits: cli.parity_bits,
            parity_scheme: cli.parity_scheme.into(),
            print_config: cli.print_config,
            print_metrics: !cli.no_metrics,
        }
    }

    /// Noise model for the configured channel kind and probability.
    pub fn noise_model(&self) -> NoiseModel {
        match self.channel {
            ChannelKind::BitFlip => NoiseModel::IndependentBitFlip(self.probability),
            ChannelKind::Symmetric => NoiseModel::SymmetricCrossover(self.probability),
        }
    }

    /// Seed for the channel RNG, kept apart from the data source stream.
    pub fn channel_seed(&self) -> u64 {
        self.seed ^ 0x9E37_79B9_7F4A_7C15
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Seed: {}", self.seed);
        println!("Data size: {} bytes", self.data_size);
        println!();
        println!("=== Channel ===");
        println!("Model: {:?}", self.channel);
        println!("Flip probability: {:.2}%", self.probability * 100.0);
        println!();
        println!("=== Codec ===");
        println!("Package size: {} bits", self.package_size);
        println!("Parity bits: {}", self.parity_bits);
        println!("Parity scheme: {:?}", self.parity_scheme);
        println!(
            "Expected detection rate: {:.2}%",
            self.parity_scheme.detection_probability(self.probability) * 100.0
        );
        println!();
    }
}
