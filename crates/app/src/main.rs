//! arq-sim - parity-checked data link over a noisy channel
//!
//! Generates bytes, packs them into parity-carrying packages, pushes them
//! through a noisy channel to a receiver on another thread and reports how
//! many packages the parity check flagged.

mod config;
mod controller;
mod input_gen;
mod logging;

use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use arq_sim_core::metrics::TransferMetrics;
use arq_sim_core::{Channel, Codec, Link};
use clap::Parser;
use tracing::{debug, info};

use crate::config::{Cli, Config};
use crate::controller::{ReceiverController, SenderController};
use crate::input_gen::RandomSource;
use crate::logging::{init_logging, Logger, TracingLogger};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let config = Config::from_cli(&cli);
    if config.print_config {
        config.print();
    }

    let metrics = run(&config)?;

    if config.print_metrics {
        metrics.print_summary();
    }
    metrics.print_result();

    Ok(())
}

/// Build the link, send once, receive once.
fn run(config: &Config) -> Result<TransferMetrics> {
    let codec = Codec::with_scheme(config.package_size, config.parity_bits, config.parity_scheme)
        .context("invalid codec configuration")?;
    let channel = Channel::new(config.noise_model(), config.channel_seed())
        .context("invalid channel configuration")?;
    let model = channel.model();
    let (link, transmitter, receiver) = Link::with_endpoints(channel)?;

    info!(
        seed = config.seed,
        model = ?model,
        package_size = codec.package_size(),
        parity_bits = codec.parity_bit_count(),
        scheme = ?codec.scheme(),
        "link established"
    );

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    let mut metrics = TransferMetrics::new();

    let mut sender = SenderController::new(
        transmitter,
        codec,
        Box::new(RandomSource::new(config.seed, config.data_size)),
    )
    .with_logger(Arc::clone(&logger));
    let sent = sender.run().context("send failed")?;
    metrics.bytes_generated = sent.data.len() as u64;
    metrics.packages_sent = sent.packages as u64;

    let receiver = ReceiverController::new(receiver, codec).with_logger(logger);
    let handle = thread::Builder::new()
        .name("receiver".to_string())
        .spawn(move || receiver.run())
        .context("failed to spawn receiver thread")?;
    let report = handle
        .join()
        .map_err(|_| anyhow!("receiver thread panicked"))?;

    debug!(received = report.received, failed = report.failed, "receive complete");

    metrics.channel = link.stats();
    metrics.record_unpacked(&sent.data, &report.unpacked);
    metrics.complete();

    Ok(metrics)
}
