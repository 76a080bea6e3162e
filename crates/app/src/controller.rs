//! Sender and receiver controllers.
//!
//! The sender pulls bytes from a data source, packs them and transmits the
//! batch in one go. The receiver blocks on its endpoint until a batch
//! arrives, unpacks it and counts the packages flagged as corrupted.
//! Corruption is reported, never retried.

use std::sync::Arc;

use arq_sim_core::{Codec, Endpoint, Result, Unpacked};

use crate::input_gen::DataSource;
use crate::logging::Logger;

/// What the sender transmitted.
#[derive(Debug, Clone)]
pub struct SendReport {
    pub data: Vec<u8>,
    pub packages: usize,
}

/// What the receiver decoded.
#[derive(Debug, Clone)]
pub struct ReceiveReport {
    pub unpacked: Unpacked,
    pub received: usize,
    pub failed: usize,
}

pub struct SenderController {
    endpoint: Endpoint,
    codec: Codec,
    source: Box<dyn DataSource>,
    logger: Option<Arc<dyn Logger>>,
}

impl SenderController {
    const TAG: &'static str = "SenderController";

    pub fn new(endpoint: Endpoint, codec: Codec, source: Box<dyn DataSource>) -> Self {
        Self {
            endpoint,
            codec,
            source,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Pack the source data and transmit it.
    ///
    /// # Errors
    /// Width mismatches from packing and link errors from transmitting.
    pub fn run(&mut self) -> Result<SendReport> {
        let data = self.source.data();
        let packages = self.codec.pack(&data)?;
        let count = packages.len();

        self.endpoint.transmit(packages)?;

        if let Some(logger) = &self.logger {
            logger.log(
                Self::TAG,
                &format!("Sent : {:?}, length : {}", data, data.len()),
            );
        }

        Ok(SendReport {
            data,
            packages: count,
        })
    }
}

pub struct ReceiverController {
    endpoint: Endpoint,
    codec: Codec,
    logger: Option<Arc<dyn Logger>>,
}

impl ReceiverController {
    const TAG: &'static str = "ReceiverController";

    pub fn new(endpoint: Endpoint, codec: Codec) -> Self {
        Self {
            endpoint,
            codec,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Wait for one batch, decode it and count corruption markers.
    pub fn run(&self) -> ReceiveReport {
        let packages = self.endpoint.recv();
        let unpacked = self.codec.unpack(&packages);
        let failed = unpacked.corrupted_count();

        if let Some(logger) = &self.logger {
            logger.log(
                Self::TAG,
                &format!("Received : {}, failed : {}", packages.len(), failed),
            );
        }

        ReceiveReport {
            received: packages.len(),
            failed,
            unpacked,
        }
    }
}
