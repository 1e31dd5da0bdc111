// src/miner/generator.rs
//! Work generation
//!
//! Turns each fetched template into `2 × device count` work units and feeds
//! them into the bounded work queue. A full queue blocks the generator, which
//! is what paces template fetches to the rate the devices consume work.

use crate::config::MiningConfig;
use crate::miner::work::{MIN_HEADER_LEN, Template, WorkUnit, embed_target, partition};
use crate::network::TemplateSource;
use crate::utils::error::MinerError;
use crossbeam_channel::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Fetches templates and splits them into work units
pub struct WorkGenerator<S> {
    /// Where templates come from
    source: S,
    /// Producer half of the work queue
    queue: Sender<WorkUnit>,
    /// Nonces per unit
    item_size: u64,
    /// Units emitted per template
    work_items_per_fetch: usize,
    /// Pause after a failed fetch
    retry_pause: Duration,
}

impl<S: TemplateSource> WorkGenerator<S> {
    /// Creates a generator sized for `device_count` devices
    pub fn new(
        source: S,
        queue: Sender<WorkUnit>,
        config: &MiningConfig,
        device_count: usize,
    ) -> Self {
        WorkGenerator {
            source,
            queue,
            item_size: config.item_size,
            work_items_per_fetch: config.work_items_per_fetch(device_count),
            retry_pause: config.fetch_retry_pause,
        }
    }

    /// Runs the fetch/split/push loop
    ///
    /// Fetch failures never end the loop: they are logged and retried after
    /// the configured pause. The loop only returns once every consumer of the
    /// work queue has been dropped.
    pub fn run(&self) {
        loop {
            let template = match self.source.fetch() {
                Ok(template) => template,
                Err(e) => {
                    log::error!("ERROR fetching work - {}", e);
                    thread::sleep(self.retry_pause);
                    continue;
                }
            };

            let units = match prepare(template, self.item_size, self.work_items_per_fetch) {
                Ok(units) => units,
                Err(e) => {
                    log::error!("ERROR preparing work - {}", e);
                    thread::sleep(self.retry_pause);
                    continue;
                }
            };

            for unit in units {
                if self.queue.send(unit).is_err() {
                    log::debug!("Work queue closed, generator exiting");
                    return;
                }
            }
        }
    }
}

impl<S: TemplateSource + 'static> WorkGenerator<S> {
    /// Moves the generator onto its own thread
    pub fn spawn(self) -> Result<JoinHandle<()>, MinerError> {
        Ok(thread::Builder::new()
            .name("work-generator".into())
            .spawn(move || self.run())?)
    }
}

/// Embeds the template's target into its header and partitions the nonce space
pub fn prepare(
    template: Template,
    item_size: u64,
    count: usize,
) -> Result<Vec<WorkUnit>, MinerError> {
    let Template { target, mut header } = template;
    if header.len() < MIN_HEADER_LEN {
        return Err(MinerError::ProtocolError(format!(
            "header is {} bytes, need at least {}",
            header.len(),
            MIN_HEADER_LEN
        )));
    }

    embed_target(&mut header, &target);
    Ok(partition(&header, item_size, count))
}
