// src/miner/pipeline.rs
//! Wiring of generator, queue, workers and the rate channel

use crate::config::MiningConfig;
use crate::miner::device::Device;
use crate::miner::generator::WorkGenerator;
use crate::miner::queue::WorkQueue;
use crate::miner::work::{RateSample, Solution};
use crate::miner::worker::{WorkerExit, spawn_workers};
use crate::network::{TemplateSource, spawn_submitter};
use crate::stats::RateAggregator;
use crate::utils::error::MinerError;
use crossbeam_channel::{Receiver, bounded};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A running mining pipeline
///
/// The generator, the workers and the solution submitter run on their own
/// threads; the caller owns the rate sample receiver and drives the
/// aggregator with it.
pub struct Pipeline {
    /// Rate samples from every worker
    pub reports: Receiver<RateSample>,
    /// Work generator thread
    pub generator: JoinHandle<()>,
    /// One thread per device, in worker ID order
    pub workers: Vec<JoinHandle<WorkerExit>>,
    /// Solution submitter thread
    pub submitter: JoinHandle<()>,
    /// Number of devices, and so of workers
    device_count: usize,
}

impl Pipeline {
    /// Starts every background task for `devices`
    ///
    /// Fails with [`MinerError::NoDevices`] before spawning anything when the
    /// device list is empty.
    pub fn start(
        source: Arc<dyn TemplateSource>,
        devices: &[Arc<dyn Device>],
        config: &MiningConfig,
    ) -> Result<Self, MinerError> {
        let device_count = devices.len();
        if device_count == 0 {
            return Err(MinerError::NoDevices);
        }

        // Only the spawned threads keep queue handles once this returns.
        let queue = WorkQueue::new(config.queue_capacity(device_count));
        let (report_tx, report_rx) = bounded(config.report_capacity(device_count));
        let (solution_tx, solution_rx) =
            bounded::<Solution>(config.solution_capacity(device_count));

        log::info!(
            "Starting {} worker(s), intensity {} ({} nonces per dispatch, {} queue slots)",
            device_count,
            config.intensity,
            config.item_size,
            queue.capacity()
        );

        let generator =
            WorkGenerator::new(source.clone(), queue.producer(), config, device_count).spawn()?;
        let workers = spawn_workers(
            devices,
            config.item_size,
            &queue.consumer(),
            &report_tx,
            &solution_tx,
        )?;
        let submitter = spawn_submitter(source, solution_rx)?;

        Ok(Pipeline {
            reports: report_rx,
            generator,
            workers,
            submitter,
            device_count,
        })
    }

    /// Number of workers started
    pub fn device_count(&self) -> usize {
        self.device_count
    }

    /// Fresh aggregator sized for this pipeline
    pub fn aggregator(&self) -> RateAggregator {
        RateAggregator::new(self.device_count)
    }
}
