// src/miner/worker.rs
//! Device worker implementation
//!
//! One worker per enumerated device. A worker pulls work units, runs them on
//! its device, reports a hash rate after every dispatch and forwards any
//! solved headers. Workers share nothing but the channels they were given.

use crate::miner::device::Device;
use crate::miner::work::{RateSample, Solution, WorkUnit};
use crate::utils::error::MinerError;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Why a worker loop ended
#[derive(Debug)]
pub enum WorkerExit {
    /// The work queue or the report sink was closed
    Disconnected,
    /// The device failed a dispatch
    DeviceFailed(MinerError),
}

/// Drives one device
pub struct DeviceWorker {
    /// Dense worker index
    id: usize,
    /// Device this worker owns
    device: Arc<dyn Device>,
    /// Nonces per dispatch
    item_size: u64,
    /// Consumer half of the work queue
    work: Receiver<WorkUnit>,
    /// Where rate samples go
    reports: Sender<RateSample>,
    /// Where solved headers go
    solutions: Sender<Solution>,
}

impl DeviceWorker {
    /// Creates a worker
    ///
    /// # Arguments
    /// * `id` - Worker ID, the device's position in the enumeration
    /// * `device` - Device to dispatch on
    /// * `item_size` - Nonces searched per unit
    /// * `work` - Work queue consumer
    /// * `reports` - Rate sample sink
    /// * `solutions` - Solved header sink
    pub fn new(
        id: usize,
        device: Arc<dyn Device>,
        item_size: u64,
        work: Receiver<WorkUnit>,
        reports: Sender<RateSample>,
        solutions: Sender<Solution>,
    ) -> Self {
        DeviceWorker {
            id,
            device,
            item_size,
            work,
            reports,
            solutions,
        }
    }

    /// Worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs dispatches until the device fails or a channel closes
    ///
    /// A device failure is logged and ends only this worker; it is not
    /// restarted and the remaining workers carry on.
    pub fn run(&self) -> WorkerExit {
        while let Ok(unit) = self.work.recv() {
            let sample = match self.dispatch(&unit) {
                Ok(sample) => sample,
                Err(e) => {
                    log::error!(
                        "Worker {} ({}) stopped: {}",
                        self.id,
                        self.device.name(),
                        e
                    );
                    return WorkerExit::DeviceFailed(e);
                }
            };

            if self.reports.send(sample).is_err() {
                break;
            }
        }

        log::debug!("Worker {} channels closed, exiting", self.id);
        WorkerExit::Disconnected
    }

    /// Moves the worker onto its own named thread
    pub fn spawn(self) -> Result<JoinHandle<WorkerExit>, MinerError> {
        Ok(thread::Builder::new()
            .name(format!("device-worker-{}", self.id))
            .spawn(move || self.run())?)
    }

    /// Runs one unit on the device and turns the timing into a sample
    fn dispatch(&self, unit: &WorkUnit) -> Result<RateSample, MinerError> {
        let start = Instant::now();
        let outcome = self
            .device
            .execute_hash(&unit.header, unit.start_offset, self.item_size)?;
        let elapsed = start.elapsed();

        if let Some(solution) = outcome.solution {
            log::info!(
                "Worker {} found a solution in range {}..{}",
                self.id,
                unit.start_offset,
                unit.start_offset.saturating_add(self.item_size)
            );
            // Never stall mining on a slow submitter.
            match self.solutions.try_send(solution) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => log::warn!(
                    "Worker {}: submission backlog full, dropping solved header",
                    self.id
                ),
                Err(TrySendError::Disconnected(_)) => {
                    log::warn!("Solution channel closed, dropping solved header");
                }
            }
        }

        let hash_rate = hash_rate_mhs(outcome.hashes, elapsed);
        log::debug!(
            "Worker {}: {} hashes in {:?} ({:.3} MH/s)",
            self.id,
            outcome.hashes,
            elapsed,
            hash_rate
        );

        Ok(RateSample {
            worker_id: self.id,
            hash_rate,
        })
    }
}

/// Millions of hashes per second for `hashes` done in `elapsed`
///
/// A zero elapsed time is clamped to one microsecond.
pub fn hash_rate_mhs(hashes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.max(Duration::from_micros(1)).as_secs_f64();
    hashes as f64 / (seconds * 1_000_000.0)
}

/// Spawns one worker per device, IDs following device order
pub fn spawn_workers(
    devices: &[Arc<dyn Device>],
    item_size: u64,
    work: &Receiver<WorkUnit>,
    reports: &Sender<RateSample>,
    solutions: &Sender<Solution>,
) -> Result<Vec<JoinHandle<WorkerExit>>, MinerError> {
    devices
        .iter()
        .enumerate()
        .map(|(id, device)| {
            DeviceWorker::new(
                id,
                device.clone(),
                item_size,
                work.clone(),
                reports.clone(),
                solutions.clone(),
            )
            .spawn()
        })
        .collect()
}
