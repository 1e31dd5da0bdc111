// src/miner/queue.rs
//! Bounded work queue between the generator and the device workers

use crate::miner::work::WorkUnit;
use crossbeam_channel::{Receiver, Sender, bounded};

/// Bounded FIFO of work units
///
/// Cloning yields another handle onto the same queue. Sending on the producer
/// half blocks while the queue is full and receiving on the consumer half
/// blocks while it is empty; both fail only once every handle on the other
/// side is gone.
#[derive(Clone)]
pub struct WorkQueue {
    sender: Sender<WorkUnit>,
    receiver: Receiver<WorkUnit>,
    capacity: usize,
}

impl WorkQueue {
    /// Creates an empty queue holding at most `capacity` units
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        WorkQueue {
            sender,
            receiver,
            capacity,
        }
    }

    /// Producer half, handed to the generator
    pub fn producer(&self) -> Sender<WorkUnit> {
        self.sender.clone()
    }

    /// Consumer half, handed to each worker
    pub fn consumer(&self) -> Receiver<WorkUnit> {
        self.receiver.clone()
    }

    /// Number of units currently buffered
    pub fn buffered(&self) -> usize {
        self.receiver.len()
    }

    /// Configured upper bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
