// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the mining process:
//! - Work units and rate samples passed between tasks
//! - Work generation and the bounded work queue
//! - Device abstraction and the built-in CPU backend
//! - Per-device worker threads

/// Compute device abstraction and backends
pub mod device;

/// Template fetching and nonce space partitioning
pub mod generator;

/// Startup wiring of the whole pipeline
pub mod pipeline;

/// Bounded work queue
pub mod queue;

/// Work unit, rate sample and target embedding
pub mod work;

/// Worker thread implementation
///
/// Contains the worker loop that dispatches units to a device and
/// reports the resulting hash rate.
pub mod worker;

// Re-export main components for cleaner imports
pub use self::device::{Device, HashOutcome, Platform, enumerate_devices, find_devices};
pub use self::generator::WorkGenerator;
pub use self::pipeline::Pipeline;
pub use self::queue::WorkQueue;
pub use self::work::{RateSample, Solution, Template, WorkUnit};
pub use self::worker::{DeviceWorker, WorkerExit};
