//! Sia Miner - multi-device Sia miner in Rust
//!
//! This crate distributes hashing work across every eligible compute device
//! and folds their throughput into one live rate line:
//! - Templates fetched from a Sia daemon and split into per-dispatch work units
//! - A bounded work queue feeding one worker thread per device
//! - Per-worker rate samples aggregated into a running total

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Miner core: work model, generator, queue, devices and workers
pub mod miner;

/// Template source abstraction and the Sia daemon client
pub mod network;

/// Hash rate aggregation and rendering
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::{Config, MiningConfig};
pub use miner::{Device, DeviceWorker, Pipeline, RateSample, WorkGenerator, WorkQueue, WorkUnit};
pub use network::{SiadClient, TemplateSource};
pub use stats::RateAggregator;
pub use types::{DeviceKind, DeviceTypeFilter};
pub use utils::{MinerError, init_logging};
