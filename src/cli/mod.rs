// src/cli/mod.rs
//! Command-line interface definitions

/// Argument structs and subcommands
pub mod commands;

pub use commands::{Action, BenchmarkOptions, Commands, ConfigOptions, DeviceOptions, StartOptions};
