// src/config/mod.rs
//! Configuration management for the miner
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing configuration files
//! - Generating configuration templates
//! - Deriving the immutable [`MiningConfig`] the pipeline runs with
//!
//! The configuration uses TOML format. Every field has a default, so the
//! file itself is optional.

/// Core configuration implementation
pub mod config;

// Re-export key items for easy access
pub use config::{Config, MiningConfig};

use crate::utils::error::MinerError;
use std::path::PathBuf;

/// Loads miner configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(MinerError)` - If the file couldn't be read or parsed
pub fn load(path: impl Into<PathBuf>) -> Result<Config, MinerError> {
    Config::load(path)
}

/// Loads the file if one was given, otherwise starts from defaults
pub fn load_or_default(path: Option<PathBuf>) -> Result<Config, MinerError> {
    match path {
        Some(path) => load(path),
        None => Ok(Config::default()),
    }
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
