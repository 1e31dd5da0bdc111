// src/utils/error.rs
use std::io;
use thiserror::Error;
use url;

/// Main error type for the mining application
///
/// This enum represents all possible error conditions that can occur
/// while fetching work, driving devices, and reporting rates.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Errors reaching the template source
    #[error("Network connection error: {0}")]
    ConnectionError(String),

    /// Malformed templates or unexpected daemon responses
    #[error("Protocol violation: {0}")]
    ProtocolError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A device failed to run a dispatch or could not be set up
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Enumeration produced no eligible devices
    #[error("No suitable mining devices found")]
    NoDevices,
}

/// Converts hex decoding errors into MinerError
///
/// Only reachable while parsing user supplied templates (the benchmark
/// header override), hence the `ConfigError` wrapping.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::ConfigError(format!("Hex conversion failed: {}", e))
    }
}
