// src/config/config.rs
use crate::types::DeviceTypeFilter;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Work units generated per device for every fetched template
pub const WORK_ITEMS_PER_DEVICE: usize = 2;

/// Work queue slots per device
pub const QUEUE_SLOTS_PER_DEVICE: usize = 4;

/// Rate sample buffer slots per device
pub const REPORT_SLOTS_PER_DEVICE: usize = 10;

/// Solved headers awaiting submission, per device
pub const SOLUTION_SLOTS_PER_DEVICE: usize = 2;

/// Largest accepted intensity; keeps `2^intensity` well inside the nonce space
pub const MAX_INTENSITY: u32 = 40;

/// Main configuration structure for the mining application
///
/// Everything here can come from a TOML file; the CLI overrides
/// individual fields before [`MiningConfig`] is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Exponent of the per-dispatch search space (`item_size = 2^intensity`)
    #[serde(default = "default_intensity")]
    pub intensity: u32,

    /// Also mine on non-GPU devices
    #[serde(default)]
    pub use_cpu: bool,

    /// Base URL of the Sia daemon
    #[serde(default = "default_siad_url")]
    pub siad_url: String,

    /// User agent presented to the daemon
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pause between failed template fetches, in milliseconds
    #[serde(default = "default_fetch_retry_pause_ms")]
    pub fetch_retry_pause_ms: u64,

    /// HTTP request timeout, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Threads backing the CPU device
    /// (default: number of CPU cores)
    #[serde(default = "default_cpu_threads")]
    pub cpu_threads: usize,
}

fn default_intensity() -> u32 {
    22
}

fn default_siad_url() -> String {
    "http://localhost:9980".into()
}

fn default_user_agent() -> String {
    "Sia-Agent".into()
}

fn default_fetch_retry_pause_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_cpu_threads() -> usize {
    num_cpus::get()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            intensity: default_intensity(),
            use_cpu: false,
            siad_url: default_siad_url(),
            user_agent: default_user_agent(),
            fetch_retry_pause_ms: default_fetch_retry_pause_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            cpu_threads: default_cpu_threads(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&config_str)
    }

    /// Parses configuration from TOML text
    pub fn parse(text: &str) -> Result<Self, MinerError> {
        toml::from_str(text)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))
    }

    /// Checks ranges and the daemon URL
    pub fn validate(&self) -> Result<(), MinerError> {
        item_size(self.intensity)?;

        if self.cpu_threads == 0 {
            return Err(MinerError::ConfigError(
                "cpu_threads must be greater than 0".to_string(),
            ));
        }

        let url = Url::parse(&self.siad_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(MinerError::ConfigError(format!(
                "siad_url must be an http(s) URL, got '{}'",
                self.siad_url
            )));
        }

        Ok(())
    }

    /// Validates and freezes the settings the pipeline runs with
    pub fn mining_config(&self) -> Result<MiningConfig, MinerError> {
        self.validate()?;
        MiningConfig::new(
            self.intensity,
            if self.use_cpu {
                DeviceTypeFilter::All
            } else {
                DeviceTypeFilter::Gpu
            },
            Duration::from_millis(self.fetch_retry_pause_ms),
        )
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Sia Miner Configuration\n\n");
        template.push_str("# Search space per dispatch is 2^intensity nonces (1-40)\n");
        template.push_str("intensity = 22\n");
        template.push_str("# Also mine on CPUs and other non-GPU devices\n");
        template.push_str("use_cpu = false\n");
        template.push_str("# Threads backing the CPU device\n");
        template.push_str(&format!("cpu_threads = {}\n\n", num_cpus::get()));
        template.push_str("# Sia daemon API\n");
        template.push_str("siad_url = \"http://localhost:9980\"\n");
        template.push_str("user_agent = \"Sia-Agent\"\n");
        template.push_str("request_timeout_ms = 10000\n");
        template.push_str("# Pause before retrying a failed header fetch\n");
        template.push_str("fetch_retry_pause_ms = 1000\n");
        template
    }
}

/// Nonces per dispatch for `intensity`, rejecting values outside `1..=MAX_INTENSITY`
fn item_size(intensity: u32) -> Result<u64, MinerError> {
    if intensity == 0 || intensity > MAX_INTENSITY {
        return Err(MinerError::ConfigError(format!(
            "intensity must be between 1 and {}, got {}",
            MAX_INTENSITY, intensity
        )));
    }
    Ok(1u64 << intensity)
}

/// Immutable settings shared by the generator, the workers and enumeration
///
/// Built once at startup and handed out by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningConfig {
    /// Exponent of the per-dispatch search space
    pub intensity: u32,
    /// Nonces searched per dispatch, `2^intensity`
    pub item_size: u64,
    /// Which devices enumeration keeps
    pub device_filter: DeviceTypeFilter,
    /// Pause between failed template fetches
    pub fetch_retry_pause: Duration,
}

impl MiningConfig {
    /// Creates a config, deriving `item_size` from `intensity`
    ///
    /// Fails with `ConfigError` for an intensity outside `1..=MAX_INTENSITY`.
    pub fn new(
        intensity: u32,
        device_filter: DeviceTypeFilter,
        fetch_retry_pause: Duration,
    ) -> Result<Self, MinerError> {
        Ok(MiningConfig {
            intensity,
            item_size: item_size(intensity)?,
            device_filter,
            fetch_retry_pause,
        })
    }

    /// Units generated per fetched template
    pub fn work_items_per_fetch(&self, device_count: usize) -> usize {
        device_count * WORK_ITEMS_PER_DEVICE
    }

    /// Capacity of the work queue
    pub fn queue_capacity(&self, device_count: usize) -> usize {
        device_count * QUEUE_SLOTS_PER_DEVICE
    }

    /// Capacity of the rate sample channel
    pub fn report_capacity(&self, device_count: usize) -> usize {
        device_count * REPORT_SLOTS_PER_DEVICE
    }

    /// Capacity of the solution backlog in front of the submitter
    pub fn solution_capacity(&self, device_count: usize) -> usize {
        device_count * SOLUTION_SLOTS_PER_DEVICE
    }
}
