// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sia Miner CLI - multi-device Sia miner in Rust
#[derive(Parser, Debug)]
#[command(name = "sia-miner-rs")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Start mining against a Sia daemon
    Start(StartOptions),

    /// Measure device throughput against a fixed local template
    Benchmark(BenchmarkOptions),

    /// List the devices that would be used for mining
    Devices(DeviceOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for starting the mining operation
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file (defaults apply without one)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// If set, also use the CPU for mining, only GPU's are used by default
    #[arg(long)]
    pub cpu: bool,

    /// Intensity: each dispatch searches 2^intensity nonces (overrides config)
    #[arg(short = 'I', long)]
    pub intensity: Option<u32>,

    /// Sia daemon base URL (overrides config)
    #[arg(short, long)]
    pub url: Option<String>,
}

/// Options for running a local benchmark
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 60)]
    pub duration: u64,

    /// Intensity: each dispatch searches 2^intensity nonces
    #[arg(short = 'I', long, default_value_t = 20)]
    pub intensity: u32,

    /// Threads backing the CPU device
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Header to hash, hex encoded (defaults to 80 zero bytes)
    #[arg(long)]
    pub header: Option<String>,

    /// 8-byte target, hex encoded (defaults to all zeros: nothing solves)
    #[arg(long)]
    pub target: Option<String>,
}

/// Options for listing devices
#[derive(Parser, Debug)]
pub struct DeviceOptions {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Include non-GPU devices
    #[arg(long)]
    pub cpu: bool,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
