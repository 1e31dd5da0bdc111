// src/main.rs
use clap::Parser;
use sia_miner_rs::cli::{Action, BenchmarkOptions, ConfigOptions, DeviceOptions, StartOptions};
use sia_miner_rs::miner::device::{available_platforms, find_devices};
use sia_miner_rs::network::FixedTemplate;
use sia_miner_rs::utils::init_bench_logging;
use sia_miner_rs::*;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Main entry point for the miner
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails, which exits non-zero
fn main() -> Result<(), MinerError> {
    let cli = Commands::parse();

    match cli.action {
        Action::Start(opts) => start_mining(opts),
        Action::Benchmark(opts) => run_benchmark(opts),
        Action::Devices(opts) => list_devices(opts),
        Action::Config(opts) => generate_config(opts),
    }
}

/// Starts mining against the configured daemon
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Enumerates devices, failing if none are eligible
/// 4. Starts generator, workers and submitter
/// 5. Aggregates rate samples on this thread until killed
fn start_mining(opts: StartOptions) -> Result<(), MinerError> {
    init_logging();

    let mut config = config::load_or_default(opts.config)?;
    // Apply CLI overrides
    if opts.cpu {
        config.use_cpu = true;
    }
    if let Some(intensity) = opts.intensity {
        config.intensity = intensity;
    }
    if let Some(url) = opts.url {
        config.siad_url = url;
    }
    let mining = config.mining_config()?;

    let devices = find_devices(&available_platforms(config.cpu_threads), mining.device_filter)?;

    let source: Arc<dyn TemplateSource> = Arc::new(SiadClient::new(
        &config.siad_url,
        &config.user_agent,
        config.request_timeout(),
    )?);
    let pipeline = Pipeline::start(source, &devices, &mining)?;

    let mut aggregator = pipeline.aggregator();
    aggregator.run(&pipeline.reports, &mut io::stdout().lock())?;

    // Only reached once every worker has stopped reporting.
    println!();
    log::error!("All workers stopped");
    Err(MinerError::DeviceError("all workers stopped".into()))
}

/// Runs the pipeline against a fixed template on the CPU device
fn run_benchmark(opts: BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    let config = Config {
        intensity: opts.intensity,
        use_cpu: true,
        cpu_threads: opts.threads,
        ..Config::default()
    };
    let mining = config.mining_config()?;
    let source = FixedTemplate::from_hex(opts.header.as_deref(), opts.target.as_deref())?;

    let devices = find_devices(&available_platforms(config.cpu_threads), mining.device_filter)?;
    let pipeline = Pipeline::start(Arc::new(source), &devices, &mining)?;

    log::info!(
        "Starting benchmark on {} device(s) for {} seconds",
        pipeline.device_count(),
        opts.duration
    );

    let mut aggregator = pipeline.aggregator();
    let mut stdout = io::stdout().lock();
    aggregator.run_for(&pipeline.reports, &mut stdout, Duration::from_secs(opts.duration))?;
    writeln!(stdout)?;

    log::info!("Benchmark results:");
    for (worker_id, rate) in aggregator.rates().iter().enumerate() {
        log::info!("{} - {:.3} MH/s", worker_id, rate);
    }
    log::info!("Total: {:.3} MH/s", aggregator.total());
    log::logger().flush();

    Ok(())
}

/// Logs every eligible device and exits
fn list_devices(opts: DeviceOptions) -> Result<(), MinerError> {
    init_logging();

    let mut config = config::load_or_default(opts.config)?;
    if opts.cpu {
        config.use_cpu = true;
    }
    let mining = config.mining_config()?;

    let devices = find_devices(&available_platforms(config.cpu_threads), mining.device_filter)?;
    for (worker_id, device) in devices.iter().enumerate() {
        println!("{} - {} - {}", worker_id, device.kind(), device.name());
    }
    Ok(())
}

/// Generates configuration template file
fn generate_config(opts: ConfigOptions) -> Result<(), MinerError> {
    std::fs::write(opts.output, config::generate_template())?;
    Ok(())
}
