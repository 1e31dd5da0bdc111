// src/miner/device/mod.rs
//! Compute device abstraction
//!
//! A [`Platform`] reports devices, a [`Device`] runs one dispatch over a
//! nonce range. Everything hardware specific lives behind these two traits;
//! the rest of the miner only sees `Arc<dyn Device>` and a dense worker index.

/// Host CPU backend
pub mod cpu;

pub use cpu::{CpuDevice, CpuPlatform};

use crate::miner::work::Solution;
use crate::types::{DeviceKind, DeviceTypeFilter};
use crate::utils::error::MinerError;
use std::sync::Arc;

/// Result of a single dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashOutcome {
    /// Nonces tried
    pub hashes: u64,
    /// Header with the lowest solving nonce of the range, if any
    pub solution: Option<Solution>,
}

/// A compute device able to search a nonce range
pub trait Device: Send + Sync {
    /// Human readable device name
    fn name(&self) -> &str;

    /// Device class, used by the enumeration filter
    fn kind(&self) -> DeviceKind;

    /// Searches `item_size` nonces starting at `start_offset`
    ///
    /// # Arguments
    /// * `header` - Prepared header with the target embedded at bytes 32..40
    /// * `start_offset` - First nonce of the range
    /// * `item_size` - Number of nonces to try
    fn execute_hash(
        &self,
        header: &[u8],
        start_offset: u64,
        item_size: u64,
    ) -> Result<HashOutcome, MinerError>;
}

/// A driver or vendor platform exposing zero or more devices
pub trait Platform {
    /// Platform name, for logging
    fn name(&self) -> &str;

    /// Devices on this platform accepted by `filter`, in a stable order
    fn devices(&self, filter: DeviceTypeFilter) -> Result<Vec<Arc<dyn Device>>, MinerError>;
}

/// Collects eligible devices from every platform
///
/// A platform whose query fails is logged and contributes nothing; the
/// others are unaffected. The position of a device in the returned list
/// is its worker ID.
pub fn enumerate_devices(
    platforms: &[Box<dyn Platform>],
    filter: DeviceTypeFilter,
) -> Vec<Arc<dyn Device>> {
    let mut devices: Vec<Arc<dyn Device>> = Vec::new();

    for platform in platforms {
        log::info!("Platform {}", platform.name());
        match platform.devices(filter) {
            Ok(found) => {
                log::info!("{} device(s) found:", found.len());
                for (i, device) in found.into_iter().enumerate() {
                    log::info!("{} - {} - {}", i, device.kind(), device.name());
                    devices.push(device);
                }
            }
            Err(e) => log::error!("Device query on {} failed: {}", platform.name(), e),
        }
    }

    devices
}

/// Enumerates `platforms`, failing when no device passes `filter`
///
/// Startup must stop here with [`MinerError::NoDevices`] rather than run a
/// pipeline with no workers.
pub fn find_devices(
    platforms: &[Box<dyn Platform>],
    filter: DeviceTypeFilter,
) -> Result<Vec<Arc<dyn Device>>, MinerError> {
    let devices = enumerate_devices(platforms, filter);
    if devices.is_empty() {
        log::error!("No suitable devices found (filter: {})", filter);
        if filter == DeviceTypeFilter::Gpu {
            log::info!("Pass --cpu to also mine on non-GPU devices");
        }
        return Err(MinerError::NoDevices);
    }
    Ok(devices)
}

/// Platforms compiled into this binary
pub fn available_platforms(cpu_threads: usize) -> Vec<Box<dyn Platform>> {
    vec![Box::new(CpuPlatform::new(cpu_threads))]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubDevice {
        name: String,
        kind: DeviceKind,
    }

    impl Device for StubDevice {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> DeviceKind {
            self.kind
        }

        fn execute_hash(&self, _: &[u8], _: u64, item_size: u64) -> Result<HashOutcome, MinerError> {
            Ok(HashOutcome {
                hashes: item_size,
                solution: None,
            })
        }
    }

    struct StubPlatform {
        name: &'static str,
        kinds: Vec<DeviceKind>,
        broken: bool,
    }

    impl Platform for StubPlatform {
        fn name(&self) -> &str {
            self.name
        }

        fn devices(&self, filter: DeviceTypeFilter) -> Result<Vec<Arc<dyn Device>>, MinerError> {
            if self.broken {
                return Err(MinerError::DeviceError("driver missing".into()));
            }
            Ok(self
                .kinds
                .iter()
                .filter(|kind| filter.accepts(**kind))
                .enumerate()
                .map(|(i, kind)| {
                    Arc::new(StubDevice {
                        name: format!("{}-{}", self.name, i),
                        kind: *kind,
                    }) as Arc<dyn Device>
                })
                .collect())
        }
    }

    fn platforms() -> Vec<Box<dyn Platform>> {
        vec![
            Box::new(StubPlatform {
                name: "alpha",
                kinds: vec![DeviceKind::Gpu, DeviceKind::Cpu],
                broken: false,
            }),
            Box::new(StubPlatform {
                name: "broken",
                kinds: vec![DeviceKind::Gpu],
                broken: true,
            }),
            Box::new(StubPlatform {
                name: "beta",
                kinds: vec![DeviceKind::Gpu],
                broken: false,
            }),
        ]
    }

    #[test]
    fn failing_platform_contributes_nothing() {
        let devices = enumerate_devices(&platforms(), DeviceTypeFilter::Gpu);
        let names: Vec<&str> = devices.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["alpha-0", "beta-0"]);
    }

    #[test]
    fn all_filter_keeps_platform_order() {
        let devices = enumerate_devices(&platforms(), DeviceTypeFilter::All);
        let kinds: Vec<DeviceKind> = devices.iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![DeviceKind::Gpu, DeviceKind::Cpu, DeviceKind::Gpu]);
    }

    #[test]
    fn no_platforms_means_no_devices() {
        assert!(enumerate_devices(&[], DeviceTypeFilter::All).is_empty());
        assert!(matches!(
            find_devices(&[], DeviceTypeFilter::All),
            Err(MinerError::NoDevices)
        ));
    }

    #[test]
    fn cpu_only_platforms_have_nothing_for_the_gpu_filter() {
        let cpu_only: Vec<Box<dyn Platform>> = vec![Box::new(StubPlatform {
            name: "host",
            kinds: vec![DeviceKind::Cpu, DeviceKind::Accelerator],
            broken: false,
        })];
        assert!(matches!(
            find_devices(&cpu_only, DeviceTypeFilter::Gpu),
            Err(MinerError::NoDevices)
        ));
        assert_eq!(find_devices(&cpu_only, DeviceTypeFilter::All).unwrap().len(), 2);
    }

    #[test]
    fn built_in_platforms_follow_the_filter() {
        assert!(matches!(
            find_devices(&available_platforms(1), DeviceTypeFilter::Gpu),
            Err(MinerError::NoDevices)
        ));
        let devices = find_devices(&available_platforms(1), DeviceTypeFilter::All).unwrap();
        assert_eq!(devices[0].kind(), DeviceKind::Cpu);
    }
}
