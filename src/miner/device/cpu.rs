// src/miner/device/cpu.rs
//! CPU mining backend
//!
//! Exposes the host processor as a single non-GPU device. A dispatch is
//! spread over a dedicated rayon pool so the CPU device does not compete
//! with rayon's global pool.

use crate::miner::device::{Device, HashOutcome, Platform};
use crate::miner::work::{Solution, TARGET_LEN, TARGET_OFFSET, extract_target};
use crate::types::{DeviceKind, DeviceTypeFilter};
use crate::utils::error::MinerError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use sysinfo::System;

type Blake2b256 = Blake2b<U32>;

/// Hashes `header` with `nonce` written (little-endian) over the target field
///
/// Returns the 32-byte BLAKE2b-256 digest. `buf` is scratch space of the
/// header's length and is left holding the nonced header.
pub fn hash_with_nonce(buf: &mut [u8], nonce: u64) -> [u8; 32] {
    buf[TARGET_OFFSET..TARGET_OFFSET + TARGET_LEN].copy_from_slice(&nonce.to_le_bytes());
    digest(buf)
}

fn digest(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b256::digest(data));
    out
}

/// Whether a digest meets the 8-byte target
///
/// The leading 8 bytes of the digest, read big-endian, must not exceed the target.
pub fn meets_target(hash: &[u8; 32], target: &[u8; TARGET_LEN]) -> bool {
    let mut lead = [0u8; TARGET_LEN];
    lead.copy_from_slice(&hash[..TARGET_LEN]);
    u64::from_be_bytes(lead) <= u64::from_be_bytes(*target)
}

/// The host CPU as a mining device
pub struct CpuDevice {
    /// CPU brand string
    name: String,
    /// Pool running the nonce search
    pool: ThreadPool,
}

impl CpuDevice {
    /// Creates a CPU device backed by `threads` rayon threads
    pub fn new(threads: usize) -> Result<Self, MinerError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("cpu-miner-{}", i))
            .build()
            .map_err(|e| MinerError::DeviceError(format!("CPU thread pool: {}", e)))?;

        Ok(CpuDevice {
            name: cpu_brand(),
            pool,
        })
    }

    /// Number of threads in the search pool
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Device for CpuDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::Cpu
    }

    fn execute_hash(
        &self,
        header: &[u8],
        start_offset: u64,
        item_size: u64,
    ) -> Result<HashOutcome, MinerError> {
        if header.len() < TARGET_OFFSET + TARGET_LEN {
            return Err(MinerError::DeviceError(format!(
                "header of {} bytes has no target field",
                header.len()
            )));
        }
        let end = start_offset.checked_add(item_size).ok_or_else(|| {
            MinerError::DeviceError(format!(
                "nonce range {}+{} overflows",
                start_offset, item_size
            ))
        })?;
        let target = extract_target(header);

        let winner = self.pool.install(|| {
            (start_offset..end)
                .into_par_iter()
                .map_init(
                    || header.to_vec(),
                    |buf, nonce| {
                        let hash = hash_with_nonce(buf, nonce);
                        meets_target(&hash, &target).then_some(nonce)
                    },
                )
                .flatten()
                .min()
        });

        let solution = winner.map(|nonce| {
            let mut solved = header.to_vec();
            solved[TARGET_OFFSET..TARGET_OFFSET + TARGET_LEN].copy_from_slice(&nonce.to_le_bytes());
            Solution { header: solved }
        });

        Ok(HashOutcome {
            hashes: item_size,
            solution,
        })
    }
}

/// Platform exposing the host CPU
pub struct CpuPlatform {
    threads: usize,
}

impl CpuPlatform {
    /// Creates the platform; `threads` sizes the device's search pool
    pub fn new(threads: usize) -> Self {
        CpuPlatform { threads }
    }
}

impl Platform for CpuPlatform {
    fn name(&self) -> &str {
        "Host CPU"
    }

    fn devices(&self, filter: DeviceTypeFilter) -> Result<Vec<Arc<dyn Device>>, MinerError> {
        if !filter.accepts(DeviceKind::Cpu) {
            return Ok(Vec::new());
        }
        Ok(vec![Arc::new(CpuDevice::new(self.threads)?)])
    }
}

fn cpu_brand() -> String {
    let system = System::new_all();
    system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "CPU".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::work::embed_target;

    fn header_with_target(target: [u8; TARGET_LEN]) -> Vec<u8> {
        let mut header: Vec<u8> = (0..80).collect();
        embed_target(&mut header, &target);
        header
    }

    #[test]
    fn gpu_filter_hides_the_cpu() {
        let platform = CpuPlatform::new(1);
        assert!(platform.devices(DeviceTypeFilter::Gpu).unwrap().is_empty());
        assert_eq!(platform.devices(DeviceTypeFilter::All).unwrap().len(), 1);
    }

    #[test]
    fn device_reports_its_kind_and_threads() {
        let device = CpuDevice::new(2).unwrap();
        assert_eq!(device.kind(), DeviceKind::Cpu);
        assert_eq!(device.threads(), 2);
        assert!(!device.name().is_empty());
    }

    fn nonce_of(solution: &Solution) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&solution.header[TARGET_OFFSET..TARGET_OFFSET + TARGET_LEN]);
        u64::from_le_bytes(raw)
    }

    #[test]
    fn max_target_reports_lowest_nonce_once() {
        let device = CpuDevice::new(2).unwrap();
        let header = header_with_target([0xff; TARGET_LEN]);

        let outcome = device.execute_hash(&header, 32, 16).unwrap();
        assert_eq!(outcome.hashes, 16);
        let solution = outcome.solution.unwrap();
        assert_eq!(nonce_of(&solution), 32);
        assert_eq!(solution.header.len(), header.len());
    }

    #[test]
    fn large_easy_dispatch_yields_a_single_solution() {
        let device = CpuDevice::new(2).unwrap();
        let header = header_with_target([0xff; TARGET_LEN]);

        let outcome = device.execute_hash(&header, 0, 1 << 16).unwrap();
        assert_eq!(outcome.hashes, 1 << 16);
        assert_eq!(outcome.solution.map(|s| nonce_of(&s)), Some(0));
    }

    #[test]
    fn zero_target_finds_nothing() {
        let device = CpuDevice::new(1).unwrap();
        let header = header_with_target([0; TARGET_LEN]);

        let outcome = device.execute_hash(&header, 0, 64).unwrap();
        assert_eq!(outcome.hashes, 64);
        assert!(outcome.solution.is_none());
    }

    #[test]
    fn solution_verifies_independently() {
        let device = CpuDevice::new(2).unwrap();
        let target = [0x20, 0, 0, 0, 0, 0, 0, 0];
        let header = header_with_target(target);

        let outcome = device.execute_hash(&header, 0, 256).unwrap();
        let solution = outcome.solution.unwrap();
        assert!(meets_target(&digest(&solution.header), &target));

        // No lower nonce in the range solves.
        let mut buf = header.clone();
        for nonce in 0..nonce_of(&solution) {
            assert!(!meets_target(&hash_with_nonce(&mut buf, nonce), &target));
        }
    }

    #[test]
    fn short_header_is_a_device_error() {
        let device = CpuDevice::new(1).unwrap();
        assert!(matches!(
            device.execute_hash(&[0u8; 20], 0, 4),
            Err(MinerError::DeviceError(_))
        ));
    }

    #[test]
    fn overflowing_range_is_a_device_error() {
        let device = CpuDevice::new(1).unwrap();
        let header = header_with_target([0xff; TARGET_LEN]);
        assert!(device.execute_hash(&header, u64::MAX, 2).is_err());
    }

    #[test]
    fn target_comparison_is_big_endian_and_inclusive() {
        let mut hash = [0u8; 32];
        hash[7] = 5;
        assert!(meets_target(&hash, &[0, 0, 0, 0, 0, 0, 0, 5]));
        assert!(!meets_target(&hash, &[0, 0, 0, 0, 0, 0, 0, 4]));
        hash[0] = 1;
        assert!(!meets_target(&hash, &[0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]));
    }
}
