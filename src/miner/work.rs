// src/miner/work.rs
//! Values passed between the generator, the workers and the aggregator

/// Byte offset of the target field inside a header
pub const TARGET_OFFSET: usize = 32;

/// Width of the embedded target in bytes
pub const TARGET_LEN: usize = 8;

/// Smallest header the pipeline accepts
pub const MIN_HEADER_LEN: usize = 44;

/// One dispatch worth of work: a prepared header plus where to start searching
///
/// The header is shared by all units cut from the same template; the
/// `start_offset` values of those units are disjoint multiples of the item size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    /// Header with the target embedded (byte-reversed) at bytes 32..40
    pub header: Vec<u8>,
    /// First nonce of this unit's range
    pub start_offset: u64,
}

/// Latest throughput measurement from one worker, in MH/s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Dense index assigned at enumeration time
    pub worker_id: usize,
    /// Millions of hashes per second
    pub hash_rate: f64,
}

/// A header that satisfied its embedded target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Header bytes with the winning nonce in place
    pub header: Vec<u8>,
}

/// A freshly fetched piece of external work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Target in its natural (big-endian) byte order
    pub target: [u8; TARGET_LEN],
    /// Raw header as delivered by the source
    pub header: Vec<u8>,
}

/// Writes `target` into the header's target field in reversed byte order
///
/// `header[32 + i] = target[7 - i]` for `i in 0..8`.
///
/// # Panics
/// If the header is shorter than `TARGET_OFFSET + TARGET_LEN`; callers
/// validate templates against [`MIN_HEADER_LEN`] first.
pub fn embed_target(header: &mut [u8], target: &[u8; TARGET_LEN]) {
    for (i, byte) in target.iter().rev().enumerate() {
        header[TARGET_OFFSET + i] = *byte;
    }
}

/// Recovers the natural-order target from a prepared header
pub fn extract_target(header: &[u8]) -> [u8; TARGET_LEN] {
    let mut target = [0u8; TARGET_LEN];
    for (i, byte) in header[TARGET_OFFSET..TARGET_OFFSET + TARGET_LEN]
        .iter()
        .rev()
        .enumerate()
    {
        target[i] = *byte;
    }
    target
}

/// Cuts one prepared header into `count` units of `item_size` nonces each
///
/// Offsets are `0, item_size, 2 * item_size, ...`.
pub fn partition(header: &[u8], item_size: u64, count: usize) -> Vec<WorkUnit> {
    (0..count as u64)
        .map(|i| WorkUnit {
            header: header.to_vec(),
            start_offset: i * item_size,
        })
        .collect()
}
