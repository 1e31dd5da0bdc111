//! Hash rate aggregation and reporting
//!
//! Workers push a [`RateSample`](crate::miner::work::RateSample) after every
//! dispatch; [`RateAggregator`] keeps the latest one per worker and renders
//! the combined status line.

/// Submodule containing the rate aggregator and line renderer
pub mod aggregator;

// Re-export main components
pub use aggregator::{RateAggregator, render};
