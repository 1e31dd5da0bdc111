// src/network/mod.rs
//! Network communication components
//!
//! The miner only needs two things from the outside world: a fresh template
//! to search and somewhere to hand solved headers. [`TemplateSource`] is that
//! seam; [`SiadClient`] implements it against a Sia daemon's HTTP API.

/// Sia daemon client implementation
///
/// Fetches headers from `/miner/header` and submits solved ones back.
pub mod siad;

pub use siad::SiadClient;

use crate::miner::work::{MIN_HEADER_LEN, Solution, TARGET_LEN, Template};
use crate::utils::error::MinerError;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Source of mining templates and sink for solutions
pub trait TemplateSource: Send + Sync {
    /// Fetches the next template to work on
    fn fetch(&self) -> Result<Template, MinerError>;

    /// Hands a solved header back to the source
    fn submit(&self, solution: &Solution) -> Result<(), MinerError>;
}

impl<T: TemplateSource + ?Sized> TemplateSource for Arc<T> {
    fn fetch(&self) -> Result<Template, MinerError> {
        (**self).fetch()
    }

    fn submit(&self, solution: &Solution) -> Result<(), MinerError> {
        (**self).submit(solution)
    }
}

/// Serves the same template forever and only logs submissions
///
/// Backs the `benchmark` command, where no daemon is involved.
#[derive(Debug, Clone)]
pub struct FixedTemplate {
    template: Template,
}

impl FixedTemplate {
    /// Wraps `template`
    pub fn new(template: Template) -> Self {
        FixedTemplate { template }
    }

    /// Builds a template from optional hex overrides
    ///
    /// Without overrides the header is 80 zero bytes and the target is zero.
    /// A header shorter than [`MIN_HEADER_LEN`] or a target that is not
    /// exactly [`TARGET_LEN`] bytes is a `ConfigError`.
    pub fn from_hex(header: Option<&str>, target: Option<&str>) -> Result<Self, MinerError> {
        let header = match header {
            Some(hex) => hex::decode(hex)?,
            None => vec![0u8; 80],
        };
        if header.len() < MIN_HEADER_LEN {
            return Err(MinerError::ConfigError(format!(
                "header must be at least {} bytes, got {}",
                MIN_HEADER_LEN,
                header.len()
            )));
        }

        let mut natural = [0u8; TARGET_LEN];
        if let Some(hex) = target {
            let bytes = hex::decode(hex)?;
            if bytes.len() != TARGET_LEN {
                return Err(MinerError::ConfigError(format!(
                    "target must be {} bytes, got {}",
                    TARGET_LEN,
                    bytes.len()
                )));
            }
            natural.copy_from_slice(&bytes);
        }

        Ok(FixedTemplate::new(Template {
            target: natural,
            header,
        }))
    }
}

impl TemplateSource for FixedTemplate {
    fn fetch(&self) -> Result<Template, MinerError> {
        Ok(self.template.clone())
    }

    fn submit(&self, solution: &Solution) -> Result<(), MinerError> {
        log::info!("Benchmark solution: {}", hex::encode(&solution.header));
        Ok(())
    }
}

/// Spawns a thread that submits every solution received on `receiver`
///
/// Submission failures are logged and dropped; the thread ends when all
/// solution senders are gone.
pub fn spawn_submitter<S>(
    source: S,
    receiver: Receiver<Solution>,
) -> Result<JoinHandle<()>, MinerError>
where
    S: TemplateSource + 'static,
{
    Ok(thread::Builder::new()
        .name("solution-submitter".into())
        .spawn(move || {
            for solution in receiver {
                match source.submit(&solution) {
                    Ok(()) => log::info!("Submitted solved header"),
                    Err(e) => log::error!("Failed to submit solved header: {}", e),
                }
            }
        })?)
}
