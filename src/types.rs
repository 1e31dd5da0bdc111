// src/types.rs
use std::fmt;

/// Which class of compute devices may be enlisted for mining
///
/// GPUs are always eligible. Everything else (CPUs, accelerators)
/// only joins when the user opts in with `--cpu`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceTypeFilter {
    /// Only GPU devices
    Gpu,

    /// Every device type a platform reports
    All,
}

impl DeviceTypeFilter {
    /// Returns whether a device of the given kind passes this filter
    pub fn accepts(self, kind: DeviceKind) -> bool {
        match self {
            DeviceTypeFilter::Gpu => kind == DeviceKind::Gpu,
            DeviceTypeFilter::All => true,
        }
    }
}

impl fmt::Display for DeviceTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTypeFilter::Gpu => write!(f, "gpu"),
            DeviceTypeFilter::All => write!(f, "all"),
        }
    }
}

/// Kind of a compute device as reported by its platform
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Graphics processor
    Gpu,
    /// Host processor
    Cpu,
    /// Anything else (FPGAs, dedicated accelerators)
    Accelerator,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Gpu => write!(f, "GPU"),
            DeviceKind::Cpu => write!(f, "CPU"),
            DeviceKind::Accelerator => write!(f, "ACCELERATOR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_filter_rejects_non_gpu_kinds() {
        assert!(DeviceTypeFilter::Gpu.accepts(DeviceKind::Gpu));
        assert!(!DeviceTypeFilter::Gpu.accepts(DeviceKind::Cpu));
        assert!(!DeviceTypeFilter::Gpu.accepts(DeviceKind::Accelerator));
        assert!(DeviceTypeFilter::All.accepts(DeviceKind::Cpu));
    }

    #[test]
    fn filters_and_kinds_display_lowercase_and_uppercase() {
        assert_eq!(DeviceTypeFilter::Gpu.to_string(), "gpu");
        assert_eq!(DeviceTypeFilter::All.to_string(), "all");
        assert_eq!(DeviceKind::Cpu.to_string(), "CPU");
    }
}
