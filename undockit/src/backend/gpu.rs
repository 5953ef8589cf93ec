//! Accelerator detection.
//!
//! NVIDIA GPUs are exposed through the Container Device Interface: when the
//! NVIDIA Container Toolkit has generated a CDI spec, the engine can attach
//! every GPU with `--device nvidia.com/gpu=all`.

use std::path::{Path, PathBuf};

/// Locations where the NVIDIA Container Toolkit writes its CDI spec.
pub const NVIDIA_CDI_SPECS: &[&str] = &["/etc/cdi/nvidia.yaml", "/var/run/cdi/nvidia.yaml"];

/// CDI device name covering all NVIDIA GPUs.
pub const NVIDIA_CDI_DEVICE: &str = "nvidia.com/gpu=all";

/// Default CDI spec search paths.
pub fn default_cdi_specs() -> Vec<PathBuf> {
    NVIDIA_CDI_SPECS.iter().map(PathBuf::from).collect()
}

/// Engine flags attaching GPUs, empty when no CDI spec is present.
pub fn gpu_flags<P: AsRef<Path>>(cdi_specs: &[P]) -> Vec<String> {
    if cdi_specs.iter().any(|p| p.as_ref().exists()) {
        tracing::debug!("NVIDIA CDI spec found, attaching GPUs");
        vec!["--device".to_string(), NVIDIA_CDI_DEVICE.to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_cdi_spec_no_flags() {
        assert!(gpu_flags(&["/nonexistent/cdi/nvidia.yaml"]).is_empty());
    }

    #[test]
    fn test_cdi_spec_present() {
        let dir = TempDir::new().unwrap();
        let spec = dir.path().join("nvidia.yaml");
        std::fs::write(&spec, "cdiVersion: 0.5.0\n").unwrap();

        let flags = gpu_flags(&[PathBuf::from("/nonexistent/nvidia.yaml"), spec]);
        assert_eq!(flags, vec!["--device", "nvidia.com/gpu=all"]);
    }
}
