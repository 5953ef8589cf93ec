//! Config file loading.

use anyhow::Context;
use std::path::Path;

use undockit::UndockitOptions;

/// Load [`UndockitOptions`] from a JSON file.
pub fn load_config(path: &Path) -> anyhow::Result<UndockitOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let options: UndockitOptions = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    Ok(options)
}
