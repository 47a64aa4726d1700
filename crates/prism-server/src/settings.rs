//! Layered configuration loading

use std::path::PathBuf;

use config::{Config, Environment, File};
use prism_core::PrismConfig;

/// Explicit config path override
const CONFIG_PATH_VAR: &str = "PRISM_CONFIG";

/// Resolve the config file: `$PRISM_CONFIG`, else `./prism.toml`, else the per-user file.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return PathBuf::from(path);
    }
    let local = PathBuf::from("prism.toml");
    if local.exists() {
        local
    } else {
        PrismConfig::default_path()
    }
}

/// Load the config file (optional) overlaid with `PRISM__SECTION__KEY` variables.
pub fn load() -> anyhow::Result<PrismConfig> {
    let path = config_path();
    let settings = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("PRISM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(settings.try_deserialize()?)
}
