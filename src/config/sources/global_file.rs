//! Global config file source: `<user config dir>/restview/config.toml`.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use directories::ProjectDirs;
use tracing::debug;

/// Path to the global config file, resolved through the platform's config
/// directory (`$XDG_CONFIG_HOME` on Linux).
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "restview").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) if path.exists() => {
            Ok(builder.add_source(File::from(path.as_path()).required(false)))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global configuration file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}
