//! Layout configuration loading.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    tree::LayoutConfig,
};

/// Default location of the layout file: `<config dir>/comment-tree/layout.json`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("comment-tree/layout.json"))
}

/// Load the layout configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when present, and built-in defaults otherwise. The result is validated.
pub fn load_layout_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => read_config(&path)?,
            None => {
                debug!("No layout file found, using defaults");
                LayoutConfig::default()
            }
        },
    };
    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<LayoutConfig> {
    let text = fs::read_to_string(path)?;
    let config = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!("Loaded layout configuration from {}", path.display());
    Ok(config)
}
