pub mod types;

use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".kube-requests.toml";

/// Get the global config file path (~/.kube-requests.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.kube-requests.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults.
///
/// An explicit path must exist and parse. Otherwise the local config in
/// `project_path` is tried first, then the global one.
pub fn load_config(
    explicit: Option<&Path>,
    project_path: Option<&Path>,
) -> Result<types::Config, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let local = project_path.map(local_config_path);
    for candidate in local.into_iter().chain(global_config_path()) {
        if candidate.is_file() {
            log::debug!("Loading config from {}", candidate.display());
            return read_config(&candidate);
        }
    }

    Ok(types::Config::default())
}

fn read_config(path: &Path) -> Result<types::Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: types::Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    config.output.memory_scale()?;
    Ok(config)
}
