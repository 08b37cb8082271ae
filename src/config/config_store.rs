use super::decision_config::DecisionConfig;
use crate::{info, warn};
use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};
use tokio::sync::RwLock;

/// Errors raised while reading configuration or metadata files.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            ConfigError::Parse(path, e) => write!(f, "cannot parse {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
        }
    }
}

/// Reads and deserializes a JSON file.
pub(crate) fn read_json<T>(path: &Path) -> Result<T, ConfigError>
where for<'de> T: serde::Deserialize<'de> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Hot-swappable configuration snapshot shared between the configuration
/// channel and the engines.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<DecisionConfig>,
    custom_action_path: PathBuf,
}

impl ConfigStore {
    /// Environment variable overriding the configuration file location.
    pub const CONFIG_PATH_VAR: &'static str = "APM_CONFIG_PATH";
    /// Environment variable overriding the custom action metadata location.
    pub const CUSTOM_ACTION_PATH_VAR: &'static str = "APM_CUSTOM_ACTION_PATH";
    const DEF_CONFIG_PATH: &'static str = "data/config/autopilot_manager.json";
    const DEF_CUSTOM_ACTION_PATH: &'static str = "data/custom_action/custom_action.json";

    pub fn new(config: DecisionConfig, custom_action_path: PathBuf) -> Self {
        Self { current: RwLock::new(config), custom_action_path }
    }

    /// Loads the initial configuration from `path`. A missing or malformed
    /// file is reported and replaced by the default (disabled) configuration.
    ///
    /// # Arguments
    /// * `path` - Location of the decision configuration file.
    /// * `custom_action_path` - Location of the custom action metadata, read
    ///   again on every id-only request.
    pub fn provision(path: &Path, custom_action_path: PathBuf) -> Self {
        let config = match read_json::<DecisionConfig>(path) {
            Ok(cfg) => {
                info!(
                    "Initial provisioning from {} finished: enabled {}, mode {}.",
                    path.display(),
                    cfg.enabled,
                    cfg.mode
                );
                cfg
            }
            Err(e) => {
                warn!("Failed to init config ({e}). Falling back to defaults.");
                DecisionConfig::default()
            }
        };
        Self::new(config, custom_action_path)
    }

    /// Same as [`ConfigStore::provision`] with both paths taken from the
    /// environment or the compiled-in defaults.
    pub fn provision_from_env() -> Self {
        let cfg_var = std::env::var(Self::CONFIG_PATH_VAR);
        let cfg_path = cfg_var.as_ref().map_or(Self::DEF_CONFIG_PATH, |v| v.as_str());
        let ca_var = std::env::var(Self::CUSTOM_ACTION_PATH_VAR);
        let ca_path = ca_var.as_ref().map_or(Self::DEF_CUSTOM_ACTION_PATH, |v| v.as_str());
        Self::provision(Path::new(cfg_path), PathBuf::from(ca_path))
    }

    pub async fn snapshot(&self) -> DecisionConfig { *self.current.read().await }

    /// Swaps in a new configuration. Takes effect on the next decision tick.
    pub async fn replace(&self, config: DecisionConfig) {
        *self.current.write().await = config;
        info!("Configuration updated: enabled {}, mode {}.", config.enabled, config.mode);
    }

    pub fn custom_action_path(&self) -> &Path { &self.custom_action_path }
}
