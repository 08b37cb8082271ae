mod config_store;
mod decision_config;

pub(crate) use config_store::read_json;
pub use config_store::{ConfigError, ConfigStore};
pub use decision_config::{
    CollisionAvoidanceConfig, DecisionConfig, DecisionMode, OffsetConfig, ProtectiveAction,
    SafeLandingConfig, WaypointConfig,
};
