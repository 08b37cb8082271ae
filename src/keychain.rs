use crate::config::ConfigStore;
use crate::perception::{LandingMonitor, ObstacleMonitor};
use crate::vehicle::{TelemetryMonitor, VehicleCommander};
use std::sync::Arc;

/// Shared handles of the autopilot manager: the vehicle link, the state fed
/// by the telemetry and perception inputs and the operator configuration.
#[derive(Clone)]
pub struct Keychain {
    /// Command sink towards the autopilot.
    commander: Arc<dyn VehicleCommander>,
    /// Latest vehicle state, written by the telemetry feed.
    telemetry: Arc<TelemetryMonitor>,
    /// Hot-swappable operator configuration.
    config: Arc<ConfigStore>,
    /// Debounced landing site classification.
    landing: Arc<LandingMonitor>,
    /// Latest obstacle distance.
    obstacle: Arc<ObstacleMonitor>,
}

impl Keychain {
    /// Creates a new `Keychain` around an existing vehicle link. Telemetry and
    /// perception state start out unknown.
    pub fn new(commander: Arc<dyn VehicleCommander>, config: ConfigStore) -> Self {
        Self {
            commander,
            telemetry: Arc::new(TelemetryMonitor::new()),
            config: Arc::new(config),
            landing: Arc::new(LandingMonitor::new()),
            obstacle: Arc::new(ObstacleMonitor::new()),
        }
    }

    pub fn commander(&self) -> Arc<dyn VehicleCommander> { Arc::clone(&self.commander) }

    pub fn telemetry(&self) -> Arc<TelemetryMonitor> { Arc::clone(&self.telemetry) }

    pub fn config(&self) -> Arc<ConfigStore> { Arc::clone(&self.config) }

    pub fn landing(&self) -> Arc<LandingMonitor> { Arc::clone(&self.landing) }

    pub fn obstacle(&self) -> Arc<ObstacleMonitor> { Arc::clone(&self.obstacle) }
}
