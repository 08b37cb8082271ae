use crate::config::ConfigStore;
use crate::custom_action::CustomActionEngine;
use crate::decision::DecisionEngine;
use crate::keychain::Keychain;
use crate::vehicle::{CommandError, VehicleCommander};
use crate::{error, info};
use futures::future::join_all;
use std::{
    fmt::{Display, Formatter},
    future::Future,
    sync::Arc,
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fatal errors while bringing up the autopilot manager.
#[derive(Debug)]
pub enum StartupError {
    /// No autopilot showed up within the given time.
    DiscoveryTimeout(Duration),
    /// The vehicle link reported an error during discovery.
    Link(CommandError),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::DiscoveryTimeout(t) => write!(f, "no autopilot discovered within {t:?}"),
            StartupError::Link(e) => write!(f, "vehicle link failed during discovery: {e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Link(e) => Some(e),
            StartupError::DiscoveryTimeout(_) => None,
        }
    }
}

impl From<CommandError> for StartupError {
    fn from(e: CommandError) -> Self { StartupError::Link(e) }
}

/// Running autopilot manager: the decision loop and the custom action
/// engine, sharing one vehicle link.
pub struct AutopilotManager {
    keychain: Keychain,
    actions: Arc<CustomActionEngine>,
    shutdown: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl AutopilotManager {
    pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

    /// Waits for `discovery` to yield a vehicle link and spawns both engines
    /// on the current runtime.
    ///
    /// # Arguments
    /// * `discovery` - Future resolving to the link of the first autopilot found.
    /// * `discovery_timeout` - Upper bound for `discovery`.
    /// * `config` - Initial operator configuration.
    ///
    /// # Returns
    /// The running manager, or a [`StartupError`] if no autopilot was found.
    pub async fn start<F>(
        discovery: F,
        discovery_timeout: Duration,
        config: ConfigStore,
    ) -> Result<Self, StartupError>
    where
        F: Future<Output = Result<Arc<dyn VehicleCommander>, CommandError>>,
    {
        let commander = tokio::time::timeout(discovery_timeout, discovery)
            .await
            .map_err(|_| StartupError::DiscoveryTimeout(discovery_timeout))??;
        info!("Autopilot discovered.");

        let keychain = Keychain::new(commander, config);
        let actions = Arc::new(CustomActionEngine::new(keychain.commander(), keychain.config()));
        let shutdown = CancellationToken::new();
        let workers = vec![
            tokio::spawn(DecisionEngine::new(&keychain).run(shutdown.clone())),
            tokio::spawn(Arc::clone(&actions).run(shutdown.clone())),
        ];
        Ok(Self { keychain, actions, shutdown, workers })
    }

    /// Same as [`AutopilotManager::start`] with configuration paths from the
    /// environment and the default discovery timeout.
    pub async fn start_from_env<F>(discovery: F) -> Result<Self, StartupError>
    where F: Future<Output = Result<Arc<dyn VehicleCommander>, CommandError>> {
        Self::start(discovery, Self::DISCOVERY_TIMEOUT, ConfigStore::provision_from_env()).await
    }

    /// Handles for the telemetry, perception and configuration feeds.
    pub fn keychain(&self) -> &Keychain { &self.keychain }

    /// Intake of custom action requests and cancellation signals.
    pub fn actions(&self) -> Arc<CustomActionEngine> { Arc::clone(&self.actions) }

    /// Stops both engines and waits for them. An executing custom action is
    /// finished first.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for res in join_all(self.workers).await {
            if let Err(e) = res {
                error!("Worker terminated abnormally: {e}");
            }
        }
        info!("Autopilot manager stopped.");
    }
}
