use super::{
    action::{ActionExecutionRecord, ActionResult, CustomAction},
    action_log::{AcceptedAction, ActionLog, IntakeError},
    cancel::{CancelSignal, CancelToken},
    catalog::ActionCatalog,
};
use crate::config::ConfigStore;
use crate::vehicle::VehicleCommander;
use crate::{act, error, event, info, warn};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, Notify},
    time::{Instant, interval, sleep, timeout},
};
use tokio_util::sync::CancellationToken;

type SharedRecord = Arc<Mutex<Option<ActionExecutionRecord>>>;

/// Accepts, sequences and executes custom actions, one at a time, while a
/// separate reporter streams their progress back to the autopilot.
pub struct CustomActionEngine {
    commander: Arc<dyn VehicleCommander>,
    config: Arc<ConfigStore>,
    log: Mutex<ActionLog>,
    record: SharedRecord,
    cancel: CancelSignal,
    new_action: Notify,
}

impl CustomActionEngine {
    const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
    /// Lets the last acknowledgements reach the autopilot before the record
    /// is dropped.
    const SETTLE_TIME: Duration = Duration::from_millis(500);

    /// Creates an idle engine.
    ///
    /// # Arguments
    /// * `commander` - Vehicle link used for stages, scripts and progress reports.
    /// * `config` - Source of the custom action metadata path.
    ///
    /// # Returns
    /// The engine. Nothing executes until [`CustomActionEngine::run`] is spawned.
    pub fn new(commander: Arc<dyn VehicleCommander>, config: Arc<ConfigStore>) -> Self {
        Self {
            commander,
            config,
            log: Mutex::new(ActionLog::new()),
            record: Arc::new(Mutex::new(None)),
            cancel: CancelSignal::new(),
            new_action: Notify::new(),
        }
    }

    /// Hands a fully defined action to the engine. A pending action that has
    /// not started yet is replaced.
    ///
    /// # Arguments
    /// * `action` - The custom action to execute.
    ///
    /// # Returns
    /// The acceptance order of `action` in the audit history, or the reason
    /// it was rejected.
    pub async fn submit(&self, action: CustomAction) -> Result<usize, IntakeError> {
        let id = action.id;
        let order = self.log.lock().await.offer(action, Instant::now()).inspect_err(|e| {
            event!("Rejected custom action: {e}.");
        })?;
        act!("New action received with ID {id}.");
        self.new_action.notify_one();
        Ok(order)
    }

    /// Resolves an id-only request through the custom action metadata file
    /// and submits the result.
    pub async fn submit_request(&self, id: u32) -> Result<usize, IntakeError> {
        let catalog = ActionCatalog::from_file(self.config.custom_action_path())?;
        let action = catalog.resolve(id).ok_or(IntakeError::UnknownAction(id))?;
        self.submit(action).await
    }

    /// Forwards the autopilot's cancellation flag. Ignored unless an action
    /// is still executing.
    pub async fn cancel_signal(&self, cancel: bool) {
        let record_lock = self.record.lock().await;
        if cancel && record_lock.as_ref().is_none_or(ActionExecutionRecord::is_consumed) {
            warn!("Cancellation received while no custom action is active. Ignoring.");
            return;
        }
        self.cancel.set(cancel);
    }

    pub async fn current_status(&self) -> Option<ActionExecutionRecord> {
        self.record.lock().await.clone()
    }

    /// Accepted actions that have not finished yet, in acceptance order.
    pub async fn history(&self) -> Vec<AcceptedAction> { self.log.lock().await.history().to_vec() }

    /// Worker loop. Executes pending actions one after another until
    /// `shutdown` fires.
    ///
    /// # Arguments
    /// * `shutdown` - Stops the loop. An executing action is finished first.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        info!("Waiting for custom actions to process...");
        loop {
            let next = self.log.lock().await.take_pending();
            if let Some((order, action)) = next {
                self.process(order, action).await;
                continue;
            }
            tokio::select! {
                () = self.new_action.notified() => {}
                () = shutdown.cancelled() => break,
            }
        }
        info!("Custom action engine stopped.");
    }

    async fn process(&self, order: usize, action: CustomAction) {
        let id = action.id;
        act!("Custom action #{id} being processed.");
        *self.record.lock().await = Some(ActionExecutionRecord::new(action.clone()));

        let token = self.cancel.token();
        let reporter = tokio::spawn(Self::report_progress(
            Arc::clone(&self.commander),
            Arc::clone(&self.record),
            token.clone(),
        ));

        let canceled = if action.stages.is_empty() {
            self.execute_script(&action, &token).await
        } else {
            self.execute_stages(&action, &token).await
        };
        if canceled {
            self.set_result(ActionResult::Canceled).await;
        }

        // not cancellable
        sleep(Self::SETTLE_TIME).await;

        {
            let mut record_lock = self.record.lock().await;
            if let Some(rec) = record_lock.as_mut() {
                if token.is_cancelled() {
                    act!("Custom action #{id} canceled!");
                    self.cancel.reset();
                } else if rec.progress >= 100.0 {
                    act!("Custom action #{id} executed!");
                } else {
                    act!("Custom action #{id} ended with {}.", rec.result);
                }
                rec.consume();
            }
        }
        if let Err(e) = reporter.await {
            error!("Progress reporter of custom action #{id} failed: {e}");
        }
        *self.record.lock().await = None;
        if self.cancel.is_set() {
            warn!("Dropping cancellation received after custom action #{id} finished.");
            self.cancel.reset();
        }
        self.log.lock().await.retire(order);
    }

    /// Returns `true` if the action was canceled before finishing.
    async fn execute_stages(&self, action: &CustomAction, token: &CancelToken) -> bool {
        let n_stages = action.stages.len();
        for (i, stage) in action.stages.iter().enumerate() {
            if token.is_cancelled() {
                return true;
            }
            match self.commander.execute_custom_stage(stage).await {
                Ok(res) => event!("Stage {i} of custom action #{} returned {res}.", action.id),
                Err(e) => warn!("Stage {i} of custom action #{} not executed: {e}.", action.id),
            }
            if token.wait(stage.duration()).await {
                return true;
            }
            #[allow(clippy::cast_precision_loss)]
            let progress = (i + 1) as f32 / n_stages as f32 * 100.0;
            let result = if i + 1 == n_stages { ActionResult::Success } else { ActionResult::InProgress };
            self.set_progress(progress, result).await;
            if result == ActionResult::InProgress {
                act!("Custom action #{} current progress: {progress:.1}%.", action.id);
            }
        }
        false
    }

    /// Returns `true` if the action was canceled before finishing.
    async fn execute_script(&self, action: &CustomAction, token: &CancelToken) -> bool {
        let Some(script) = action.global_script.as_deref() else {
            warn!("Custom action #{} has neither stages nor a script.", action.id);
            self.set_result(ActionResult::Failed).await;
            return false;
        };
        if token.is_cancelled() {
            return true;
        }

        let limit = action.global_timeout();
        let script_wait = async {
            let script_fut = self.commander.execute_custom_script(script);
            match limit {
                Some(t) => timeout(t, script_fut).await.unwrap_or_else(|_| {
                    warn!("Script of custom action #{} timed out after {t:?}.", action.id);
                    Ok(ActionResult::Failed)
                }),
                None => script_fut.await,
            }
        };
        let result = tokio::select! {
            res = script_wait => res.unwrap_or_else(|e| {
                warn!("Script of custom action #{} not executed: {e}.", action.id);
                ActionResult::Failed
            }),
            () = token.cancelled() => return true,
        };

        if result == ActionResult::Success {
            self.set_progress(100.0, result).await;
        } else {
            self.set_result(result).await;
        }
        false
    }

    async fn set_progress(&self, progress: f32, result: ActionResult) {
        if let Some(rec) = self.record.lock().await.as_mut() {
            rec.progress = progress;
            rec.result = result;
        }
    }

    async fn set_result(&self, result: ActionResult) {
        if let Some(rec) = self.record.lock().await.as_mut() {
            rec.result = result;
        }
    }

    async fn report_progress(
        commander: Arc<dyn VehicleCommander>,
        record: SharedRecord,
        token: CancelToken,
    ) {
        let mut report_interval = interval(Self::PROGRESS_INTERVAL);
        loop {
            tokio::select! {
                _ = report_interval.tick() => {}
                () = token.cancelled() => break,
            }
            let snapshot = record
                .lock()
                .await
                .as_ref()
                .filter(|r| !r.is_consumed())
                .map(|r| (r.id(), r.progress, r.result));
            let Some((id, progress, result)) = snapshot else { break };
            if let Err(e) = commander.respond_custom_action_progress(id, progress, result).await {
                warn!("Progress report for custom action #{id} failed: {e}.");
            }
        }
    }
}
