use super::commander::{CommandError, StatusSeverity, VehicleCommander};
use crate::custom_action::{ActionResult, ActionStage};
use async_trait::async_trait;
use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Every command the mock received, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum VehicleCommand {
    Hold,
    ReturnToLaunch,
    Goto { lat_deg: f64, lon_deg: f64, alt_amsl_m: f64 },
    Land,
    Stage(u16),
    Script(String),
    Progress { id: u32, progress: f32, result: ActionResult },
    Status(StatusSeverity, String),
}

impl VehicleCommand {
    /// Whether this is one of the protective flight commands.
    pub(crate) fn is_flight_command(&self) -> bool {
        matches!(self, Self::Hold | Self::ReturnToLaunch | Self::Goto { .. } | Self::Land)
    }
}

/// Recording command sink used by the engine tests.
pub(crate) struct MockVehicle {
    commands: Mutex<Vec<VehicleCommand>>,
    fail_flight_commands: AtomicBool,
    script_delay: Duration,
    script_result: ActionResult,
}

impl MockVehicle {
    pub(crate) fn new() -> Self { Self::with_script(Duration::from_secs(1), ActionResult::Success) }

    pub(crate) fn with_script(script_delay: Duration, script_result: ActionResult) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_flight_commands: AtomicBool::new(false),
            script_delay,
            script_result,
        }
    }

    pub(crate) fn set_failing(&self, fail: bool) { self.fail_flight_commands.store(fail, Ordering::SeqCst); }

    pub(crate) fn commands(&self) -> Vec<VehicleCommand> { self.commands.lock().unwrap().clone() }

    pub(crate) fn flight_commands(&self) -> Vec<VehicleCommand> {
        self.commands().into_iter().filter(VehicleCommand::is_flight_command).collect()
    }

    pub(crate) fn stages(&self) -> Vec<u16> {
        self.commands()
            .into_iter()
            .filter_map(|c| if let VehicleCommand::Stage(cmd) = c { Some(cmd) } else { None })
            .collect()
    }

    pub(crate) fn progress_reports(&self) -> Vec<(u32, f32, ActionResult)> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                VehicleCommand::Progress { id, progress, result } => Some((id, progress, result)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn status_texts(&self) -> Vec<(StatusSeverity, String)> {
        self.commands()
            .into_iter()
            .filter_map(|c| if let VehicleCommand::Status(s, t) = c { Some((s, t)) } else { None })
            .collect()
    }

    pub(crate) fn clear(&self) { self.commands.lock().unwrap().clear(); }

    fn record(&self, cmd: VehicleCommand) { self.commands.lock().unwrap().push(cmd); }

    fn flight_result(&self) -> Result<(), CommandError> {
        if self.fail_flight_commands.load(Ordering::SeqCst) {
            Err(CommandError::NoConnection)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VehicleCommander for MockVehicle {
    async fn hold(&self) -> Result<(), CommandError> {
        self.record(VehicleCommand::Hold);
        self.flight_result()
    }

    async fn return_to_launch(&self) -> Result<(), CommandError> {
        self.record(VehicleCommand::ReturnToLaunch);
        self.flight_result()
    }

    async fn goto(
        &self,
        lat_deg: f64,
        lon_deg: f64,
        alt_amsl_m: f64,
        _heading_deg: f64,
    ) -> Result<(), CommandError> {
        self.record(VehicleCommand::Goto { lat_deg, lon_deg, alt_amsl_m });
        self.flight_result()
    }

    async fn land(&self) -> Result<(), CommandError> {
        self.record(VehicleCommand::Land);
        self.flight_result()
    }

    async fn execute_custom_stage(&self, stage: &ActionStage) -> Result<ActionResult, CommandError> {
        self.record(VehicleCommand::Stage(stage.command.command));
        Ok(ActionResult::Success)
    }

    async fn execute_custom_script(&self, script: &str) -> Result<ActionResult, CommandError> {
        self.record(VehicleCommand::Script(script.to_string()));
        tokio::time::sleep(self.script_delay).await;
        Ok(self.script_result)
    }

    async fn respond_custom_action_progress(
        &self,
        id: u32,
        progress: f32,
        result: ActionResult,
    ) -> Result<(), CommandError> {
        self.record(VehicleCommand::Progress { id, progress, result });
        Ok(())
    }

    async fn send_status_text(&self, severity: StatusSeverity, text: &str) -> Result<(), CommandError> {
        self.record(VehicleCommand::Status(severity, text.to_string()));
        Ok(())
    }
}
