use crate::custom_action::{ActionResult, ActionStage};
use async_trait::async_trait;
use strum_macros::Display;

/// Severity attached to operator-visible status messages.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum StatusSeverity {
    Info,
    Warning,
    Critical,
}

/// Reasons a command could not be delivered or was refused by the autopilot.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The autopilot answered with a negative acknowledgement.
    Rejected,
    /// No acknowledgement arrived in time.
    Timeout,
    /// The vehicle link is down.
    NoConnection,
    /// The autopilot does not implement the requested command.
    Unsupported,
    Unknown,
}

impl std::error::Error for CommandError {}

/// The vehicle command interface shared by the decision engine and the
/// custom action engine.
///
/// Implementations wrap the actual autopilot link. Every call is expected to
/// return once the command was acknowledged (or refused); none of them may
/// block the caller for longer than the link's own acknowledgement timeout,
/// except [`VehicleCommander::execute_custom_script`] which resolves with the
/// script's outcome.
#[async_trait]
pub trait VehicleCommander: Send + Sync {
    async fn hold(&self) -> Result<(), CommandError>;

    async fn return_to_launch(&self) -> Result<(), CommandError>;

    /// Repositions to a global waypoint. `heading_deg` may be NaN to keep the
    /// current heading.
    async fn goto(
        &self,
        lat_deg: f64,
        lon_deg: f64,
        alt_amsl_m: f64,
        heading_deg: f64,
    ) -> Result<(), CommandError>;

    async fn land(&self) -> Result<(), CommandError>;

    async fn execute_custom_stage(&self, stage: &ActionStage) -> Result<ActionResult, CommandError>;

    async fn execute_custom_script(&self, script: &str) -> Result<ActionResult, CommandError>;

    async fn respond_custom_action_progress(
        &self,
        id: u32,
        progress: f32,
        result: ActionResult,
    ) -> Result<(), CommandError>;

    async fn send_status_text(
        &self,
        severity: StatusSeverity,
        text: &str,
    ) -> Result<(), CommandError>;
}
