use serde::Deserialize;
use std::time::Duration;
use strum_macros::Display;

/// Outcome of a custom action (or of one of its stages) as reported back to
/// the autopilot.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Unknown,
    Success,
    InProgress,
    Failed,
    Canceled,
}

/// Frame encoding of the vehicle command a stage sends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageCommandKind {
    #[default]
    Long,
    Int,
}

/// Raw vehicle command carried by a stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StageCommand {
    #[serde(default)]
    pub kind: StageCommandKind,
    pub command: u16,
    #[serde(default)]
    pub target_system: u8,
    #[serde(default)]
    pub target_component: u8,
    #[serde(default)]
    pub params: [f32; 7],
}

impl StageCommand {
    pub fn new(command: u16) -> Self {
        Self {
            kind: StageCommandKind::Long,
            command,
            target_system: 0,
            target_component: 0,
            params: [0.0; 7],
        }
    }
}

/// One step of a staged custom action: a command followed by a wait.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionStage {
    pub command: StageCommand,
    /// Time to wait after dispatching the command, in seconds.
    #[serde(default)]
    pub duration_s: f64,
}

impl ActionStage {
    pub fn new(command: StageCommand, duration: Duration) -> Self {
        Self { command, duration_s: duration.as_secs_f64() }
    }

    /// Wait after the stage. Negative or non-finite values mean no wait.
    pub fn duration(&self) -> Duration {
        if self.duration_s.is_finite() && self.duration_s > 0.0 {
            Duration::from_secs_f64(self.duration_s)
        } else {
            Duration::ZERO
        }
    }
}

/// An operator defined procedure, either a sequence of stages or a single
/// global script. Stages take precedence when both are given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomAction {
    pub id: u32,
    #[serde(default)]
    pub stages: Vec<ActionStage>,
    #[serde(default)]
    pub global_script: Option<String>,
    #[serde(default)]
    pub global_timeout_s: Option<f64>,
}

impl CustomAction {
    pub fn staged(id: u32, stages: Vec<ActionStage>) -> Self {
        Self { id, stages, global_script: None, global_timeout_s: None }
    }

    pub fn scripted(id: u32, script: &str, timeout: Option<Duration>) -> Self {
        Self {
            id,
            stages: Vec::new(),
            global_script: Some(script.to_string()),
            global_timeout_s: timeout.map(|t| t.as_secs_f64()),
        }
    }

    /// Upper bound for the global script, `None` waits without bound.
    pub fn global_timeout(&self) -> Option<Duration> {
        self.global_timeout_s
            .filter(|t| t.is_finite() && *t >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Execution state of the currently active custom action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionExecutionRecord {
    pub action: CustomAction,
    /// Percentage in `[0, 100]`.
    pub progress: f32,
    pub result: ActionResult,
    consumed: bool,
}

impl ActionExecutionRecord {
    pub fn new(action: CustomAction) -> Self {
        Self { action, progress: 0.0, result: ActionResult::InProgress, consumed: false }
    }

    pub fn id(&self) -> u32 { self.action.id }

    /// Whether the executor is done with this record and the progress
    /// reporter has to stop.
    pub fn is_consumed(&self) -> bool { self.consumed }

    pub(super) fn consume(&mut self) { self.consumed = true; }
}
