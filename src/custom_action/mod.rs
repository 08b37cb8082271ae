//! Execution of operator defined custom actions requested by the autopilot.

mod action;
mod action_log;
mod cancel;
mod catalog;
mod engine;

pub use action::{
    ActionExecutionRecord, ActionResult, ActionStage, CustomAction, StageCommand,
    StageCommandKind,
};
pub use action_log::{AcceptedAction, ActionLog, IntakeError};
pub use cancel::{CancelSignal, CancelToken};
pub use catalog::ActionCatalog;
pub use engine::CustomActionEngine;
