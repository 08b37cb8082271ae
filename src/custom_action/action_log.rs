use super::action::CustomAction;
use crate::config::ConfigError;
use chrono::{DateTime, Utc};
use std::{
    fmt::{Display, Formatter},
    time::Duration,
};
use tokio::time::Instant;

/// Reasons an incoming custom action request is not accepted.
#[derive(Debug)]
pub enum IntakeError {
    /// Same id as the last accepted action, received too shortly after it.
    Duplicate(u32),
    /// The id is not listed in the custom action metadata.
    UnknownAction(u32),
    Catalog(ConfigError),
}

impl Display for IntakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::Duplicate(id) => write!(f, "custom action #{id} repeated too early"),
            IntakeError::UnknownAction(id) => write!(f, "no metadata for custom action #{id}"),
            IntakeError::Catalog(e) => write!(f, "custom action metadata unavailable: {e}"),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntakeError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for IntakeError {
    fn from(e: ConfigError) -> Self { IntakeError::Catalog(e) }
}

/// Entry of the audit history.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedAction {
    pub order: usize,
    pub action: CustomAction,
    pub accepted_at: DateTime<Utc>,
}

/// Intake side of the custom action engine: audit history, duplicate
/// suppression and the single pending slot.
///
/// The history only covers actions that have not finished yet. Once the
/// engine is done with an action, [`ActionLog::retire`] drops it together
/// with everything accepted before it.
#[derive(Debug, Default)]
pub struct ActionLog {
    history: Vec<AcceptedAction>,
    pending: Option<(usize, CustomAction)>,
    next_order: usize,
    last_accepted: Option<(u32, Instant)>,
}

impl ActionLog {
    /// Minimum spacing between two acceptances of the same id. The autopilot
    /// resends a command it did not see acknowledged.
    pub const MIN_REPEAT_SPACING: Duration = Duration::from_millis(1500);

    pub fn new() -> Self { Self::default() }

    /// Accepts `action` into the history and the pending slot, replacing a
    /// pending action that has not started yet.
    ///
    /// # Arguments
    /// * `action` - The fully defined custom action.
    /// * `now` - Arrival time, used for duplicate suppression.
    ///
    /// # Returns
    /// The acceptance order of `action`, or [`IntakeError::Duplicate`] if the
    /// same id was accepted less than [`ActionLog::MIN_REPEAT_SPACING`] ago.
    pub fn offer(&mut self, action: CustomAction, now: Instant) -> Result<usize, IntakeError> {
        if let Some((last_id, last_t)) = self.last_accepted {
            if last_id == action.id && now.duration_since(last_t) < Self::MIN_REPEAT_SPACING {
                return Err(IntakeError::Duplicate(action.id));
            }
        }
        let order = self.next_order;
        self.next_order += 1;
        self.last_accepted = Some((action.id, now));
        self.history.push(AcceptedAction { order, action: action.clone(), accepted_at: Utc::now() });
        if let Some((_, superseded)) = self.pending.replace((order, action)) {
            crate::act!("Pending custom action #{} superseded before it started.", superseded.id);
        }
        Ok(order)
    }

    /// Empties the pending slot, yielding the action with its acceptance order.
    pub fn take_pending(&mut self) -> Option<(usize, CustomAction)> { self.pending.take() }

    /// Drops every history entry up to and including `order`. Duplicate
    /// suppression is unaffected.
    pub fn retire(&mut self, order: usize) { self.history.retain(|a| a.order > order); }

    pub fn history(&self) -> &[AcceptedAction] { &self.history }
}
