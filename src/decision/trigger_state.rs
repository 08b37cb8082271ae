use chrono::{DateTime, TimeDelta, Utc};

/// Cooldown bookkeeping of the decision engine. While triggered, no further
/// protective action may be issued.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionTriggerState {
    triggered: bool,
    last_trigger: Option<DateTime<Utc>>,
}

impl ActionTriggerState {
    pub const COOLDOWN: TimeDelta = TimeDelta::seconds(5);

    pub fn new() -> Self { Self::default() }

    pub fn is_triggered(&self) -> bool { self.triggered }

    pub fn last_trigger(&self) -> Option<DateTime<Utc>> { self.last_trigger }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.triggered = true;
        self.last_trigger = Some(now);
    }

    /// Re-arms once the cooldown has elapsed. Returns `true` if this call
    /// cleared the trigger.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self.last_trigger {
            Some(t) if self.triggered && now - t >= Self::COOLDOWN => {
                self.triggered = false;
                true
            }
            _ => false,
        }
    }
}
