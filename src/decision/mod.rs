//! The periodic decision loop running the safe landing and collision
//! avoidance policies.

mod decision_engine;
#[cfg(test)]
mod tests;
mod trigger_state;

pub use decision_engine::DecisionEngine;
pub use trigger_state::ActionTriggerState;
