//! Onboard decision layer of an autopilot companion computer.
//!
//! The [`decision::DecisionEngine`] watches telemetry and perception outputs
//! and issues protective flight commands, the
//! [`custom_action::CustomActionEngine`] executes operator defined custom
//! actions requested by the autopilot. Both talk to the vehicle through a
//! [`vehicle::VehicleCommander`]; [`manager::AutopilotManager`] wires them up.
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]

mod logger;

pub mod config;
pub mod custom_action;
pub mod decision;
pub mod keychain;
pub mod manager;
pub mod perception;
pub mod vehicle;
