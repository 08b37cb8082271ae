//! The vehicle side of the core: the command sink contract, the telemetry
//! snapshot fed by the autopilot link and the geodetic helpers used when
//! repositioning.

mod commander;
mod geo;
#[cfg(test)]
pub(crate) mod mock;
mod telemetry;

pub use commander::{CommandError, StatusSeverity, VehicleCommander};
pub use geo::{GlobalOrigin, GlobalPosition, LocalPosition, WaypointTarget};
pub use telemetry::{LandedPhase, TelemetryMonitor, TelemetrySnapshot, VelocityNed};
