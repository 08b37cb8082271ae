//! Boundary to the perception subsystem: landing site classification and
//! obstacle distance, both pulled once per decision tick.

mod debouncer;
mod landing_state;
mod monitors;

pub use debouncer::LandingDebouncer;
pub use landing_state::LandingClassification;
pub use monitors::{LandingMonitor, ObstacleMonitor};
