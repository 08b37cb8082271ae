use super::{debouncer::LandingDebouncer, landing_state::LandingClassification};
use crate::event;
use std::time::Duration;
use tokio::{sync::Mutex, time::Instant};

/// Holds the debounced landing classification between the perception mapper
/// and the decision engine.
#[derive(Debug)]
pub struct LandingMonitor {
    state: Mutex<LandingMonitorState>,
}

#[derive(Debug)]
struct LandingMonitorState {
    debouncer: LandingDebouncer,
    stabilized: LandingClassification,
    last_update: Option<Instant>,
}

impl LandingMonitor {
    /// Readings older than this are treated as missing.
    pub const STALE_AFTER: Duration = Duration::from_millis(500);

    pub fn new() -> Self {
        Self {
            state: Mutex::new(LandingMonitorState {
                debouncer: LandingDebouncer::new(),
                stabilized: LandingClassification::Unknown,
                last_update: None,
            }),
        }
    }

    /// Feeds one raw mapper output through the debouncer and stores the
    /// stabilized result.
    pub async fn push(&self, raw: LandingClassification) -> LandingClassification {
        let mut state = self.state.lock().await;
        let prev = state.stabilized;
        let stabilized = state.debouncer.push(raw);
        state.stabilized = stabilized;
        state.last_update = Some(Instant::now());
        if prev != stabilized {
            event!("Landing state {prev} -> {stabilized} (raw {raw}).");
        }
        stabilized
    }

    /// The mapper ran without usable depth data. Anything but
    /// `CloseToGround` decays to `Unknown`.
    pub async fn mark_no_data(&self) {
        let mut state = self.state.lock().await;
        if state.stabilized != LandingClassification::CloseToGround {
            state.stabilized = LandingClassification::Unknown;
        }
    }

    /// Current stabilized classification. A stale reading is reported as
    /// `Unknown` unless the vehicle was last seen close to the ground.
    pub async fn current(&self) -> LandingClassification {
        let state = self.state.lock().await;
        let fresh = state.last_update.is_some_and(|t| t.elapsed() <= Self::STALE_AFTER);
        if fresh || state.stabilized == LandingClassification::CloseToGround {
            state.stabilized
        } else {
            LandingClassification::Unknown
        }
    }
}

impl Default for LandingMonitor {
    fn default() -> Self { Self::new() }
}

/// Latest distance to the closest obstacle in the depth camera's region of
/// interest.
#[derive(Debug)]
pub struct ObstacleMonitor {
    latest: Mutex<(f32, Option<Instant>)>,
}

impl ObstacleMonitor {
    pub const STALE_AFTER: Duration = Duration::from_millis(500);

    pub fn new() -> Self { Self { latest: Mutex::new((f32::NAN, None)) } }

    pub async fn update(&self, distance_m: f32) {
        *self.latest.lock().await = (distance_m, Some(Instant::now()));
    }

    /// Distance in meters, NaN if nothing fresh was received.
    pub async fn distance(&self) -> f32 {
        let (dist, t) = *self.latest.lock().await;
        if t.is_some_and(|t| t.elapsed() <= Self::STALE_AFTER) { dist } else { f32::NAN }
    }
}

impl Default for ObstacleMonitor {
    fn default() -> Self { Self::new() }
}
