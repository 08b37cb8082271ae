use super::geo::{GlobalOrigin, GlobalPosition, LocalPosition};
use strum_macros::Display;
use tokio::sync::RwLock;

/// Ground contact state as reported by the autopilot.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandedPhase {
    InAir,
    TakingOff,
    Landing,
    OnGround,
    #[default]
    Unknown,
}

/// Velocity in the local NED frame, m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityNed {
    pub north_m_s: f64,
    pub east_m_s: f64,
    pub down_m_s: f64,
}

impl VelocityNed {
    pub const fn unknown() -> Self {
        Self { north_m_s: f64::NAN, east_m_s: f64::NAN, down_m_s: f64::NAN }
    }
}

/// Copy of the latest known vehicle state.
#[derive(Debug, Clone, Copy)]
pub struct TelemetrySnapshot {
    pub position: GlobalPosition,
    pub local_position: LocalPosition,
    pub velocity: VelocityNed,
    /// Heading in radians, NaN until the first attitude update.
    pub yaw_rad: f64,
    pub phase: LandedPhase,
    /// Global reference of the local frame, only known once the autopilot
    /// reported its GPS origin.
    pub origin: Option<GlobalOrigin>,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            position: GlobalPosition::unknown(),
            local_position: LocalPosition::unknown(),
            velocity: VelocityNed::unknown(),
            yaw_rad: f64::NAN,
            phase: LandedPhase::Unknown,
            origin: None,
        }
    }
}

impl TelemetrySnapshot {
    /// Projects a body-frame offset from the current local position onto the
    /// globe. Returns `None` while the origin, the local position or the yaw
    /// is not known yet.
    pub fn global_from_body_offset(&self, offset_x: f64, offset_y: f64) -> Option<(f64, f64)> {
        let origin = self.origin?;
        let local = self.local_position;
        if !(local.north_m.is_finite() && local.east_m.is_finite() && self.yaw_rad.is_finite()) {
            return None;
        }
        let target = local.offset_by_body(offset_x, offset_y, self.yaw_rad);
        Some(origin.global_from_local(&target))
    }
}

/// Thread-safe holder of the latest telemetry, written by the telemetry feed
/// and copied out once per decision tick.
#[derive(Debug, Default)]
pub struct TelemetryMonitor {
    snapshot: RwLock<TelemetrySnapshot>,
}

impl TelemetryMonitor {
    pub fn new() -> Self { Self::default() }

    pub async fn snapshot(&self) -> TelemetrySnapshot { *self.snapshot.read().await }

    pub async fn update_position(&self, position: GlobalPosition) {
        self.snapshot.write().await.position = position;
    }

    pub async fn update_position_velocity_ned(&self, position: LocalPosition, velocity: VelocityNed) {
        let mut snap = self.snapshot.write().await;
        snap.local_position = position;
        snap.velocity = velocity;
    }

    pub async fn update_yaw_deg(&self, yaw_deg: f64) {
        self.snapshot.write().await.yaw_rad = yaw_deg.to_radians();
    }

    pub async fn update_landed_phase(&self, phase: LandedPhase) {
        let mut snap = self.snapshot.write().await;
        if snap.phase != phase {
            crate::event!("Landed phase changed: {} -> {phase}", snap.phase);
        }
        snap.phase = phase;
    }

    pub async fn set_origin(&self, origin: GlobalOrigin) {
        crate::info!("Local frame origin set to lat {} deg, lon {} deg.", origin.lat_deg, origin.lon_deg);
        self.snapshot.write().await.origin = Some(origin);
    }
}
