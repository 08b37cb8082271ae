use crate::vehicle::GlobalPosition;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Which policy the decision engine runs.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionMode {
    SafeLanding,
    SimpleCollisionAvoidance,
    /// Also used for any mode string this build does not know.
    #[default]
    #[serde(other)]
    Disabled,
}

/// Protective reaction configured for a decision policy.
///
/// Every configured string maps onto exactly one variant, anything unknown
/// becomes [`ProtectiveAction::Unsupported`] which executes as a hold.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectiveAction {
    #[default]
    Hold,
    #[serde(rename = "RTL")]
    ReturnToLaunch,
    Land,
    MoveXyzWrtCurrent,
    GoToWaypoint,
    GoToWaypointXyz,
    MoveLlaWrtCurrent,
    ScriptCall,
    ApiCall,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_amsl_m: f64,
}

impl WaypointConfig {
    pub fn position(&self) -> GlobalPosition {
        GlobalPosition::new(self.lat_deg, self.lon_deg, self.alt_amsl_m)
    }
}

/// Body-frame offset (x forward, y right, z added to the AMSL altitude).
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeLandingConfig {
    pub enabled: bool,
    pub on_no_safe_land: ProtectiveAction,
    pub try_landing_after_action: bool,
    pub waypoint: WaypointConfig,
    pub offset: OffsetConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionAvoidanceConfig {
    pub enabled: bool,
    pub distance_threshold_m: f32,
    pub action_on_trigger: ProtectiveAction,
}

impl Default for CollisionAvoidanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            distance_threshold_m: 1.0,
            action_on_trigger: ProtectiveAction::Hold,
        }
    }
}

/// Operator configuration of the decision engine. A copy is taken at the
/// start of every decision tick, the engine never writes to it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub enabled: bool,
    pub mode: DecisionMode,
    pub safe_landing: SafeLandingConfig,
    pub collision_avoidance: CollisionAvoidanceConfig,
}
