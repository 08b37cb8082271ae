use super::trigger_state::ActionTriggerState;
use crate::config::{
    CollisionAvoidanceConfig, ConfigStore, DecisionMode, ProtectiveAction, SafeLandingConfig,
};
use crate::keychain::Keychain;
use crate::perception::{LandingClassification, LandingMonitor, ObstacleMonitor};
use crate::vehicle::{
    GlobalPosition, LandedPhase, StatusSeverity, TelemetryMonitor, TelemetrySnapshot,
    VehicleCommander, WaypointTarget,
};
use crate::{error, event, info, log, warn};
use chrono::{DateTime, Utc};
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
    time::Duration,
};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Flight command issued by one of the decision policies.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ProtectiveCommand {
    Hold,
    ReturnToLaunch,
    Goto(GlobalPosition),
    Land,
}

impl Display for ProtectiveCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtectiveCommand::Hold => write!(f, "Position hold"),
            ProtectiveCommand::ReturnToLaunch => write!(f, "RTL"),
            ProtectiveCommand::Goto(pos) => write!(f, "Go-to {pos}"),
            ProtectiveCommand::Land => write!(f, "Land"),
        }
    }
}

/// Periodic decision loop turning live safety signals into protective flight
/// commands, at most one per cooldown window.
pub struct DecisionEngine {
    commander: Arc<dyn VehicleCommander>,
    config: Arc<ConfigStore>,
    telemetry: Arc<TelemetryMonitor>,
    landing: Arc<LandingMonitor>,
    obstacle: Arc<ObstacleMonitor>,
    trigger: ActionTriggerState,
    waypoint: WaypointTarget,
}

impl DecisionEngine {
    /// Loop period, 20 Hz.
    pub const TICK: Duration = Duration::from_millis(50);

    /// Creates a new `DecisionEngine` with an idle trigger state.
    ///
    /// # Arguments
    /// * `keychain` - Source of the vehicle link, the configuration and the
    ///   telemetry and perception feeds.
    pub fn new(keychain: &Keychain) -> Self {
        Self {
            commander: keychain.commander(),
            config: keychain.config(),
            telemetry: keychain.telemetry(),
            landing: keychain.landing(),
            obstacle: keychain.obstacle(),
            trigger: ActionTriggerState::new(),
            waypoint: WaypointTarget::new(),
        }
    }

    pub fn trigger_state(&self) -> &ActionTriggerState { &self.trigger }

    pub fn waypoint_target(&self) -> &WaypointTarget { &self.waypoint }

    /// Ticks the engine every [`DecisionEngine::TICK`] until `shutdown` fires.
    ///
    /// # Arguments
    /// * `shutdown` - Token ending the loop.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Decision engine running.");
        let mut tick_interval = interval(Self::TICK);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = tick_interval.tick() => self.tick(Utc::now()).await,
                () = shutdown.cancelled() => break,
            }
        }
        info!("Decision engine stopped.");
    }

    /// One decision cycle: expires the cooldown, then evaluates the policy
    /// selected by the current configuration.
    ///
    /// # Arguments
    /// * `now` - Wall clock time of this cycle, used for the cooldown and the
    ///   freshness of the perception inputs.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        let config = self.config.snapshot().await;
        let telem = self.telemetry.snapshot().await;

        if self.trigger.expire(now) {
            event!("Protective action cooldown elapsed.");
        }
        if !config.enabled {
            return;
        }
        match config.mode {
            DecisionMode::SafeLanding if config.safe_landing.enabled => {
                self.handle_safe_landing(&config.safe_landing, &telem, now).await;
            }
            DecisionMode::SimpleCollisionAvoidance if config.collision_avoidance.enabled => {
                self.handle_collision_avoidance(&config.collision_avoidance, &telem, now).await;
            }
            _ => {}
        }
    }

    async fn handle_safe_landing(
        &mut self,
        cfg: &SafeLandingConfig,
        telem: &TelemetrySnapshot,
        now: DateTime<Utc>,
    ) {
        if telem.phase == LandedPhase::Landing && !self.trigger.is_triggered() {
            match self.landing.current().await {
                LandingClassification::Unknown => {
                    self.command(ProtectiveCommand::Hold).await;
                    self.status(StatusSeverity::Warning, "Unknown landing state. Holding...").await;
                    self.trigger.mark(now);
                }
                LandingClassification::CannotLand => {
                    warn!("Not able to land.");
                    self.apply_no_safe_land(cfg, telem).await;
                    self.trigger.mark(now);
                }
                LandingClassification::CanLand | LandingClassification::CloseToGround => {}
            }
        }

        if self.waypoint.arrived(&telem.position) {
            log!("Arrived at waypoint {}.", telem.position);
            self.waypoint.clear();
            if cfg.try_landing_after_action && telem.phase != LandedPhase::OnGround {
                self.command(ProtectiveCommand::Land).await;
            }
        }
    }

    async fn apply_no_safe_land(&mut self, cfg: &SafeLandingConfig, telem: &TelemetrySnapshot) {
        match cfg.on_no_safe_land {
            ProtectiveAction::Hold => {
                self.command(ProtectiveCommand::Hold).await;
                self.status(StatusSeverity::Info, "Position hold triggered for Safe Landing").await;
            }
            ProtectiveAction::ReturnToLaunch => {
                self.command(ProtectiveCommand::ReturnToLaunch).await;
                self.status(StatusSeverity::Info, "RTL triggered for Safe Landing").await;
            }
            ProtectiveAction::MoveXyzWrtCurrent => {
                let target = telem
                    .global_from_body_offset(cfg.offset.x_m, cfg.offset.y_m)
                    .map(|(lat, lon)| {
                        GlobalPosition::new(lat, lon, telem.position.alt_amsl_m + cfg.offset.z_m)
                    })
                    .filter(GlobalPosition::is_finite);
                if let Some(pos) = target {
                    self.goto(pos).await;
                    let text = format!("Moving XYZ WRT current position triggered. Heading to {pos}");
                    self.status(StatusSeverity::Info, &text).await;
                } else {
                    self.command(ProtectiveCommand::Hold).await;
                    let text = "Local position or origin unknown, cannot move XYZ. Holding position...";
                    self.status(StatusSeverity::Warning, text).await;
                }
            }
            ProtectiveAction::GoToWaypoint => {
                let pos = cfg.waypoint.position();
                if self.waypoint.was_commanded(&pos) {
                    self.command(ProtectiveCommand::ReturnToLaunch).await;
                    let text = "Waypoint already visited without a safe landing spot. RTL triggered instead...";
                    self.status(StatusSeverity::Warning, text).await;
                } else {
                    self.goto(pos).await;
                    let text = format!("Go-To global waypoint triggered. Heading to {pos}");
                    self.status(StatusSeverity::Info, &text).await;
                }
            }
            unsupported @ (ProtectiveAction::Land
            | ProtectiveAction::GoToWaypointXyz
            | ProtectiveAction::MoveLlaWrtCurrent
            | ProtectiveAction::ScriptCall
            | ProtectiveAction::ApiCall
            | ProtectiveAction::Unsupported) => {
                self.hold_unsupported(unsupported, "Safe Landing").await;
            }
        }
    }

    async fn handle_collision_avoidance(
        &mut self,
        cfg: &CollisionAvoidanceConfig,
        telem: &TelemetrySnapshot,
        now: DateTime<Utc>,
    ) {
        if telem.phase != LandedPhase::InAir || self.trigger.is_triggered() {
            return;
        }
        let distance = self.obstacle.distance().await;
        if !distance.is_finite() || distance > cfg.distance_threshold_m {
            return;
        }
        warn!("Obstacle at {distance:.2} m, threshold {:.2} m.", cfg.distance_threshold_m);
        match cfg.action_on_trigger {
            ProtectiveAction::Hold => self.command(ProtectiveCommand::Hold).await,
            ProtectiveAction::ReturnToLaunch => self.command(ProtectiveCommand::ReturnToLaunch).await,
            ProtectiveAction::Land => self.command(ProtectiveCommand::Land).await,
            unsupported @ (ProtectiveAction::MoveXyzWrtCurrent
            | ProtectiveAction::GoToWaypoint
            | ProtectiveAction::GoToWaypointXyz
            | ProtectiveAction::MoveLlaWrtCurrent
            | ProtectiveAction::ScriptCall
            | ProtectiveAction::ApiCall
            | ProtectiveAction::Unsupported) => {
                self.hold_unsupported(unsupported, "Collision Avoidance").await;
            }
        }
        self.trigger.mark(now);
    }

    async fn hold_unsupported(&self, action: ProtectiveAction, policy: &str) {
        self.command(ProtectiveCommand::Hold).await;
        let text = format!("{action} action not supported for {policy}. Holding position...");
        self.status(StatusSeverity::Warning, &text).await;
    }

    async fn goto(&mut self, pos: GlobalPosition) {
        self.command(ProtectiveCommand::Goto(pos)).await;
        self.waypoint.set(pos);
    }

    async fn command(&self, cmd: ProtectiveCommand) {
        let res = match cmd {
            ProtectiveCommand::Hold => self.commander.hold().await,
            ProtectiveCommand::ReturnToLaunch => self.commander.return_to_launch().await,
            ProtectiveCommand::Goto(pos) => {
                self.commander.goto(pos.lat_deg, pos.lon_deg, pos.alt_amsl_m, f64::NAN).await
            }
            ProtectiveCommand::Land => self.commander.land().await,
        };
        match res {
            Ok(()) => info!("{cmd} triggered."),
            Err(e) => error!("{cmd} command failed: {e}."),
        }
    }

    async fn status(&self, severity: StatusSeverity, text: &str) {
        match severity {
            StatusSeverity::Info => info!("{text}"),
            StatusSeverity::Warning | StatusSeverity::Critical => warn!("{text}"),
        }
        if let Err(e) = self.commander.send_status_text(severity, text).await {
            warn!("Status text not delivered: {e}.");
        }
    }
}
