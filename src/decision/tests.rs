use super::{ActionTriggerState, DecisionEngine};
use crate::config::{
    CollisionAvoidanceConfig, ConfigStore, DecisionConfig, DecisionMode, OffsetConfig,
    ProtectiveAction, SafeLandingConfig, WaypointConfig,
};
use crate::keychain::Keychain;
use crate::perception::LandingClassification;
use crate::vehicle::{
    GlobalOrigin, GlobalPosition, LandedPhase, LocalPosition, StatusSeverity, VelocityNed,
    mock::{MockVehicle, VehicleCommand},
};
use chrono::{DateTime, TimeDelta, Utc};
use std::{path::PathBuf, sync::Arc, time::Duration};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

const HOME: GlobalPosition = GlobalPosition::new(47.0, 8.0, 500.0);

fn safe_landing(policy: ProtectiveAction, retry: bool) -> DecisionConfig {
    DecisionConfig {
        enabled: true,
        mode: DecisionMode::SafeLanding,
        safe_landing: SafeLandingConfig {
            enabled: true,
            on_no_safe_land: policy,
            try_landing_after_action: retry,
            waypoint: WaypointConfig { lat_deg: 47.001, lon_deg: 8.001, alt_amsl_m: 520.0 },
            offset: OffsetConfig { x_m: 10.0, y_m: 0.0, z_m: 5.0 },
        },
        collision_avoidance: CollisionAvoidanceConfig::default(),
    }
}

fn collision(policy: ProtectiveAction, threshold_m: f32) -> DecisionConfig {
    DecisionConfig {
        enabled: true,
        mode: DecisionMode::SimpleCollisionAvoidance,
        safe_landing: SafeLandingConfig::default(),
        collision_avoidance: CollisionAvoidanceConfig {
            enabled: true,
            distance_threshold_m: threshold_m,
            action_on_trigger: policy,
        },
    }
}

async fn setup(config: DecisionConfig, phase: LandedPhase) -> (Arc<MockVehicle>, Keychain) {
    let mock = Arc::new(MockVehicle::new());
    let keychain = Keychain::new(mock.clone(), ConfigStore::new(config, PathBuf::new()));
    let telem = keychain.telemetry();
    telem.update_position(HOME).await;
    telem.update_landed_phase(phase).await;
    (mock, keychain)
}

fn after(t0: DateTime<Utc>, ms: i64) -> DateTime<Utc> { t0 + TimeDelta::milliseconds(ms) }

#[test]
fn test_trigger_state_cooldown() {
    let t0 = Utc::now();
    let mut state = ActionTriggerState::new();
    assert!(!state.expire(t0));
    state.mark(t0);
    assert!(state.is_triggered());
    assert!(!state.expire(after(t0, 4999)));
    assert!(state.is_triggered());
    assert!(state.expire(after(t0, 5000)));
    assert!(!state.is_triggered());
    assert_eq!(state.last_trigger(), Some(t0));
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_allows_one_action_per_window() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::Hold, false), LandedPhase::Landing).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    for k in 0..100 {
        engine.tick(after(t0, k * 50)).await;
    }
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold]);
    assert!(engine.trigger_state().is_triggered());

    // first tick at t0 + 5 s fires again
    engine.tick(after(t0, 5000)).await;
    assert_eq!(mock.flight_commands().len(), 2);
    engine.tick(after(t0, 5050)).await;
    assert_eq!(mock.flight_commands().len(), 2);
    assert_eq!(
        mock.status_texts()[0],
        (StatusSeverity::Info, "Position hold triggered for Safe Landing".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_unknown_landing_state_holds() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::ReturnToLaunch, false), LandedPhase::Landing).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    engine.tick(t0).await;
    engine.tick(after(t0, 50)).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold]);
    let (severity, text) = mock.status_texts().remove(0);
    assert_eq!(severity, StatusSeverity::Warning);
    assert!(text.contains("Unknown landing state"));
}

#[tokio::test(start_paused = true)]
async fn test_safe_landing_needs_landing_phase() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::Hold, false), LandedPhase::InAir).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();
    engine.tick(t0).await;

    keychain.telemetry().update_landed_phase(LandedPhase::Landing).await;
    keychain.landing().push(LandingClassification::CanLand).await;
    engine.tick(after(t0, 50)).await;
    assert!(mock.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_collision_avoidance_threshold() {
    let (mock, keychain) = setup(collision(ProtectiveAction::Hold, 0.5), LandedPhase::InAir).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    keychain.obstacle().update(0.6).await;
    for k in 0..200 {
        engine.tick(after(t0, k * 50)).await;
    }
    assert!(mock.commands().is_empty());

    keychain.obstacle().update(0.4).await;
    engine.tick(after(t0, 10_000)).await;
    engine.tick(after(t0, 10_050)).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold]);
}

#[tokio::test(start_paused = true)]
async fn test_collision_avoidance_ignores_stale_distance() {
    let (mock, keychain) = setup(collision(ProtectiveAction::Land, 0.5), LandedPhase::InAir).await;
    let mut engine = DecisionEngine::new(&keychain);
    keychain.obstacle().update(0.1).await;
    tokio::time::advance(Duration::from_secs(1)).await;
    engine.tick(Utc::now()).await;
    assert!(mock.commands().is_empty());

    keychain.obstacle().update(0.1).await;
    engine.tick(Utc::now()).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Land]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_fires_on_ground() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::Hold, true), LandedPhase::OnGround).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    keychain.obstacle().update(0.1).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    for k in 0..300 {
        engine.tick(after(t0, k * 50)).await;
    }
    keychain.config().replace(collision(ProtectiveAction::ReturnToLaunch, 1.0)).await;
    for k in 300..600 {
        engine.tick(after(t0, k * 50)).await;
    }
    assert!(mock.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disabled_engine_is_silent() {
    let mut cfg = collision(ProtectiveAction::Hold, 1.0);
    cfg.enabled = false;
    let (mock, keychain) = setup(cfg, LandedPhase::InAir).await;
    keychain.obstacle().update(0.1).await;
    let mut engine = DecisionEngine::new(&keychain);
    engine.tick(Utc::now()).await;
    assert!(mock.commands().is_empty());

    cfg.enabled = true;
    cfg.mode = DecisionMode::Disabled;
    keychain.config().replace(cfg).await;
    engine.tick(Utc::now()).await;
    assert!(mock.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_move_xyz_projects_body_offset() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::MoveXyzWrtCurrent, false), LandedPhase::Landing).await;
    let telem = keychain.telemetry();
    telem.set_origin(GlobalOrigin { lat_deg: 47.0, lon_deg: 8.0 }).await;
    telem
        .update_position_velocity_ned(LocalPosition::new(0.0, 0.0, -10.0), VelocityNed::unknown())
        .await;
    telem.update_yaw_deg(0.0).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    let mut engine = DecisionEngine::new(&keychain);

    engine.tick(Utc::now()).await;
    let cmds = mock.flight_commands();
    let [VehicleCommand::Goto { lat_deg, lon_deg, alt_amsl_m }] = cmds.as_slice() else {
        panic!("expected a single goto, got {cmds:?}");
    };
    let expected_lat = 47.0 + (10.0 / 6_371_000.0_f64).to_degrees();
    assert!((lat_deg - expected_lat).abs() < 1e-9);
    assert!((lon_deg - 8.0).abs() < 1e-9);
    assert!((alt_amsl_m - 505.0).abs() < 1e-9);
    assert!(engine.waypoint_target().target().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_move_xyz_without_origin_holds() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::MoveXyzWrtCurrent, false), LandedPhase::Landing).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    let mut engine = DecisionEngine::new(&keychain);

    engine.tick(Utc::now()).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold]);
    assert_eq!(mock.status_texts()[0].0, StatusSeverity::Warning);
    assert!(engine.waypoint_target().target().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_waypoint_arrival_retries_landing() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::GoToWaypoint, true), LandedPhase::Landing).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    engine.tick(t0).await;
    let waypoint = GlobalPosition::new(47.001, 8.001, 520.0);
    assert_eq!(
        mock.flight_commands(),
        vec![VehicleCommand::Goto { lat_deg: 47.001, lon_deg: 8.001, alt_amsl_m: 520.0 }]
    );
    assert_eq!(engine.waypoint_target().target(), Some(waypoint));

    keychain.telemetry().update_position(GlobalPosition::new(47.001_005, 8.001, 520.6)).await;
    keychain.landing().push(LandingClassification::CanLand).await;
    engine.tick(after(t0, 50)).await;
    engine.tick(after(t0, 100)).await;
    assert_eq!(mock.flight_commands().last(), Some(&VehicleCommand::Land));
    assert_eq!(mock.flight_commands().len(), 2);
    assert!(engine.waypoint_target().target().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_repeated_waypoint_falls_back_to_rtl() {
    let (mock, keychain) = setup(safe_landing(ProtectiveAction::GoToWaypoint, false), LandedPhase::Landing).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    engine.tick(t0).await;
    keychain.landing().push(LandingClassification::CannotLand).await;
    engine.tick(after(t0, 5000)).await;

    let cmds = mock.flight_commands();
    assert_eq!(cmds.len(), 2);
    assert!(matches!(cmds[0], VehicleCommand::Goto { .. }));
    assert_eq!(cmds[1], VehicleCommand::ReturnToLaunch);
    assert_eq!(mock.status_texts()[1].0, StatusSeverity::Warning);
}

#[tokio::test(start_paused = true)]
async fn test_failing_sink_keeps_cooldown() {
    let (mock, keychain) = setup(collision(ProtectiveAction::ReturnToLaunch, 1.0), LandedPhase::InAir).await;
    mock.set_failing(true);
    let mut engine = DecisionEngine::new(&keychain);
    let t0 = Utc::now();

    keychain.obstacle().update(0.2).await;
    engine.tick(t0).await;
    engine.tick(after(t0, 1000)).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::ReturnToLaunch]);
    assert!(engine.trigger_state().is_triggered());

    mock.set_failing(false);
    engine.tick(after(t0, 5000)).await;
    assert_eq!(mock.flight_commands().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_policies_hold() {
    for policy in [ProtectiveAction::ScriptCall, ProtectiveAction::Unsupported, ProtectiveAction::Land] {
        let (mock, keychain) = setup(safe_landing(policy, false), LandedPhase::Landing).await;
        keychain.landing().push(LandingClassification::CannotLand).await;
        let mut engine = DecisionEngine::new(&keychain);
        engine.tick(Utc::now()).await;
        assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold], "{policy}");
        let (severity, text) = mock.status_texts().remove(0);
        assert_eq!(severity, StatusSeverity::Warning);
        assert!(text.contains("not supported"));
    }

    let (mock, keychain) = setup(collision(ProtectiveAction::GoToWaypoint, 1.0), LandedPhase::InAir).await;
    keychain.obstacle().update(0.3).await;
    let mut engine = DecisionEngine::new(&keychain);
    engine.tick(Utc::now()).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold]);
    assert!(mock.status_texts()[0].1.contains("not supported"));
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_ticks_until_shutdown() {
    let (mock, keychain) = setup(collision(ProtectiveAction::Hold, 1.0), LandedPhase::InAir).await;
    keychain.obstacle().update(0.3).await;
    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(DecisionEngine::new(&keychain).run(shutdown.clone()));

    tokio::time::sleep(DecisionEngine::TICK * 4).await;
    assert_eq!(mock.flight_commands(), vec![VehicleCommand::Hold]);
    shutdown.cancel();
    worker.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_every_policy_issues_exactly_one_command() {
    for policy in ProtectiveAction::iter() {
        let (mock, keychain) = setup(collision(policy, 1.0), LandedPhase::InAir).await;
        keychain.obstacle().update(0.5).await;
        let mut engine = DecisionEngine::new(&keychain);
        engine.tick(Utc::now()).await;
        assert_eq!(mock.flight_commands().len(), 1, "{policy}");

        let (mock, keychain) = setup(safe_landing(policy, false), LandedPhase::Landing).await;
        keychain.landing().push(LandingClassification::CannotLand).await;
        let mut engine = DecisionEngine::new(&keychain);
        engine.tick(Utc::now()).await;
        assert_eq!(mock.flight_commands().len(), 1, "{policy}");
    }
}
