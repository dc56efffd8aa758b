use super::*;
use crate::test_fixtures::{
    default_catalog, mission_def, position_result, time_result, uniform_result,
};

fn earth() -> PhysicsConfig {
    PhysicsConfig::default()
}

fn mission(kind: MissionKind, target: f64, tolerance: f64, difficulty: u8) -> Mission {
    let mut def = mission_def("M_TEST", kind, target, tolerance);
    def.difficulty = difficulty;
    Mission::from_def(def, true).unwrap()
}

// --- Scoring through missions -------------------------------------------

#[test]
fn test_reach_distance_edge_of_tolerance_completes_with_zero_stars() {
    let mut m = mission(
        MissionKind::LinearMotion(LinearObjective::ReachDistance),
        10.0,
        2.0,
        1,
    );
    let attempt = m.register_result(&position_result(9.0), &earth());

    assert!(attempt.success);
    assert!((attempt.precision.unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(attempt.stars, 0);
    assert_eq!(attempt.points, 0);
    assert!(m.is_completed(), "inside tolerance completes even with 0 stars");
    assert_eq!(m.stars_earned(), 0);
    assert_eq!(m.best_score(), 0);
}

#[test]
fn test_reach_distance_exact_hit_is_perfect() {
    let mut m = mission(
        MissionKind::LinearMotion(LinearObjective::ReachDistance),
        10.0,
        2.0,
        1,
    );
    let attempt = m.register_result(&position_result(10.0), &earth());
    assert_eq!(attempt.stars, 3);
    assert_eq!(attempt.points, 100 * 2 + 50);
    assert_eq!(m.stars_display(), "★★★");
}

#[test]
fn test_predict_time_close_guess_earns_two_stars() {
    let mut m = mission(
        MissionKind::FreeFall(FreeFallObjective::PredictTime),
        4.52,
        0.3,
        3,
    );
    let attempt = m.register_result(&time_result(4.50), &earth());
    assert!(attempt.success);
    let precision = attempt.precision.unwrap();
    assert!((precision - 0.933_333).abs() < 1e-4);
    assert_eq!(attempt.stars, 2);
    assert_eq!(attempt.points, 450);
}

#[test]
fn test_race_over_time_fails_without_state_change() {
    let mut m = mission(
        MissionKind::LinearMotion(LinearObjective::RaceAgainstClock),
        8.0,
        0.0,
        2,
    );
    let before = m.progress().clone();
    let attempt = m.register_result(&time_result(8.5), &earth());
    assert!(!attempt.success);
    assert_eq!(attempt.precision, None);
    assert_eq!(m.progress(), &before);
    assert!(!m.is_completed());
}

#[test]
fn test_race_under_time_succeeds() {
    let m = mission(
        MissionKind::LinearMotion(LinearObjective::RaceAgainstClock),
        8.0,
        0.0,
        2,
    );
    assert!(m.evaluate(&time_result(7.9), &earth()));
    assert!(m.evaluate(&time_result(8.0), &earth()));
}

#[test]
fn test_simple_launch_is_at_least() {
    let m = mission(
        MissionKind::Projectile(ProjectileObjective::SimpleLaunch),
        10.0,
        0.0,
        1,
    );
    assert!(m.evaluate(&position_result(40.0), &earth()));
    assert!(m.evaluate(&position_result(10.0), &earth()));
    assert!(!m.evaluate(&position_result(9.99), &earth()));
}

#[test]
fn test_exact_speed_reads_average_velocity() {
    let m = mission(
        MissionKind::LinearMotion(LinearObjective::ExactSpeed),
        5.0,
        0.5,
        2,
    );
    let result = SimulationResult::new(4.0, 20.0, 5.2);
    let observed = m.observed_value(&result, &earth()).unwrap();
    assert!((observed - 5.2).abs() < 1e-12);
    assert!(m.evaluate(&result, &earth()));
}

#[test]
fn test_different_gravity_reads_configured_gravity() {
    let m = mission(
        MissionKind::FreeFall(FreeFallObjective::DifferentGravity),
        1.6,
        0.2,
        2,
    );
    let result = uniform_result(50.0);
    assert!(!m.evaluate(&result, &earth()));
    assert!(m.evaluate(&result, &PhysicsConfig::with_gravity(1.62)));
}

#[test]
fn test_unsupported_objectives_never_succeed() {
    for kind in [
        MissionKind::FreeFall(FreeFallObjective::EnergyConserved),
        MissionKind::Projectile(ProjectileObjective::OptimalAngle),
        MissionKind::Projectile(ProjectileObjective::MultipleTargets),
    ] {
        let mut m = mission(kind, 3.0, 1.0, 3);
        assert!(!m.is_supported());
        let attempt = m.register_result(&uniform_result(3.0), &earth());
        assert!(!attempt.success, "{kind:?} must fail closed");
        assert!(!m.is_completed());
    }
}

// --- Monotonic progress -------------------------------------------------

#[test]
fn test_repeated_registration_is_idempotent() {
    let mut m = mission(
        MissionKind::LinearMotion(LinearObjective::ReachDistance),
        10.0,
        2.0,
        2,
    );
    let result = position_result(9.8);
    let first = m.register_result(&result, &earth());
    let after_first = m.progress().clone();
    let second = m.register_result(&result, &earth());

    assert!(first.new_best);
    assert!(!second.new_best);
    assert_eq!(m.progress(), &after_first);
}

#[test]
fn test_progress_never_decreases() {
    // base 100: 1 star → 100, 3 stars → 250
    let mut m = mission(
        MissionKind::LinearMotion(LinearObjective::ReachDistance),
        10.0,
        2.0,
        1,
    );
    let one_star = m.register_result(&position_result(10.5), &earth());
    assert_eq!((one_star.stars, one_star.points), (1, 100));

    let three_star = m.register_result(&position_result(10.0), &earth());
    assert_eq!((three_star.stars, three_star.points), (3, 250));

    m.register_result(&position_result(10.5), &earth());
    assert_eq!(m.stars_earned(), 3);
    assert_eq!(m.best_score(), 250);
}

// --- Catalog -------------------------------------------------------------

#[test]
fn test_catalog_unlocks_first_mission_per_motion() {
    let catalog = default_catalog();
    assert_eq!(catalog.len(), 15);
    for motion in MotionKind::ALL {
        let unlocked: Vec<&str> = catalog
            .by_motion(motion)
            .filter(|m| m.is_unlocked())
            .map(|m| m.id().0.as_str())
            .collect();
        assert_eq!(unlocked.len(), 1, "{motion}: exactly one unlocked");
        assert_eq!(catalog.by_motion(motion).count(), 5);
    }
    assert!(catalog.get(&MissionId("MRU_01".to_string())).unwrap().is_unlocked());
    assert!(!catalog.get(&MissionId("MRU_02".to_string())).unwrap().is_unlocked());
}

#[test]
fn test_catalog_rejects_duplicate_ids() {
    let kind = MissionKind::LinearMotion(LinearObjective::ReachDistance);
    let defs = vec![mission_def("A", kind, 1.0, 0.1), mission_def("A", kind, 2.0, 0.1)];
    assert_eq!(
        MissionCatalog::from_defs("v", defs).unwrap_err(),
        CatalogError::DuplicateId(MissionId("A".to_string()))
    );
}

#[test]
fn test_catalog_refuses_locked_and_unknown_missions() {
    let mut catalog = default_catalog();
    let locked = MissionId("MRU_02".to_string());
    assert_eq!(
        catalog
            .register_result(&locked, &uniform_result(5.0), &earth())
            .unwrap_err(),
        CatalogError::MissionLocked(locked.clone())
    );

    let unknown = MissionId("NOPE".to_string());
    assert_eq!(
        catalog.get(&unknown).unwrap_err(),
        CatalogError::UnknownMission(unknown)
    );

    assert!(catalog.unlock(&locked).unwrap());
    assert!(!catalog.unlock(&locked).unwrap());
    let attempt = catalog
        .register_result(&locked, &uniform_result(5.0), &earth())
        .unwrap();
    assert!(attempt.success);
}

#[test]
fn test_next_in_motion_stays_within_motion() {
    let catalog = default_catalog();
    let next = catalog.next_in_motion(&MissionId("MRU_01".to_string())).unwrap();
    assert_eq!(next.id().0, "MRU_02");
    assert!(catalog
        .next_in_motion(&MissionId("MRU_05".to_string()))
        .is_none());
}

#[test]
fn test_snapshot_round_trip_and_unknown_ids() {
    let mut catalog = default_catalog();
    let id = MissionId("MRU_01".to_string());
    catalog
        .register_result(&id, &position_result(10.0), &earth())
        .unwrap();

    let mut snapshot = catalog.snapshot();
    snapshot.missions.push(ProgressRecord {
        id: MissionId("GONE_01".to_string()),
        unlocked: true,
        completed: true,
        stars_earned: 3,
        best_score: 999,
    });
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: ProgressSnapshot = serde_json::from_str(&json).unwrap();

    let mut fresh = default_catalog();
    let unknown = fresh.restore(&parsed);
    assert_eq!(unknown, vec![MissionId("GONE_01".to_string())]);
    let restored = fresh.get(&id).unwrap();
    assert!(restored.is_completed());
    assert_eq!(restored.stars_earned(), 3);
    assert_eq!(restored.best_score(), 250);
}

#[test]
fn test_restore_ignores_stars_of_incomplete_record() {
    let mut catalog = default_catalog();
    let id = MissionId("TIRO_01".to_string());
    let snapshot = ProgressSnapshot {
        content_version: catalog.content_version().to_string(),
        missions: vec![ProgressRecord {
            id: id.clone(),
            unlocked: true,
            completed: false,
            stars_earned: 3,
            best_score: 650,
        }],
    };
    assert!(catalog.restore(&snapshot).is_empty());

    let mission = catalog.get(&id).unwrap();
    assert!(mission.is_unlocked());
    assert!(!mission.is_completed());
    assert_eq!(mission.stars_earned(), 0);
    assert_eq!(mission.best_score(), 0);
    let summary = summarize(catalog.missions());
    assert_eq!(summary.total_stars, 0);
    assert_eq!(summary.total_points, 0);
}

#[test]
fn test_reset_progress_restores_initial_locks() {
    let mut catalog = default_catalog();
    catalog.unlock(&MissionId("TIRO_03".to_string())).unwrap();
    catalog.reset_progress();
    assert!(!catalog
        .get(&MissionId("TIRO_03".to_string()))
        .unwrap()
        .is_unlocked());
    assert!(catalog
        .get(&MissionId("TIRO_01".to_string()))
        .unwrap()
        .is_unlocked());
}

// --- Aggregator ------------------------------------------------------------

#[test]
fn test_summary_totals() {
    let mut catalog = default_catalog();
    catalog
        .register_result(&MissionId("MRU_01".to_string()), &position_result(10.0), &earth())
        .unwrap();
    catalog
        .register_result(&MissionId("CAIDA_01".to_string()), &position_result(21.0), &earth())
        .unwrap();

    let summary = summarize(catalog.missions());
    assert_eq!(summary.total_missions, 15);
    assert_eq!(summary.max_stars, 45);
    assert_eq!(summary.completed_count, 2);
    // MRU_01 3★ 250, CAIDA_01 precision 0.8 → 2★ 150
    assert_eq!(summary.total_stars, 5);
    assert_eq!(summary.total_points, 400);

    let by_motion = summarize_by_motion(catalog.missions());
    assert_eq!(by_motion.len(), 3);
    assert_eq!(by_motion[0].0, MotionKind::LinearMotion);
    assert_eq!(by_motion[0].1.total_points, 250);
    assert_eq!(by_motion[2].1.completed_count, 0);
}

#[test]
fn test_empty_summary() {
    let summary = summarize(std::iter::empty());
    assert_eq!(summary, ProgressSummary::default());
    assert!(summary.completion_percent().abs() < 1e-12);
}

// --- Simulation into mission ---------------------------------------------

#[test]
fn test_simulated_drop_scores_predict_time() {
    let mut catalog = default_catalog();
    let id = MissionId("CAIDA_03".to_string());
    catalog.unlock(&id).unwrap();
    let mission = catalog.get(&id).unwrap();
    let setup = mission
        .apply_to(Setup::FreeFall(DropSetup {
            initial_height: 1.0,
            initial_velocity: 0.0,
            gravity: None,
        }))
        .unwrap();
    let mut sim = Simulation::new(setup, earth(), &Constants::default()).unwrap();
    let result = sim.run_to_end();
    let physics = sim.physics();

    let attempt = catalog.register_result(&id, &result, &physics).unwrap();
    assert!(attempt.success);
    // √(200/9.8) ≈ 4.5175 against 4.52 ± 0.3
    assert_eq!(attempt.stars, 3);
}

#[test]
fn test_reset_gravity_returns_to_default() {
    let mut physics = PhysicsConfig::with_gravity(1.62);
    physics.reset_gravity();
    assert!((physics.gravity - kinematics::DEFAULT_GRAVITY).abs() < 1e-12);
}

#[test]
fn test_gravity_override_ends_with_the_run() {
    let base = earth();
    let moon = Setup::FreeFall(DropSetup {
        initial_height: 20.0,
        initial_velocity: 0.0,
        gravity: Some(1.62),
    });
    let mut lunar = Simulation::new(moon, base, &Constants::default()).unwrap();
    lunar.run_to_end();
    assert!((lunar.physics().gravity - 1.62).abs() < 1e-12);

    // The caller's config is untouched, so the next scenario runs on Earth.
    assert!((base.gravity - kinematics::DEFAULT_GRAVITY).abs() < 1e-12);
    let plain = Setup::FreeFall(DropSetup {
        initial_height: 20.0,
        initial_velocity: 0.0,
        gravity: None,
    });
    let earth_run = Simulation::new(plain, base, &Constants::default()).unwrap();
    assert!((earth_run.physics().gravity - kinematics::DEFAULT_GRAVITY).abs() < 1e-12);
}
