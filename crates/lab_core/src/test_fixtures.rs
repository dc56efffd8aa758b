//! Shared test fixtures for lab_core and downstream crates.
//!
//! `default_defs()` mirrors the shipped 15-mission catalog so tests do not
//! depend on the content directory. `mission_def()` builds a single ad hoc
//! definition.

use crate::{
    FreeFallObjective, LabContent, LinearObjective, MissionCatalog, MissionDef, MissionId,
    MissionKind, ProjectileObjective, ScenarioLimits, SimulationResult,
};

pub fn mission_def(id: &str, kind: MissionKind, target_value: f64, tolerance: f64) -> MissionDef {
    MissionDef {
        id: MissionId(id.to_string()),
        name: id.to_string(),
        description: String::new(),
        difficulty: 3,
        kind,
        target_value,
        tolerance,
        limits: ScenarioLimits::default(),
    }
}

fn def(
    id: &str,
    name: &str,
    difficulty: u8,
    kind: MissionKind,
    target_value: f64,
    tolerance: f64,
    limits: ScenarioLimits,
) -> MissionDef {
    MissionDef {
        id: MissionId(id.to_string()),
        name: name.to_string(),
        description: String::new(),
        difficulty,
        kind,
        target_value,
        tolerance,
        limits,
    }
}

fn distance(distance_m: f64) -> ScenarioLimits {
    ScenarioLimits {
        distance_m: Some(distance_m),
        ..ScenarioLimits::default()
    }
}

fn drop_height(drop_height_m: f64) -> ScenarioLimits {
    ScenarioLimits {
        drop_height_m: Some(drop_height_m),
        ..ScenarioLimits::default()
    }
}

pub fn default_defs() -> Vec<MissionDef> {
    use FreeFallObjective as F;
    use LinearObjective as L;
    use MissionKind::{FreeFall, LinearMotion, Projectile};
    use ProjectileObjective as P;

    let none = ScenarioLimits::default;
    vec![
        def("MRU_01", "First Step", 1, LinearMotion(L::ReachDistance), 10.0, 2.0, none()),
        def("MRU_02", "Exact Speed", 2, LinearMotion(L::ExactSpeed), 5.0, 0.5, distance(20.0)),
        def(
            "MRU_03",
            "Race Against the Clock",
            2,
            LinearMotion(L::RaceAgainstClock),
            8.0,
            0.0,
            distance(50.0),
        ),
        def("MRU_04", "Perfect Precision", 4, LinearMotion(L::HighPrecision), 47.5, 0.5, none()),
        def("MRU_05", "Marathon", 5, LinearMotion(L::ExactTime), 20.0, 1.0, distance(200.0)),
        def("CAIDA_01", "First Drop", 1, FreeFall(F::SimpleDrop), 20.0, 5.0, none()),
        def(
            "CAIDA_02",
            "Lunar Gravity",
            2,
            FreeFall(F::DifferentGravity),
            1.6,
            0.2,
            drop_height(50.0),
        ),
        def(
            "CAIDA_03",
            "Exact Prediction",
            3,
            FreeFall(F::PredictTime),
            4.52,
            0.3,
            drop_height(100.0),
        ),
        def("CAIDA_04", "Perfect Energy", 4, FreeFall(F::EnergyConserved), 2.0, 0.5, none()),
        def("CAIDA_05", "Upward Launch", 5, FreeFall(F::LaunchUpward), 30.0, 2.0, none()),
        def("TIRO_01", "First Launch", 1, Projectile(P::SimpleLaunch), 10.0, 0.0, none()),
        def("TIRO_02", "Fixed Target", 2, Projectile(P::FixedTarget), 25.0, 2.0, none()),
        def(
            "TIRO_03",
            "Optimal Angle",
            3,
            Projectile(P::OptimalAngle),
            45.0,
            3.0,
            ScenarioLimits {
                launch_speed_m_s: Some(20.0),
                ..ScenarioLimits::default()
            },
        ),
        def("TIRO_04", "Sharpshooter", 4, Projectile(P::MultipleTargets), 3.0, 0.0, none()),
        def(
            "TIRO_05",
            "Impossible Shot",
            5,
            Projectile(P::LimitedShot),
            80.0,
            3.0,
            ScenarioLimits {
                max_launch_speed_m_s: Some(25.0),
                ..ScenarioLimits::default()
            },
        ),
    ]
}

pub fn default_content() -> LabContent {
    LabContent {
        content_version: "test".to_string(),
        constants: crate::Constants::default(),
        missions: default_defs(),
    }
}

pub fn default_catalog() -> MissionCatalog {
    MissionCatalog::from_defs("test", default_defs()).expect("default missions are valid")
}

/// A result where every quantity equals `value`.
pub fn uniform_result(value: f64) -> SimulationResult {
    SimulationResult::new(value, value, value)
}

pub fn position_result(final_position: f64) -> SimulationResult {
    SimulationResult::new(1.0, final_position, final_position)
}

pub fn time_result(final_time: f64) -> SimulationResult {
    SimulationResult::new(final_time, 0.0, 0.0)
}
