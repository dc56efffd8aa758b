//! One simulation bound to one mission, scored exactly once.

use lab_core::{
    Attempt, CatalogError, Constants, Mission, MissionCatalog, MissionId, PhysicsConfig,
    Setup, SetupError, Simulation, SimulationResult, StepOutcome,
};
use thiserror::Error;

use crate::AttemptSource;

#[derive(Debug, Error, PartialEq)]
pub enum RunError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Anything that can score a finished run against a mission.
pub trait ResultSink {
    fn register_result(
        &mut self,
        id: &MissionId,
        result: &SimulationResult,
        physics: &PhysicsConfig,
    ) -> Result<Attempt, CatalogError>;
}

impl ResultSink for MissionCatalog {
    fn register_result(
        &mut self,
        id: &MissionId,
        result: &SimulationResult,
        physics: &PhysicsConfig,
    ) -> Result<Attempt, CatalogError> {
        MissionCatalog::register_result(self, id, result, physics)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Running,
    Paused,
    /// The run finished on this step and was scored.
    Scored(Attempt),
    /// Already scored earlier.
    Done,
}

#[derive(Debug)]
pub struct MissionRun {
    /// Taken when the run is scored, so a second finish scores nothing.
    mission_id: Option<MissionId>,
    simulation: Simulation,
}

impl MissionRun {
    /// Pin `setup` to the mission and start the clock. Locked missions are
    /// refused.
    pub fn start(
        mission: &Mission,
        setup: Setup,
        physics: PhysicsConfig,
        constants: &Constants,
    ) -> Result<Self, RunError> {
        if !mission.is_unlocked() {
            return Err(CatalogError::MissionLocked(mission.id().clone()).into());
        }
        let setup = mission.apply_to(setup)?;
        let mut simulation = Simulation::new(setup, physics, constants)?;
        simulation.start();
        Ok(Self {
            mission_id: Some(mission.id().clone()),
            simulation,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn is_scored(&self) -> bool {
        self.mission_id.is_none()
    }

    pub fn pause(&mut self) {
        self.simulation.pause();
    }

    pub fn resume(&mut self) {
        self.simulation.resume();
    }

    pub fn step(&mut self, sink: &mut impl ResultSink) -> Result<RunStatus, CatalogError> {
        match self.simulation.step() {
            StepOutcome::Running => Ok(RunStatus::Running),
            StepOutcome::Paused => Ok(RunStatus::Paused),
            StepOutcome::Idle => Ok(RunStatus::Done),
            StepOutcome::Finished(result) => Ok(match self.score(&result, sink)? {
                Some(attempt) => RunStatus::Scored(attempt),
                None => RunStatus::Done,
            }),
        }
    }

    /// End the run early and score it where it stands.
    pub fn stop(&mut self, sink: &mut impl ResultSink) -> Result<Option<Attempt>, CatalogError> {
        match self.simulation.stop() {
            Some(result) => self.score(&result, sink),
            None => Ok(None),
        }
    }

    /// Step until the run ends. `None` if it was already scored.
    pub fn run_to_end(&mut self, sink: &mut impl ResultSink) -> Result<Option<Attempt>, CatalogError> {
        if self.is_scored() {
            return Ok(None);
        }
        let result = self.simulation.run_to_end();
        self.score(&result, sink)
    }

    fn score(
        &mut self,
        result: &SimulationResult,
        sink: &mut impl ResultSink,
    ) -> Result<Option<Attempt>, CatalogError> {
        let Some(id) = self.mission_id.take() else {
            return Ok(None);
        };
        let physics = self.simulation.physics();
        let attempt = sink.register_result(&id, result, &physics)?;
        tracing::info!(
            mission = %id,
            success = attempt.success,
            stars = attempt.stars,
            points = attempt.points,
            final_time = result.final_time,
            "mission run scored"
        );
        Ok(Some(attempt))
    }
}

/// Ask `source` for a setup and play it to the end against `catalog`.
/// `None` when the source declines the mission.
pub fn attempt_mission(
    catalog: &mut MissionCatalog,
    id: &MissionId,
    source: &mut impl AttemptSource,
    physics: PhysicsConfig,
    constants: &Constants,
) -> Result<Option<(Attempt, SimulationResult)>, RunError> {
    let mission = catalog.get(id)?;
    let Some(setup) = source.propose_setup(mission, &physics) else {
        tracing::debug!(mission = %id, "attempt source skipped mission");
        return Ok(None);
    };
    let mut run = MissionRun::start(mission, setup, physics, constants)?;
    let attempt = run.run_to_end(catalog)?;
    Ok(attempt.zip(run.simulation().result()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AutoSolver;
    use lab_core::test_fixtures::default_catalog;
    use lab_core::LinearSetup;

    /// Walk for 2.5 s; at 4 m/s that lands exactly on MRU_01's 10 m.
    fn walk(velocity: f64) -> Setup {
        Setup::LinearMotion(LinearSetup {
            initial_position: 0.0,
            velocity,
            target_distance: None,
            time_limit: Some(2.5),
        })
    }

    /// Counts registrations so double scoring shows up.
    struct CountingSink {
        inner: MissionCatalog,
        calls: usize,
    }

    impl ResultSink for CountingSink {
        fn register_result(
            &mut self,
            id: &MissionId,
            result: &SimulationResult,
            physics: &PhysicsConfig,
        ) -> Result<Attempt, CatalogError> {
            self.calls += 1;
            self.inner.register_result(id, result, physics)
        }
    }

    #[test]
    fn test_run_scores_exactly_once() {
        let catalog = default_catalog();
        let id = MissionId("MRU_01".to_string());
        let mission = catalog.get(&id).unwrap().clone();
        let mut sink = CountingSink {
            inner: catalog,
            calls: 0,
        };

        let mut run =
            MissionRun::start(&mission, walk(4.0), PhysicsConfig::default(), &Constants::default())
                .unwrap();
        let mut scored = 0;
        for _ in 0..200 {
            if let RunStatus::Scored(attempt) = run.step(&mut sink).unwrap() {
                assert!(attempt.success);
                assert_eq!(attempt.stars, 3);
                scored += 1;
            }
        }
        assert_eq!(scored, 1);
        assert_eq!(run.stop(&mut sink).unwrap(), None);
        assert_eq!(run.run_to_end(&mut sink).unwrap(), None);
        assert_eq!(sink.calls, 1);
        assert!(run.is_scored());
    }

    #[test]
    fn test_manual_stop_scores_partial_run() {
        let mut catalog = default_catalog();
        let id = MissionId("MRU_01".to_string());
        let mission = catalog.get(&id).unwrap().clone();
        let mut run =
            MissionRun::start(&mission, walk(1.0), PhysicsConfig::default(), &Constants::default())
                .unwrap();
        for _ in 0..10 {
            run.step(&mut catalog).unwrap();
        }
        let attempt = run.stop(&mut catalog).unwrap().unwrap();
        // 0.3 m of 10 m: far outside tolerance
        assert!(!attempt.success);
        assert!(!catalog.get(&id).unwrap().is_completed());
        assert_eq!(run.stop(&mut catalog).unwrap(), None);
    }

    #[test]
    fn test_locked_mission_is_refused() {
        let catalog = default_catalog();
        let mission = catalog.get(&MissionId("MRU_02".to_string())).unwrap();
        let err = MissionRun::start(mission, walk(5.0), PhysicsConfig::default(), &Constants::default())
            .unwrap_err();
        assert_eq!(
            err,
            RunError::Catalog(CatalogError::MissionLocked(MissionId("MRU_02".to_string())))
        );
    }

    #[test]
    fn test_wrong_motion_setup_is_refused() {
        let catalog = default_catalog();
        let mission = catalog.get(&MissionId("CAIDA_01".to_string())).unwrap();
        let err = MissionRun::start(mission, walk(5.0), PhysicsConfig::default(), &Constants::default())
            .unwrap_err();
        assert!(matches!(err, RunError::Setup(SetupError::MotionMismatch { .. })));
    }

    #[test]
    fn test_attempt_mission_with_auto_solver() {
        let mut catalog = default_catalog();
        let id = MissionId("TIRO_01".to_string());
        let (attempt, result) = attempt_mission(
            &mut catalog,
            &id,
            &mut AutoSolver,
            PhysicsConfig::default(),
            &Constants::default(),
        )
        .unwrap()
        .unwrap();
        assert!(attempt.success);
        assert_eq!(attempt.stars, 3);
        assert!(result.final_position >= 10.0);
    }

    #[test]
    fn test_attempt_unknown_mission() {
        let mut catalog = default_catalog();
        let err = attempt_mission(
            &mut catalog,
            &MissionId("NOPE".to_string()),
            &mut AutoSolver,
            PhysicsConfig::default(),
            &Constants::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Catalog(CatalogError::UnknownMission(_))));
    }
}
