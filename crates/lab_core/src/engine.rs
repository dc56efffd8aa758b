//! Simulation clock and the three scenario runs.
//!
//! A run advances a fixed-interval clock. Positions come from the closed-form
//! formulas, never from integration, so the stop time of every scenario is
//! known up front and the result is reported at the exact event time rather
//! than at the first tick past it.

use serde::{Deserialize, Serialize};

use crate::kinematics::{
    apex_height, degrees_to_radians, linear_position, projectile_position, time_to_ground,
    vertical_position, vertical_velocity,
};
use crate::{Constants, MotionKind, PhysicsConfig, SetupError, SimulationResult};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    elapsed: f64,
    dt: f64,
    running: bool,
}

impl SimClock {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            elapsed: 0.0,
            dt: f64::from(interval_ms) / 1000.0,
            running: false,
        }
    }

    pub fn set_interval_ms(&mut self, interval_ms: u32) {
        self.dt = f64::from(interval_ms) / 1000.0;
    }

    /// Zero the elapsed time and start running.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.running = false;
    }

    /// Advance by one interval. Returns false (and does nothing) when not running.
    pub fn advance(&mut self) -> bool {
        if self.running {
            self.elapsed += self.dt;
        }
        self.running
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

// ---------------------------------------------------------------------------
// Setups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSetup {
    pub initial_position: f64,
    pub velocity: f64,
    /// Stop once the body has covered this distance from its start.
    pub target_distance: Option<f64>,
    /// Stop at this time. Zero means no limit.
    pub time_limit: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropSetup {
    pub initial_height: f64,
    /// Positive is upward.
    pub initial_velocity: f64,
    /// Overrides the configured gravity for this run.
    pub gravity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchSetup {
    pub speed: f64,
    pub angle_deg: f64,
    pub initial_height: f64,
    pub gravity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "motion")]
pub enum Setup {
    LinearMotion(LinearSetup),
    FreeFall(DropSetup),
    Projectile(LaunchSetup),
}

impl Setup {
    pub fn motion(&self) -> MotionKind {
        match self {
            Setup::LinearMotion(_) => MotionKind::LinearMotion,
            Setup::FreeFall(_) => MotionKind::FreeFall,
            Setup::Projectile(_) => MotionKind::Projectile,
        }
    }

    /// Physics for this run: `base` with the setup's gravity override applied.
    pub fn physics(&self, base: PhysicsConfig) -> PhysicsConfig {
        let gravity_override = match self {
            Setup::LinearMotion(_) => None,
            Setup::FreeFall(drop) => drop.gravity,
            Setup::Projectile(launch) => launch.gravity,
        };
        gravity_override.map_or(base, PhysicsConfig::with_gravity)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        match self {
            Setup::LinearMotion(linear) => {
                finite("initial_position", linear.initial_position)?;
                finite("velocity", linear.velocity)?;
                if let Some(distance) = linear.target_distance {
                    non_negative("target_distance", distance)?;
                }
                if let Some(limit) = linear.time_limit {
                    non_negative("time_limit", limit)?;
                }
            }
            Setup::FreeFall(drop) => {
                non_negative("initial_height", drop.initial_height)?;
                finite("initial_velocity", drop.initial_velocity)?;
                if let Some(g) = drop.gravity {
                    positive_gravity(g)?;
                }
            }
            Setup::Projectile(launch) => {
                non_negative("speed", launch.speed)?;
                non_negative("initial_height", launch.initial_height)?;
                finite("angle_deg", launch.angle_deg)?;
                if !(0.0..=90.0).contains(&launch.angle_deg) {
                    return Err(SetupError::AngleOutOfRange(launch.angle_deg));
                }
                if let Some(g) = launch.gravity {
                    positive_gravity(g)?;
                }
            }
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), SetupError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SetupError::NonFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SetupError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(SetupError::Negative { field, value });
    }
    Ok(())
}

fn positive_gravity(gravity: f64) -> Result<(), SetupError> {
    if gravity.is_finite() && gravity > 0.0 {
        Ok(())
    } else {
        Err(SetupError::NonPositiveGravity(gravity))
    }
}

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    TargetReached,
    TimeLimit,
    GroundImpact,
    Timeout,
    Manual,
}

/// Kinematic state at the current time. `x` is horizontal, `y` is height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The clock advanced and the run continues.
    Running,
    /// The clock is paused or not started; nothing changed.
    Paused,
    /// The run ended on this step. Returned exactly once per run.
    Finished(SimulationResult),
    /// The run had already finished.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    setup: Setup,
    physics: PhysicsConfig,
    clock: SimClock,
    /// Earliest scheduled stop: (time, reason).
    stop_at: (f64, StopReason),
    max_samples: usize,
    state: MotionState,
    trajectory: Vec<Sample>,
    stop_reason: Option<StopReason>,
    result: Option<SimulationResult>,
    finalized: bool,
}

impl Simulation {
    pub fn new(
        setup: Setup,
        base_physics: PhysicsConfig,
        constants: &Constants,
    ) -> Result<Self, SetupError> {
        setup.validate()?;
        if constants.tick_interval_ms == 0 {
            return Err(SetupError::ZeroInterval);
        }
        let physics = setup.physics(base_physics);
        positive_gravity(physics.gravity)?;
        non_negative("max_run_seconds", constants.max_run_seconds)?;

        let stop_at = scheduled_stop(&setup, physics.gravity, constants.max_run_seconds);
        let mut simulation = Self {
            setup,
            physics,
            clock: SimClock::new(constants.tick_interval_ms),
            stop_at,
            max_samples: constants.max_trajectory_samples,
            state: MotionState::default(),
            trajectory: Vec::new(),
            stop_reason: None,
            result: None,
            finalized: false,
        };
        simulation.rewind();
        Ok(simulation)
    }

    /// Start (or restart) the clock from zero.
    pub fn start(&mut self) {
        if self.finalized {
            return;
        }
        self.rewind();
        self.clock.start();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        if !self.finalized {
            self.clock.resume();
        }
    }

    /// Advance one tick and apply the scenario's stop conditions.
    pub fn step(&mut self) -> StepOutcome {
        if self.finalized {
            return StepOutcome::Idle;
        }
        if !self.clock.advance() {
            return StepOutcome::Paused;
        }
        let (stop_time, reason) = self.stop_at;
        let t = self.clock.elapsed();
        if t >= stop_time {
            self.state = self.state_at(stop_time, Some(reason));
            self.record_sample();
            return StepOutcome::Finished(self.finalize(reason));
        }
        self.state = self.state_at(t, None);
        self.record_sample();
        StepOutcome::Running
    }

    /// End the run where it stands. Returns the result only if this call
    /// concluded the run.
    pub fn stop(&mut self) -> Option<SimulationResult> {
        if self.finalized {
            return None;
        }
        Some(self.finalize(StopReason::Manual))
    }

    /// Clear the finished run so the same setup can be played again.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.finalized = false;
        self.result = None;
        self.stop_reason = None;
        self.rewind();
    }

    /// Start if needed and step until the run finishes.
    pub fn run_to_end(&mut self) -> SimulationResult {
        if let Some(result) = self.result {
            return result;
        }
        if !self.clock.is_running() {
            self.clock.resume();
        }
        loop {
            if let StepOutcome::Finished(result) = self.step() {
                return result;
            }
        }
    }

    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    pub fn physics(&self) -> PhysicsConfig {
        self.physics
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn trajectory(&self) -> &[Sample] {
        &self.trajectory
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn result(&self) -> Option<SimulationResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.finalized
    }

    fn rewind(&mut self) {
        self.state = self.state_at(0.0, None);
        self.trajectory.clear();
        self.record_sample();
    }

    fn record_sample(&mut self) {
        if self.trajectory.len() < self.max_samples {
            self.trajectory.push(Sample {
                t: self.state.time,
                x: self.state.x,
                y: self.state.y,
            });
        }
    }

    fn finalize(&mut self, reason: StopReason) -> SimulationResult {
        self.clock.stop();
        self.finalized = true;
        self.stop_reason = Some(reason);
        let result = self.build_result();
        self.result = Some(result);
        result
    }

    fn state_at(&self, t: f64, reason: Option<StopReason>) -> MotionState {
        let g = self.physics.gravity;
        let on_ground = reason == Some(StopReason::GroundImpact);
        match self.setup {
            Setup::LinearMotion(linear) => MotionState {
                time: t,
                x: linear_position(linear.initial_position, linear.velocity, t),
                y: 0.0,
                vx: linear.velocity,
                vy: 0.0,
            },
            Setup::FreeFall(drop) => {
                if on_ground {
                    MotionState {
                        time: t,
                        ..MotionState::default()
                    }
                } else {
                    MotionState {
                        time: t,
                        x: 0.0,
                        y: vertical_position(drop.initial_height, drop.initial_velocity, g, t),
                        vx: 0.0,
                        vy: vertical_velocity(drop.initial_velocity, g, t),
                    }
                }
            }
            Setup::Projectile(launch) => {
                let angle = degrees_to_radians(launch.angle_deg);
                let (x, y) = projectile_position(launch.speed, angle, launch.initial_height, g, t);
                MotionState {
                    time: t,
                    x,
                    y: if on_ground { 0.0 } else { y },
                    vx: launch.speed * angle.cos(),
                    vy: vertical_velocity(launch.speed * angle.sin(), g, t),
                }
            }
        }
    }

    fn build_result(&self) -> SimulationResult {
        let t = self.state.time;
        let divisor = if t > 0.0 { t } else { 1.0 };
        match self.setup {
            Setup::LinearMotion(linear) => SimulationResult::new(
                t,
                self.state.x,
                (self.state.x - linear.initial_position) / divisor,
            ),
            Setup::FreeFall(drop) => {
                let g = self.physics.gravity;
                // Highest point reached so far: the apex if it has passed.
                let apex_time = (drop.initial_velocity / g).max(0.0);
                let peak = if t >= apex_time {
                    apex_height(drop.initial_height, drop.initial_velocity, g)
                } else {
                    vertical_position(drop.initial_height, drop.initial_velocity, g, t)
                };
                SimulationResult::new(t, peak, (self.state.y - drop.initial_height) / divisor)
            }
            Setup::Projectile(_) => SimulationResult::new(t, self.state.x, self.state.x / divisor),
        }
    }
}

/// Earliest stop event for a setup. Ties keep the first candidate.
fn scheduled_stop(setup: &Setup, gravity: f64, max_run_seconds: f64) -> (f64, StopReason) {
    let mut candidates: Vec<(f64, StopReason)> = Vec::new();
    match setup {
        Setup::LinearMotion(linear) => {
            if let Some(distance) = linear.target_distance {
                if distance <= 0.0 {
                    candidates.push((0.0, StopReason::TargetReached));
                } else if linear.velocity > 0.0 {
                    candidates.push((distance / linear.velocity, StopReason::TargetReached));
                }
            }
            if let Some(limit) = linear.time_limit.filter(|limit| *limit > 0.0) {
                candidates.push((limit, StopReason::TimeLimit));
            }
        }
        Setup::FreeFall(drop) => {
            if let Some(t) = time_to_ground(drop.initial_height, drop.initial_velocity, gravity) {
                candidates.push((t, StopReason::GroundImpact));
            }
        }
        Setup::Projectile(launch) => {
            let vy = launch.speed * degrees_to_radians(launch.angle_deg).sin();
            if let Some(t) = time_to_ground(launch.initial_height, vy, gravity) {
                candidates.push((t, StopReason::GroundImpact));
            }
        }
    }
    candidates.push((max_run_seconds, StopReason::Timeout));
    candidates
        .into_iter()
        .fold(None, |earliest: Option<(f64, StopReason)>, candidate| match earliest {
            Some(current) if current.0 <= candidate.0 => Some(current),
            _ => Some(candidate),
        })
        .unwrap_or((max_run_seconds, StopReason::Timeout))
}
