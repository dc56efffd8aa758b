//! Missions: one evaluation rule per motion × objective tag.

use crate::engine::Setup;
use crate::scoring::{
    base_points, calculate_precision, points_for_stars, stars_display, stars_for_precision,
};
use crate::{
    Attempt, CatalogError, FreeFallObjective, LinearObjective, MissionDef, MissionId, MissionKind,
    MissionProgress, MotionKind, PhysicsConfig, ProgressRecord, ProjectileObjective,
    ScenarioLimits, SetupError, SimulationResult,
};

/// Quantity a mission reads from a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    FinalPosition,
    FinalTime,
    AverageVelocity,
    /// The gravity the run was configured with.
    Gravity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `|value - target| <= tolerance`
    Within,
    /// `value <= target`
    AtMost,
    /// `value >= target`
    AtLeast,
}

/// Quantity and comparison for a mission kind. `None` for objectives that
/// cannot be judged from a `SimulationResult`; those never succeed.
pub fn evaluation_rule(kind: MissionKind) -> Option<(Quantity, Comparison)> {
    use Comparison::{AtLeast, AtMost, Within};
    use Quantity::{AverageVelocity, FinalPosition, FinalTime, Gravity};

    match kind {
        MissionKind::LinearMotion(objective) => Some(match objective {
            LinearObjective::ReachDistance | LinearObjective::HighPrecision => {
                (FinalPosition, Within)
            }
            LinearObjective::ExactTime => (FinalTime, Within),
            LinearObjective::ExactSpeed => (AverageVelocity, Within),
            LinearObjective::RaceAgainstClock => (FinalTime, AtMost),
        }),
        MissionKind::FreeFall(objective) => match objective {
            FreeFallObjective::SimpleDrop | FreeFallObjective::LaunchUpward => {
                Some((FinalPosition, Within))
            }
            FreeFallObjective::DifferentGravity => Some((Gravity, Within)),
            FreeFallObjective::PredictTime => Some((FinalTime, Within)),
            FreeFallObjective::EnergyConserved => None,
        },
        MissionKind::Projectile(objective) => match objective {
            ProjectileObjective::SimpleLaunch => Some((FinalPosition, AtLeast)),
            ProjectileObjective::FixedTarget | ProjectileObjective::LimitedShot => {
                Some((FinalPosition, Within))
            }
            ProjectileObjective::OptimalAngle | ProjectileObjective::MultipleTargets => None,
        },
    }
}

fn read_quantity(quantity: Quantity, result: &SimulationResult, physics: &PhysicsConfig) -> f64 {
    match quantity {
        Quantity::FinalPosition => result.final_position,
        Quantity::FinalTime => result.final_time,
        Quantity::AverageVelocity => result.average_velocity,
        Quantity::Gravity => physics.gravity,
    }
}

#[derive(Debug, Clone)]
pub struct Mission {
    def: MissionDef,
    objective_text: String,
    constraints: Vec<String>,
    progress: MissionProgress,
}

impl Mission {
    /// Build a mission from its definition, starting locked or unlocked.
    pub fn from_def(def: MissionDef, unlocked: bool) -> Result<Self, CatalogError> {
        validate_def(&def)?;
        let (objective_text, constraints) = describe(&def);
        Ok(Self {
            def,
            objective_text,
            constraints,
            progress: MissionProgress {
                unlocked,
                ..MissionProgress::default()
            },
        })
    }

    pub fn def(&self) -> &MissionDef {
        &self.def
    }

    pub fn id(&self) -> &MissionId {
        &self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    pub fn difficulty(&self) -> u8 {
        self.def.difficulty
    }

    pub fn kind(&self) -> MissionKind {
        self.def.kind
    }

    pub fn motion(&self) -> MotionKind {
        self.def.kind.motion()
    }

    pub fn target_value(&self) -> f64 {
        self.def.target_value
    }

    pub fn tolerance(&self) -> f64 {
        self.def.tolerance
    }

    pub fn limits(&self) -> &ScenarioLimits {
        &self.def.limits
    }

    pub fn objective_text(&self) -> &str {
        &self.objective_text
    }

    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    pub fn progress(&self) -> &MissionProgress {
        &self.progress
    }

    pub fn is_unlocked(&self) -> bool {
        self.progress.unlocked
    }

    pub fn is_completed(&self) -> bool {
        self.progress.completed
    }

    pub fn stars_earned(&self) -> u8 {
        self.progress.stars_earned
    }

    pub fn best_score(&self) -> u32 {
        self.progress.best_score
    }

    pub fn base_points(&self) -> u32 {
        base_points(self.def.difficulty)
    }

    pub fn stars_display(&self) -> String {
        stars_display(self.progress.stars_earned)
    }

    pub fn is_supported(&self) -> bool {
        evaluation_rule(self.def.kind).is_some()
    }

    pub fn unlock(&mut self) {
        self.progress.unlocked = true;
    }

    /// The value this mission scores, or `None` for unsupported objectives.
    pub fn observed_value(&self, result: &SimulationResult, physics: &PhysicsConfig) -> Option<f64> {
        evaluation_rule(self.def.kind).map(|(quantity, _)| read_quantity(quantity, result, physics))
    }

    /// Whether `result` meets the objective. Pure.
    pub fn evaluate(&self, result: &SimulationResult, physics: &PhysicsConfig) -> bool {
        let Some((quantity, comparison)) = evaluation_rule(self.def.kind) else {
            return false;
        };
        let value = read_quantity(quantity, result, physics);
        let target = self.def.target_value;
        match comparison {
            Comparison::Within => (value - target).abs() <= self.def.tolerance,
            Comparison::AtMost => value <= target,
            Comparison::AtLeast => value >= target,
        }
    }

    /// Score a finished run and fold it into the stored progress.
    ///
    /// A failed evaluation leaves progress untouched. A success marks the
    /// mission completed even when precision earns no stars.
    pub fn register_result(&mut self, result: &SimulationResult, physics: &PhysicsConfig) -> Attempt {
        let success = self.evaluate(result, physics);
        let mut attempt = Attempt {
            mission_id: self.def.id.clone(),
            success,
            precision: None,
            stars: 0,
            points: 0,
            new_best: false,
        };
        if !success {
            return attempt;
        }
        let Some(value) = self.observed_value(result, physics) else {
            return attempt;
        };

        let precision = calculate_precision(value, self.def.target_value, self.def.tolerance);
        let stars = stars_for_precision(precision);
        let points = points_for_stars(self.base_points(), stars);

        let progress = &mut self.progress;
        attempt.new_best = !progress.completed
            || stars > progress.stars_earned
            || points > progress.best_score;
        progress.completed = true;
        progress.stars_earned = progress.stars_earned.max(stars);
        progress.best_score = progress.best_score.max(points);

        attempt.precision = Some(precision);
        attempt.stars = stars;
        attempt.points = points;
        attempt
    }

    /// Pin the scenario parameters this mission fixes. Fails if the setup is
    /// for another motion type.
    pub fn apply_to(&self, setup: Setup) -> Result<Setup, SetupError> {
        let limits = &self.def.limits;
        match (setup, self.def.kind) {
            (Setup::LinearMotion(mut linear), MissionKind::LinearMotion(objective)) => {
                linear.initial_position = 0.0;
                match objective {
                    // Judged on where the run ends; the player's time limit
                    // decides when that is.
                    LinearObjective::ReachDistance | LinearObjective::HighPrecision => {
                        linear.target_distance = None;
                    }
                    // Judged on when the distance is covered.
                    LinearObjective::ExactTime | LinearObjective::RaceAgainstClock => {
                        linear.target_distance = limits.distance_m.or(linear.target_distance);
                        linear.time_limit = None;
                    }
                    LinearObjective::ExactSpeed => {
                        linear.target_distance = limits.distance_m.or(linear.target_distance);
                    }
                }
                Ok(Setup::LinearMotion(linear))
            }
            (Setup::FreeFall(mut drop), MissionKind::FreeFall(objective)) => {
                if let Some(height) = limits.drop_height_m {
                    drop.initial_height = height;
                    drop.initial_velocity = 0.0;
                }
                if objective != FreeFallObjective::DifferentGravity {
                    drop.gravity = None;
                }
                Ok(Setup::FreeFall(drop))
            }
            (Setup::Projectile(mut launch), MissionKind::Projectile(_)) => {
                if let Some(speed) = limits.launch_speed_m_s {
                    launch.speed = speed;
                }
                if let Some(cap) = limits.max_launch_speed_m_s {
                    launch.speed = launch.speed.min(cap);
                }
                launch.gravity = None;
                Ok(Setup::Projectile(launch))
            }
            (other, kind) => Err(SetupError::MotionMismatch {
                expected: kind.motion(),
                got: other.motion(),
            }),
        }
    }

    pub fn record(&self) -> ProgressRecord {
        ProgressRecord {
            id: self.def.id.clone(),
            unlocked: self.progress.unlocked,
            completed: self.progress.completed,
            stars_earned: self.progress.stars_earned,
            best_score: self.progress.best_score,
        }
    }

    /// Merge a stored record. Never lowers stars or best score and never
    /// relocks. Stars and score only count from a completed record.
    pub fn restore(&mut self, record: &ProgressRecord) {
        let progress = &mut self.progress;
        progress.unlocked |= record.unlocked;
        if !record.completed {
            return;
        }
        progress.completed = true;
        progress.stars_earned = progress
            .stars_earned
            .max(record.stars_earned.min(crate::scoring::MAX_STARS));
        progress.best_score = progress.best_score.max(record.best_score);
    }

    /// Back to a fresh state.
    pub fn reset_progress(&mut self, unlocked: bool) {
        self.progress = MissionProgress {
            unlocked,
            ..MissionProgress::default()
        };
    }
}

fn validate_def(def: &MissionDef) -> Result<(), CatalogError> {
    if def.id.0.trim().is_empty() {
        return Err(CatalogError::EmptyId);
    }
    if !(1..=5).contains(&def.difficulty) {
        return Err(CatalogError::InvalidDifficulty {
            id: def.id.clone(),
            difficulty: def.difficulty,
        });
    }
    if !def.tolerance.is_finite() || def.tolerance < 0.0 {
        return Err(CatalogError::InvalidTolerance {
            id: def.id.clone(),
            tolerance: def.tolerance,
        });
    }
    if !def.target_value.is_finite() {
        return Err(CatalogError::NonFiniteTarget { id: def.id.clone() });
    }
    let limits = [
        ("distance_m", def.limits.distance_m),
        ("drop_height_m", def.limits.drop_height_m),
        ("launch_speed_m_s", def.limits.launch_speed_m_s),
        ("max_launch_speed_m_s", def.limits.max_launch_speed_m_s),
    ];
    for (field, value) in limits {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::InvalidLimit {
                    id: def.id.clone(),
                    field,
                });
            }
        }
    }
    Ok(())
}

/// Objective line and constraint bullets shown to the player.
fn describe(def: &MissionDef) -> (String, Vec<String>) {
    let target = def.target_value;
    let tolerance = def.tolerance;
    let (objective, constraints): (String, &[&str]) = match def.kind {
        MissionKind::LinearMotion(objective) => match objective {
            LinearObjective::ReachDistance => (
                format!("Reach exactly {target} m"),
                &["Any speed is allowed", "Stop as close to the goal as you can"],
            ),
            LinearObjective::ExactTime => (
                format!("Finish in exactly {target} s"),
                &["Pick the speed carefully", "Watch the clock"],
            ),
            LinearObjective::ExactSpeed => (
                format!("Move at {target} m/s"),
                &["The exact speed is required", "Reach the goal at that speed"],
            ),
            LinearObjective::HighPrecision => (
                format!("Extreme precision: ±{tolerance} m"),
                &["Very small margin of error", "Work it out before you run"],
            ),
            LinearObjective::RaceAgainstClock => (
                format!("Finish in under {target} s"),
                &["A minimum speed is required", "Race the clock"],
            ),
        },
        MissionKind::FreeFall(objective) => match objective {
            FreeFallObjective::SimpleDrop => (
                format!("Drop from {target} m"),
                &["Watch how it accelerates", "Note the fall time"],
            ),
            FreeFallObjective::DifferentGravity => (
                format!("Fall with gravity {target} m/s²"),
                &["Change the gravity", "Compare with Earth"],
            ),
            FreeFallObjective::PredictTime => (
                format!("The object lands in {target} s"),
                &["Use t = √(2h/g)", "Predict before you run"],
            ),
            FreeFallObjective::EnergyConserved => (
                format!("Energy ratio of {target}"),
                &["Potential energy becomes kinetic", "Total energy is conserved"],
            ),
            FreeFallObjective::LaunchUpward => (
                format!("Reach a height of {target} m"),
                &["Launch with an upward velocity", "Use v² = v0² - 2gh"],
            ),
        },
        MissionKind::Projectile(objective) => match objective {
            ProjectileObjective::SimpleLaunch => (
                format!("Reach {target} m"),
                &["Any angle is allowed", "Any speed is allowed"],
            ),
            ProjectileObjective::FixedTarget => (
                format!("Hit the target at {target} m (±{tolerance} m)"),
                &["Fine tune the angle and speed", "Precision matters"],
            ),
            ProjectileObjective::OptimalAngle => (
                format!("Use a {target}° angle"),
                &["Find the angle with the longest range", "Keep the speed fixed"],
            ),
            ProjectileObjective::MultipleTargets => (
                format!("Hit {target} targets"),
                &["Several consecutive shots", "Every target counts"],
            ),
            ProjectileObjective::LimitedShot => (
                format!("Reach {target} m with little speed"),
                &["Limited maximum speed", "Make the most of the angle"],
            ),
        },
    };
    (
        objective,
        constraints.iter().map(|line| (*line).to_string()).collect(),
    )
}
