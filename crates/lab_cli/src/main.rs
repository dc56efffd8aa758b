use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lab_control::{
    attempt_mission, AttemptSource, AutoSolver, MissionRun, NoisySolver, SequentialUnlock,
    SharedCatalog, UnlockPolicy,
};
use lab_core::{
    Constants, DropSetup, LabContent, LaunchSetup, LinearSetup, Mission, MissionCatalog,
    MissionId, MotionKind, PhysicsConfig, Setup, Simulation, SimulationResult, StepOutcome,
};
use lab_world::{
    build_catalog, load_content, restore_progress, save_progress, ResultsLog, SavedResult,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

mod report;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "kinelab", about = "Kinematics lab: free play, missions and progress")]
struct Cli {
    #[arg(long, global = true, default_value = "./content")]
    content_dir: String,
    /// Progress snapshot file.
    #[arg(long, global = true, default_value = "./kinelab_progress.json")]
    progress: PathBuf,
    /// Saved results log.
    #[arg(long, global = true, default_value = "./kinelab_results.json")]
    results: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MotionArg {
    Linear,
    FreeFall,
    Projectile,
}

impl From<MotionArg> for MotionKind {
    fn from(arg: MotionArg) -> Self {
        match arg {
            MotionArg::Linear => MotionKind::LinearMotion,
            MotionArg::FreeFall => MotionKind::FreeFall,
            MotionArg::Projectile => MotionKind::Projectile,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List missions with their unlock state and best score.
    Missions {
        #[arg(long, value_enum)]
        motion: Option<MotionArg>,
        /// Also print descriptions and constraints.
        #[arg(long)]
        verbose: bool,
    },
    /// Run a scenario freely, outside any mission.
    Simulate {
        #[command(subcommand)]
        scenario: Scenario,
        /// Print the state every N ticks.
        #[arg(long, global = true)]
        trace_every: Option<u64>,
        /// Append the outcome to the results log.
        #[arg(long, global = true)]
        save: bool,
        #[arg(long, global = true, default_value = "")]
        notes: String,
    },
    /// Play one mission, by hand or with the solver.
    Attempt {
        mission: String,
        #[command(flatten)]
        controls: Controls,
        /// Let the solver pick the setup.
        #[arg(long)]
        auto: bool,
        /// Relative aim error for --auto, e.g. 0.05.
        #[arg(long, default_value_t = 0.0)]
        jitter: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Let the solver play every motion type in parallel, unlocking as it goes.
    Practice {
        #[arg(long, default_value_t = 0.0)]
        jitter: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 1)]
        rounds: u32,
    },
    /// Show totals.
    Progress {
        #[arg(long)]
        json: bool,
    },
    /// Forget all mission progress.
    Reset,
    /// Manage the saved results log.
    Results {
        #[command(subcommand)]
        action: ResultsAction,
    },
}

#[derive(Subcommand)]
enum Scenario {
    Linear {
        #[arg(long)]
        velocity: f64,
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long)]
        distance: Option<f64>,
        #[arg(long)]
        time_limit: Option<f64>,
    },
    FreeFall {
        #[arg(long)]
        height: f64,
        /// Initial velocity, positive upward.
        #[arg(long, default_value_t = 0.0)]
        velocity: f64,
        #[arg(long)]
        gravity: Option<f64>,
    },
    Projectile {
        #[arg(long)]
        speed: f64,
        /// Degrees above the horizontal.
        #[arg(long)]
        angle: f64,
        #[arg(long, default_value_t = 0.0)]
        height: f64,
        #[arg(long)]
        gravity: Option<f64>,
    },
}

/// Manual controls for `attempt`. Which ones apply depends on the mission.
#[derive(Args)]
struct Controls {
    #[arg(long)]
    velocity: Option<f64>,
    #[arg(long)]
    distance: Option<f64>,
    #[arg(long)]
    time_limit: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    speed: Option<f64>,
    #[arg(long)]
    angle: Option<f64>,
    #[arg(long)]
    gravity: Option<f64>,
}

#[derive(Subcommand)]
enum ResultsAction {
    List,
    Export { out: PathBuf },
    Clear,
}

// ---------------------------------------------------------------------------
// Setups
// ---------------------------------------------------------------------------

impl Scenario {
    fn setup(&self) -> Setup {
        match *self {
            Scenario::Linear {
                velocity,
                start,
                distance,
                time_limit,
            } => Setup::LinearMotion(LinearSetup {
                initial_position: start,
                velocity,
                target_distance: distance,
                time_limit,
            }),
            Scenario::FreeFall {
                height,
                velocity,
                gravity,
            } => Setup::FreeFall(DropSetup {
                initial_height: height,
                initial_velocity: velocity,
                gravity,
            }),
            Scenario::Projectile {
                speed,
                angle,
                height,
                gravity,
            } => Setup::Projectile(LaunchSetup {
                speed,
                angle_deg: angle,
                initial_height: height,
                gravity,
            }),
        }
    }
}

impl Controls {
    fn setup_for(&self, motion: MotionKind) -> Result<Setup> {
        let setup = match motion {
            MotionKind::LinearMotion => Setup::LinearMotion(LinearSetup {
                initial_position: 0.0,
                velocity: self.velocity.context("--velocity is required for this mission")?,
                target_distance: self.distance,
                time_limit: self.time_limit,
            }),
            MotionKind::FreeFall => Setup::FreeFall(DropSetup {
                initial_height: self.height.unwrap_or(0.0),
                initial_velocity: self.velocity.unwrap_or(0.0),
                gravity: self.gravity,
            }),
            MotionKind::Projectile => Setup::Projectile(LaunchSetup {
                speed: self.speed.context("--speed is required for this mission")?,
                angle_deg: self.angle.context("--angle is required for this mission")?,
                initial_height: self.height.unwrap_or(0.0),
                gravity: self.gravity,
            }),
        };
        Ok(setup)
    }
}

/// Plays a setup the player typed in.
struct ManualSetup(Setup);

impl AttemptSource for ManualSetup {
    fn propose_setup(&mut self, _mission: &Mission, _physics: &PhysicsConfig) -> Option<Setup> {
        Some(self.0)
    }
}

/// The two inputs and headline number saved for a free run.
fn result_columns(
    setup: &Setup,
    result: &SimulationResult,
    physics: PhysicsConfig,
) -> (f64, f64, f64) {
    match setup {
        Setup::LinearMotion(linear) => (linear.velocity, result.final_time, result.final_position),
        Setup::FreeFall(drop) => (drop.initial_height, physics.gravity, result.final_time),
        Setup::Projectile(launch) => (launch.speed, launch.angle_deg, result.final_position),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

struct Session {
    content: LabContent,
    catalog: MissionCatalog,
    progress_path: PathBuf,
}

impl Session {
    fn open(content_dir: &str, progress_path: PathBuf) -> Result<Self> {
        let content = load_content(content_dir)?;
        let mut catalog = build_catalog(&content)?;
        restore_progress(&mut catalog, &progress_path)?;
        Ok(Self {
            content,
            catalog,
            progress_path,
        })
    }

    fn save(&self) -> Result<()> {
        save_progress(&self.catalog, &self.progress_path)
    }

    fn physics(&self) -> PhysicsConfig {
        self.content.constants.default_physics()
    }
}

fn simulate(
    content_dir: &str,
    results: &ResultsLog,
    scenario: &Scenario,
    trace_every: Option<u64>,
    save: bool,
    notes: &str,
) -> Result<()> {
    let content = load_content(content_dir)?;
    let constants = &content.constants;
    let setup = scenario.setup();
    let mut simulation =
        Simulation::new(setup, constants.default_physics(), constants).context("invalid setup")?;

    simulation.start();
    let mut ticks: u64 = 0;
    let result = loop {
        ticks += 1;
        match simulation.step() {
            StepOutcome::Finished(result) => break result,
            StepOutcome::Running => {
                if trace_every.is_some_and(|every| every > 0 && ticks % every == 0) {
                    report::print_state(&simulation.state());
                }
            }
            StepOutcome::Paused | StepOutcome::Idle => bail!("simulation stalled"),
        }
    };

    report::print_result(&result, simulation.stop_reason(), simulation.trajectory().len());
    if save {
        let physics = simulation.physics();
        let (param_1, param_2, headline) = result_columns(&setup, &result, physics);
        results.append(SavedResult::now(setup.motion(), param_1, param_2, headline, notes))?;
        println!("saved ({} results in log)", results.count());
    }
    Ok(())
}

fn attempt(
    mut session: Session,
    mission: &str,
    controls: &Controls,
    auto: bool,
    jitter: f64,
    seed: u64,
) -> Result<()> {
    check_jitter(jitter)?;
    let id = MissionId(mission.to_string());
    let physics = session.physics();
    let constants = session.content.constants.clone();
    let motion = session.catalog.get(&id)?.motion();
    report::print_mission(session.catalog.get(&id)?, true);

    let outcome = if auto && jitter > 0.0 {
        let mut solver = NoisySolver::new(ChaCha8Rng::seed_from_u64(seed), jitter)?;
        attempt_mission(&mut session.catalog, &id, &mut solver, physics, &constants)?
    } else if auto {
        attempt_mission(&mut session.catalog, &id, &mut AutoSolver, physics, &constants)?
    } else {
        let mut manual = ManualSetup(controls.setup_for(motion)?);
        attempt_mission(&mut session.catalog, &id, &mut manual, physics, &constants)?
    };
    let Some((attempt, result)) = outcome else {
        println!("The solver cannot play this mission.");
        return Ok(());
    };

    report::print_result(&result, None, 0);
    report::print_attempt(&attempt);
    for unlocked in SequentialUnlock.apply(&mut session.catalog, &attempt) {
        println!("Unlocked {unlocked}");
    }
    session.save()
}

fn practice_motion(
    shared: &SharedCatalog,
    motion: MotionKind,
    solver: &mut impl AttemptSource,
    physics: PhysicsConfig,
    constants: &Constants,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut sink = shared;
    let ids: Vec<MissionId> = shared
        .order()
        .iter()
        .filter(|entry| entry.motion == motion)
        .map(|entry| entry.id.clone())
        .collect();
    for id in ids {
        let run = shared.with_mission(&id, |mission| {
            if !mission.is_unlocked() {
                return None;
            }
            solver
                .propose_setup(mission, &physics)
                .map(|setup| MissionRun::start(mission, setup, physics, constants))
        })?;
        let Some(run) = run else {
            lines.push(format!("{id}: skipped"));
            continue;
        };
        let mut run = run?;
        let Some(attempt) = run.run_to_end(&mut sink)? else {
            continue;
        };
        lines.push(report::attempt_line(&attempt));
        shared.apply_policy(&SequentialUnlock, &attempt);
    }
    Ok(lines)
}

fn check_jitter(jitter: f64) -> Result<()> {
    ensure!(
        jitter.is_finite() && (0.0..=1.0).contains(&jitter),
        "--jitter must be between 0 and 1 (got {jitter})"
    );
    Ok(())
}

fn practice(session: Session, jitter: f64, seed: u64, rounds: u32) -> Result<()> {
    check_jitter(jitter)?;
    let physics = session.physics();
    let constants = session.content.constants.clone();
    let progress_path = session.progress_path.clone();
    let shared = SharedCatalog::new(session.catalog);

    for round in 1..=rounds {
        println!("--- round {round} ---");
        let outputs: Vec<Result<Vec<String>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = MotionKind::ALL
                .into_iter()
                .zip(0_u64..)
                .map(|(motion, index)| {
                    let shared = &shared;
                    let constants = &constants;
                    let thread_seed = seed
                        .wrapping_add(u64::from(round) * 1000)
                        .wrapping_add(index);
                    scope.spawn(move || {
                        let rng = ChaCha8Rng::seed_from_u64(thread_seed);
                        let mut solver = NoisySolver::new(rng, jitter)?;
                        practice_motion(shared, motion, &mut solver, physics, constants)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(anyhow::anyhow!("practice thread panicked")))
                })
                .collect()
        });
        for lines in outputs {
            for line in lines? {
                println!("{line}");
            }
        }
    }

    report::print_summary(&shared.summary());
    let catalog = shared.into_catalog()?;
    save_progress(&catalog, &progress_path)
}

fn results_command(results: &ResultsLog, action: &ResultsAction) -> Result<()> {
    match action {
        ResultsAction::List => {
            let saved = results.load();
            if saved.is_empty() {
                println!("No saved results.");
            }
            for (index, result) in saved.iter().enumerate() {
                println!("{:>3}. {result}", index + 1);
            }
        }
        ResultsAction::Export { out } => {
            let rows = results.export_csv(out)?;
            println!("exported {rows} results to {}", out.display());
        }
        ResultsAction::Clear => {
            results.clear()?;
            println!("results log cleared");
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    tracing::debug!(content_dir = %cli.content_dir, progress = %cli.progress.display(), "lab cli starting");
    let results = ResultsLog::new(&cli.results);
    match cli.command {
        Commands::Missions { motion, verbose } => {
            let session = Session::open(&cli.content_dir, cli.progress)?;
            let filter = motion.map(MotionKind::from);
            for mission in session.catalog.missions() {
                if filter.map_or(true, |m| m == mission.motion()) {
                    report::print_mission(mission, verbose);
                }
            }
        }
        Commands::Simulate {
            scenario,
            trace_every,
            save,
            notes,
        } => simulate(&cli.content_dir, &results, &scenario, trace_every, save, &notes)?,
        Commands::Attempt {
            mission,
            controls,
            auto,
            jitter,
            seed,
        } => {
            let session = Session::open(&cli.content_dir, cli.progress)?;
            attempt(session, &mission, &controls, auto, jitter, seed)?;
        }
        Commands::Practice {
            jitter,
            seed,
            rounds,
        } => practice(Session::open(&cli.content_dir, cli.progress)?, jitter, seed, rounds)?,
        Commands::Progress { json } => {
            let session = Session::open(&cli.content_dir, cli.progress)?;
            report::print_progress(&session.catalog, json)?;
        }
        Commands::Reset => {
            let mut session = Session::open(&cli.content_dir, cli.progress)?;
            session.catalog.reset_progress();
            session.save()?;
            println!("progress reset");
        }
        Commands::Results { action } => results_command(&results, &action)?,
    }
    Ok(())
}
