//! Content loading and on-disk state shared by lab_cli and lab_control tests.
//!
//! The content directory holds `constants.json` plus one mission file per
//! motion type. Progress snapshots and the saved results log live next to
//! the player, not in content.

use anyhow::{ensure, Context, Result};
use lab_core::{Constants, LabContent, MissionCatalog, MissionDef, MotionKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

mod progress_file;
mod results_log;

pub use progress_file::{load_progress, restore_progress, save_progress};
pub use results_log::{ResultsLog, SavedResult};

#[derive(Deserialize)]
struct ConstantsFile {
    content_version: String,
    #[serde(flatten)]
    constants: Constants,
}

#[derive(Deserialize)]
struct MissionsFile {
    motion: MotionKind,
    missions: Vec<MissionDef>,
}

/// Mission files in catalog order.
const MISSION_FILES: [(&str, MotionKind); 3] = [
    ("missions_linear.json", MotionKind::LinearMotion),
    ("missions_free_fall.json", MotionKind::FreeFall),
    ("missions_projectile.json", MotionKind::Projectile),
];

/// Longest run the content may allow, in simulated seconds.
const MAX_RUN_SECONDS_CAP: f64 = 3600.0;

/// Range and cross-reference checks on loaded content.
///
/// Catches mistakes like a mission filed under the wrong motion type, a
/// duplicated id, or a zero tick interval.
pub fn validate_content(content: &LabContent) -> Result<()> {
    let c = &content.constants;
    ensure!(
        c.default_gravity.is_finite() && c.default_gravity > 0.0,
        "constants.default_gravity must be > 0 (got {})",
        c.default_gravity
    );
    ensure!(c.tick_interval_ms > 0, "constants.tick_interval_ms must be > 0");
    ensure!(
        c.max_run_seconds.is_finite()
            && c.max_run_seconds > 0.0
            && c.max_run_seconds <= MAX_RUN_SECONDS_CAP,
        "constants.max_run_seconds must be in (0, {MAX_RUN_SECONDS_CAP}] (got {})",
        c.max_run_seconds
    );
    ensure!(
        c.max_trajectory_samples > 0,
        "constants.max_trajectory_samples must be > 0"
    );

    let motions: HashSet<MotionKind> = content.missions.iter().map(|m| m.kind.motion()).collect();
    for motion in MotionKind::ALL {
        ensure!(
            motions.contains(&motion),
            "no missions defined for motion type {motion}"
        );
    }

    // Definition-level checks (ids, difficulty, tolerance, limits).
    MissionCatalog::from_defs(content.content_version.clone(), content.missions.clone())
        .context("mission definitions are invalid")?;
    Ok(())
}

pub fn load_content(content_dir: &str) -> Result<LabContent> {
    let dir = Path::new(content_dir);
    let constants_file: ConstantsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;

    let mut missions = Vec::new();
    for (file_name, motion) in MISSION_FILES {
        let file: MissionsFile = serde_json::from_str(
            &std::fs::read_to_string(dir.join(file_name))
                .with_context(|| format!("reading {file_name}"))?,
        )
        .with_context(|| format!("parsing {file_name}"))?;
        ensure!(
            file.motion == motion,
            "{file_name} declares motion {} but should hold {motion}",
            file.motion
        );
        for def in &file.missions {
            ensure!(
                def.kind.motion() == motion,
                "{file_name}: mission '{}' is a {} mission",
                def.id,
                def.kind.motion()
            );
        }
        missions.extend(file.missions);
    }

    let content = LabContent {
        content_version: constants_file.content_version,
        constants: constants_file.constants,
        missions,
    };
    validate_content(&content)?;
    tracing::info!(
        content_version = %content.content_version,
        missions = content.missions.len(),
        "content loaded"
    );
    Ok(content)
}

/// Fresh catalog for a session: first mission of each motion unlocked.
pub fn build_catalog(content: &LabContent) -> Result<MissionCatalog> {
    MissionCatalog::from_defs(content.content_version.clone(), content.missions.clone())
        .context("building mission catalog")
}
