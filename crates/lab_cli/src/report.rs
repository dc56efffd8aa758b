//! Terminal output for the lab commands.

use anyhow::Result;
use lab_core::scoring::difficulty_label;
use lab_core::{
    summarize, summarize_by_motion, Attempt, Mission, MissionCatalog, MotionKind, MotionState,
    ProgressSummary, SimulationResult, StopReason,
};
use serde::Serialize;

pub fn print_state(state: &MotionState) {
    println!(
        "t={:>7.3}s  x={:>9.3}m  y={:>9.3}m  vx={:>8.3}m/s  vy={:>8.3}m/s",
        state.time, state.x, state.y, state.vx, state.vy
    );
}

pub fn print_result(result: &SimulationResult, reason: Option<StopReason>, samples: usize) {
    println!("Final time:       {:.3} s", result.final_time);
    println!("Final position:   {:.3} m", result.final_position);
    println!("Average velocity: {:.3} m/s", result.average_velocity);
    if let Some(reason) = reason {
        println!("Stopped by:       {reason:?}");
    }
    if samples > 0 {
        println!("Trajectory:       {samples} samples");
    }
}

fn status(mission: &Mission) -> &'static str {
    if mission.is_completed() {
        "done"
    } else if mission.is_unlocked() {
        "open"
    } else {
        "locked"
    }
}

pub fn mission_line(mission: &Mission) -> String {
    format!(
        "{:<9} {:<24} {:<6} {} {:<9}  best {:>4}  {}",
        mission.id(),
        mission.name(),
        status(mission),
        mission.stars_display(),
        difficulty_label(mission.difficulty()),
        mission.best_score(),
        mission.objective_text(),
    )
}

pub fn print_mission(mission: &Mission, verbose: bool) {
    println!("{}", mission_line(mission));
    if verbose {
        println!("          {}", mission.description());
        for constraint in mission.constraints() {
            println!("          - {constraint}");
        }
        if !mission.is_supported() {
            println!("          (this objective cannot be judged yet)");
        }
    }
}

pub fn attempt_line(attempt: &Attempt) -> String {
    let verdict = if attempt.success { "success" } else { "missed" };
    let precision = attempt
        .precision
        .map(|p| format!(" precision {:.1}%", p * 100.0))
        .unwrap_or_default();
    let best = if attempt.new_best { " (new best)" } else { "" };
    format!(
        "{}: {verdict} {}/3 stars {} pts{precision}{best}",
        attempt.mission_id, attempt.stars, attempt.points
    )
}

pub fn print_attempt(attempt: &Attempt) {
    println!("{}", attempt_line(attempt));
}

pub fn print_summary(summary: &ProgressSummary) {
    println!(
        "{}/{} missions ({:.0}%), {}/{} stars, {} points",
        summary.completed_count,
        summary.total_missions,
        summary.completion_percent(),
        summary.total_stars,
        summary.max_stars,
        summary.total_points
    );
}

#[derive(Serialize)]
struct ProgressReport {
    content_version: String,
    overall: ProgressSummary,
    by_motion: Vec<MotionReport>,
}

#[derive(Serialize)]
struct MotionReport {
    motion: MotionKind,
    #[serde(flatten)]
    summary: ProgressSummary,
}

pub fn print_progress(catalog: &MissionCatalog, json: bool) -> Result<()> {
    let report = ProgressReport {
        content_version: catalog.content_version().to_string(),
        overall: summarize(catalog.missions()),
        by_motion: summarize_by_motion(catalog.missions())
            .into_iter()
            .map(|(motion, summary)| MotionReport { motion, summary })
            .collect(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Content {}", report.content_version);
    print_summary(&report.overall);
    for row in &report.by_motion {
        print!("  {:<16} ", row.motion.label());
        print_summary(&row.summary);
    }
    Ok(())
}
