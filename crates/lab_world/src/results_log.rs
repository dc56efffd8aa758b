//! Saved simulation results: a flat JSON list with CSV export.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lab_core::MotionKind;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One saved run. `param_1`/`param_2` are the two headline inputs of the
/// scenario (for example speed and angle for a launch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResult {
    pub motion: MotionKind,
    pub recorded_at: DateTime<Utc>,
    pub param_1: f64,
    pub param_2: f64,
    pub headline_value: f64,
    pub notes: String,
}

impl SavedResult {
    pub fn now(motion: MotionKind, param_1: f64, param_2: f64, headline_value: f64, notes: impl Into<String>) -> Self {
        Self {
            motion,
            recorded_at: Utc::now(),
            param_1,
            param_2,
            headline_value,
            notes: notes.into(),
        }
    }
}

impl std::fmt::Display for SavedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {:.2} | {:.2} | {:.2} | {}",
            self.motion,
            self.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            self.param_1,
            self.param_2,
            self.headline_value,
            self.notes
        )
    }
}

/// CSV row layout with values rounded to two decimals.
#[derive(Serialize)]
struct CsvRow<'a> {
    simulation: &'a str,
    recorded_at: String,
    param_1: String,
    param_2: String,
    result: String,
    notes: &'a str,
}

pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All saved results. A missing or unreadable file counts as empty.
    pub fn load(&self) -> Vec<SavedResult> {
        match self.load_strict() {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "results log unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    /// Like `load`, but an unreadable file is an error.
    pub fn load_strict(&self) -> Result<Vec<SavedResult>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Append one result. Refuses to touch a log it cannot parse, so earlier
    /// results are never overwritten.
    pub fn append(&self, result: SavedResult) -> Result<()> {
        let mut results = self.load_strict().context("results log is unreadable; not appending")?;
        results.push(result);
        self.write(&results)
    }

    pub fn count(&self) -> usize {
        self.load().len()
    }

    /// Remove the log file. Clearing an absent log is not an error.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }

    /// Write every saved result to `out` as CSV. Returns the row count.
    pub fn export_csv(&self, out: &Path) -> Result<usize> {
        let results = self.load();
        let mut writer =
            csv::Writer::from_path(out).with_context(|| format!("creating {}", out.display()))?;
        for result in &results {
            writer.serialize(CsvRow {
                simulation: result.motion.label(),
                recorded_at: result.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                param_1: format!("{:.2}", result.param_1),
                param_2: format!("{:.2}", result.param_2),
                result: format!("{:.2}", result.headline_value),
                notes: &result.notes,
            })?;
        }
        writer.flush().with_context(|| format!("writing {}", out.display()))?;
        Ok(results.len())
    }

    fn write(&self, results: &[SavedResult]) -> Result<()> {
        let json = serde_json::to_string_pretty(results).context("serializing results")?;
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("syncing {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("renaming into {}", self.path.display()))?;
        Ok(())
    }
}
