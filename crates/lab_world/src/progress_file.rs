//! Progress snapshot on disk.

use anyhow::{Context, Result};
use lab_core::{MissionCatalog, ProgressSnapshot};
use std::io::Write;
use std::path::Path;

/// Write the catalog's progress atomically: `.tmp` then rename.
pub fn save_progress(catalog: &MissionCatalog, path: &Path) -> Result<()> {
    let snapshot = catalog.snapshot();
    let json = serde_json::to_string_pretty(&snapshot).context("serializing progress")?;
    let tmp_path = path.with_extension("json.tmp");
    let mut file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("syncing {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} to {}", tmp_path.display(), path.display()))?;
    tracing::debug!(path = %path.display(), "progress saved");
    Ok(())
}

/// `None` when no progress has been saved yet.
pub fn load_progress(path: &Path) -> Result<Option<ProgressSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing progress file {}", path.display()))?;
    Ok(Some(snapshot))
}

/// Merge saved progress into `catalog`. Returns the number of records applied.
pub fn restore_progress(catalog: &mut MissionCatalog, path: &Path) -> Result<usize> {
    let Some(snapshot) = load_progress(path)? else {
        return Ok(0);
    };
    if snapshot.content_version != catalog.content_version() {
        tracing::warn!(
            saved = %snapshot.content_version,
            current = %catalog.content_version(),
            "progress was saved against other content; merging by mission id"
        );
    }
    let unknown = catalog.restore(&snapshot);
    for id in &unknown {
        tracing::warn!(mission = %id, "ignoring progress for unknown mission");
    }
    let applied = snapshot.missions.len() - unknown.len();
    tracing::info!(applied, path = %path.display(), "progress restored");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::test_fixtures::{default_catalog, position_result};
    use lab_core::{MissionId, PhysicsConfig};

    #[test]
    fn test_save_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let mut catalog = default_catalog();
        let id = MissionId("TIRO_01".to_string());
        catalog
            .register_result(&id, &position_result(30.0), &PhysicsConfig::default())
            .unwrap();
        save_progress(&catalog, &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let mut fresh = default_catalog();
        let applied = restore_progress(&mut fresh, &path).unwrap();
        assert_eq!(applied, 15);
        assert!(fresh.get(&id).unwrap().is_completed());
        assert_eq!(
            fresh.get(&id).unwrap().best_score(),
            catalog.get(&id).unwrap().best_score()
        );
    }

    #[test]
    fn test_missing_file_restores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = default_catalog();
        let applied = restore_progress(&mut catalog, &dir.path().join("none.json")).unwrap();
        assert_eq!(applied, 0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_progress(&path).unwrap_err();
        assert!(err.to_string().contains("parsing progress file"));
    }

    #[test]
    fn test_save_failure_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("progress.json");
        let err = save_progress(&default_catalog(), &path).unwrap_err();
        assert!(err.to_string().contains("progress.json.tmp"));
    }
}
