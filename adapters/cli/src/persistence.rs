//! Save files: the grid snapshot written as pretty-printed JSON.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use loaf_core::GridSnapshot;
use tracing::{info, warn};

/// Writes the snapshot, creating parent directories as needed.
pub(crate) fn write_snapshot(path: &Path, snapshot: &GridSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create save directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(snapshot).context("failed to encode save file")?;
    fs::write(path, json).with_context(|| format!("failed to write save file {}", path.display()))
}

/// Reads a snapshot; `Ok(None)` when no save exists yet.
pub(crate) fn read_snapshot(path: &Path) -> Result<Option<GridSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read save file {}", path.display()))?;
    let snapshot = serde_json::from_str(&contents)
        .with_context(|| format!("failed to decode save file {}", path.display()))?;
    Ok(Some(snapshot))
}

/// Saves the snapshot, logging instead of failing. Returns whether it was written.
pub(crate) fn save(path: &Path, snapshot: &GridSnapshot) -> bool {
    match write_snapshot(path, snapshot) {
        Ok(()) => {
            info!(path = %path.display(), "save_written");
            true
        }
        Err(error) => {
            warn!(path = %path.display(), error = %format!("{error:#}"), "save_failed");
            false
        }
    }
}

/// Loads the snapshot if one can be read. Unreadable saves are logged and ignored.
pub(crate) fn load(path: &Path) -> Option<GridSnapshot> {
    match read_snapshot(path) {
        Ok(Some(snapshot)) => {
            info!(path = %path.display(), "save_loaded");
            Some(snapshot)
        }
        Ok(None) => {
            info!(path = %path.display(), "save_missing");
            None
        }
        Err(error) => {
            warn!(path = %path.display(), error = %format!("{error:#}"), "save_unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loaf_core::{HexLayout, ScoreBoard, TileIndex};
    use loaf_world::HexGrid;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("loaf-persistence-{}", std::process::id()))
            .join(name)
    }

    fn sample_snapshot() -> GridSnapshot {
        let grid = HexGrid::new(HexLayout::new(4, 3, 32, 32), &[1; 12], TileIndex::new(0))
            .expect("valid grid");
        let mut scores = ScoreBoard::new();
        scores.forest = 2;
        grid.to_snapshot(scores)
    }

    #[test]
    fn saved_snapshot_loads_back_identically() {
        let path = scratch_path("round_trip/overworld.json");
        let snapshot = sample_snapshot();

        assert!(save(&path, &snapshot));
        let loaded = load(&path).expect("save file readable");

        assert_eq!(loaded, snapshot);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_save_loads_nothing() {
        let path = scratch_path("absent.json");
        assert_eq!(read_snapshot(&path).expect("missing is not an error"), None);
        assert_eq!(load(&path), None);
    }

    #[test]
    fn corrupt_save_is_ignored() {
        let path = scratch_path("corrupt.json");
        fs::create_dir_all(path.parent().expect("scratch dir")).expect("create scratch dir");
        fs::write(&path, "{ not json").expect("write corrupt file");

        assert!(read_snapshot(&path).is_err());
        assert_eq!(load(&path), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_file_is_pretty_json() {
        let path = scratch_path("pretty.json");
        write_snapshot(&path, &sample_snapshot()).expect("write succeeds");

        let contents = fs::read_to_string(&path).expect("readable");
        assert!(contents.contains("\n  \"layout\""));
        let _ = fs::remove_file(&path);
    }
}
