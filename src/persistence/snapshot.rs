use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::garden::GameState;

/// Metadata about a save file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub path: PathBuf,
    pub tick_count: u64,
    /// Unix millis, strictly increasing across saves in one directory.
    pub timestamp: u64,
    pub file_size: u64,
}

/// Errors that can occur during snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("No valid saves found. Start a new garden with: peagarden play --fresh")]
    NoValidSnapshots,
}

fn snapshot_filename(tick_count: u64, timestamp: u64) -> String {
    format!("garden-tick{}-{}.json", tick_count, timestamp)
}

/// Parse tick count and timestamp from a save filename.
/// Expected format: `garden-tick{N}-{unix_millis}.json`
fn parse_snapshot_filename(filename: &str) -> Option<(u64, u64)> {
    let stem = filename.strip_suffix(".json")?;
    let rest = stem.strip_prefix("garden-tick")?;
    let (tick_str, ts_str) = rest.split_once('-')?;
    let tick = tick_str.parse::<u64>().ok()?;
    let ts = ts_str.parse::<u64>().ok()?;
    Some((tick, ts))
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Timestamp for the next save: wall-clock millis, but always past the newest
/// save already in the directory. Tick counts restart on reset and never
/// take part in ordering.
fn next_timestamp(snapshot_dir: &Path) -> Result<u64, SnapshotError> {
    let now = unix_millis_now();
    let newest = list_snapshots(snapshot_dir)?.first().map(|s| s.timestamp);
    Ok(match newest {
        Some(ts) if ts >= now => ts + 1,
        _ => now,
    })
}

/// Write the game state as JSON, atomically.
///
/// Writes to a temporary file first, then renames over the final path, so a
/// crash mid-write never leaves a half-written save behind.
pub fn save_snapshot(state: &GameState, snapshot_dir: &Path) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(snapshot_dir)?;

    let filename = snapshot_filename(state.tick_count, next_timestamp(snapshot_dir)?);
    let target = snapshot_dir.join(&filename);
    let tmp = snapshot_dir.join(format!(".{}.tmp", filename));

    let encoded =
        serde_json::to_vec_pretty(state).map_err(|e| SnapshotError::Serialize(e.to_string()))?;

    if let Err(e) = fs::write(&tmp, &encoded) {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Io(e));
    }
    if let Err(e) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Io(e));
    }

    debug!(path = %target.display(), "Saved garden");
    Ok(target)
}

/// Load a save and bring it up to the current schema.
pub fn load_snapshot(path: &Path) -> Result<GameState, SnapshotError> {
    let data = fs::read(path)?;
    let mut state: GameState =
        serde_json::from_slice(&data).map_err(|e| SnapshotError::Deserialize(e.to_string()))?;
    state.migrate();
    Ok(state)
}

/// List all saves in a directory, newest first.
pub fn list_snapshots(snapshot_dir: &Path) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
    if !snapshot_dir.exists() {
        return Ok(Vec::new());
    }

    let mut snapshots = Vec::new();
    for entry in fs::read_dir(snapshot_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        // Skip temp files
        if filename.starts_with('.') {
            continue;
        }

        if let Some((tick_count, timestamp)) = parse_snapshot_filename(&filename) {
            let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            snapshots.push(SnapshotMetadata {
                path: path.clone(),
                tick_count,
                timestamp,
                file_size,
            });
        }
    }

    snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(snapshots)
}

/// Keep only the `max_snapshots` newest saves. Returns the deleted paths.
pub fn prune_snapshots(
    snapshot_dir: &Path,
    max_snapshots: usize,
) -> Result<Vec<PathBuf>, SnapshotError> {
    let snapshots = list_snapshots(snapshot_dir)?;

    let mut deleted = Vec::new();
    if snapshots.len() > max_snapshots {
        for snapshot in &snapshots[max_snapshots..] {
            fs::remove_file(&snapshot.path)?;
            deleted.push(snapshot.path.clone());
        }
    }
    Ok(deleted)
}

/// Load the newest readable save, skipping corrupt ones.
pub fn load_latest_valid_snapshot(snapshot_dir: &Path) -> Result<GameState, SnapshotError> {
    for snapshot in &list_snapshots(snapshot_dir)? {
        match load_snapshot(&snapshot.path) {
            Ok(state) => return Ok(state),
            Err(e) => {
                warn!(
                    path = %snapshot.path.display(),
                    error = %e,
                    "Corrupt save, trying next"
                );
            }
        }
    }
    Err(SnapshotError::NoValidSnapshots)
}

/// A save directory with rotation.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
    max_saves: usize,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>, max_saves: usize) -> Self {
        SaveStore {
            dir: dir.into(),
            max_saves: max_saves.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a new save and drop the ones past the rotation limit.
    pub fn save(&self, state: &GameState) -> Result<PathBuf, SnapshotError> {
        let path = save_snapshot(state, &self.dir)?;
        let pruned = prune_snapshots(&self.dir, self.max_saves)?;
        if !pruned.is_empty() {
            debug!(count = pruned.len(), "Pruned old saves");
        }
        Ok(path)
    }

    /// The newest valid save, or `None` for a fresh start.
    pub fn load(&self) -> Option<GameState> {
        match load_latest_valid_snapshot(&self.dir) {
            Ok(state) => Some(state),
            Err(SnapshotError::NoValidSnapshots) => None,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Could not read saves");
                None
            }
        }
    }

    /// Re-save an older file so it becomes the newest.
    pub fn restore(&self, path: &Path) -> Result<PathBuf, SnapshotError> {
        let state = load_snapshot(path)?;
        self.save(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::{GardenPlot, PlotStatus};
    use crate::progression::TutorialStep;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tempfile::TempDir;

    fn make_state() -> GameState {
        GameState::new(&mut ChaCha8Rng::seed_from_u64(42))
    }

    fn state_json() -> Vec<u8> {
        serde_json::to_vec(&make_state()).unwrap()
    }

    #[test]
    fn save_and_load_round_trip_identical() {
        let dir = TempDir::new().unwrap();
        let state = make_state();
        let path = save_snapshot(&state, dir.path()).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), state);
    }

    #[test]
    fn save_is_flat_camel_case_json() {
        let dir = TempDir::new().unwrap();
        let path = save_snapshot(&make_state(), dir.path()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(value["money"], 200);
        assert_eq!(value["tutorialStep"], 1);
        assert_eq!(value["inventory"][0]["genotype"], "AABB");
        assert_eq!(value["plots"][1]["unlockPrice"], 100);
    }

    #[test]
    fn snapshot_filename_parse_round_trip() {
        let filename = snapshot_filename(500, 1708300000);
        assert_eq!(filename, "garden-tick500-1708300000.json");
        assert_eq!(parse_snapshot_filename(&filename), Some((500, 1708300000)));
    }

    #[test]
    fn parse_invalid_filename_returns_none() {
        assert!(parse_snapshot_filename("random.json").is_none());
        assert!(parse_snapshot_filename("garden-tick.json").is_none());
        assert!(parse_snapshot_filename("garden-tickabc-123.json").is_none());
        assert!(parse_snapshot_filename("garden-tick100-abc.json").is_none());
        assert!(parse_snapshot_filename("garden-tick1-2.bin").is_none());
    }

    #[test]
    fn list_snapshots_returns_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        let data = state_json();
        fs::write(dir.path().join("garden-tick10-1000.json"), &data).unwrap();
        fs::write(dir.path().join("garden-tick20-2000.json"), &data).unwrap();
        fs::write(dir.path().join("garden-tick30-3000.json"), &data).unwrap();

        let snapshots = list_snapshots(dir.path()).unwrap();
        let ticks: Vec<u64> = snapshots.iter().map(|s| s.tick_count).collect();
        assert_eq!(ticks, [30, 20, 10]);
    }

    #[test]
    fn list_snapshots_skips_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("garden-tick10-1000.json"), state_json()).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a save").unwrap();
        fs::write(dir.path().join(".garden-tick99-9999.json.tmp"), "temp file").unwrap();

        assert_eq!(list_snapshots(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn list_snapshots_nonexistent_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_snapshots(&missing).unwrap().is_empty());
    }

    #[test]
    fn prune_keeps_max_snapshots() {
        let dir = TempDir::new().unwrap();
        let data = state_json();
        for i in 0..6u64 {
            fs::write(
                dir.path().join(format!("garden-tick{}-{}.json", i * 10, 1000 + i)),
                &data,
            )
            .unwrap();
        }

        let deleted = prune_snapshots(dir.path(), 3).unwrap();
        assert_eq!(deleted.len(), 3);

        let remaining: Vec<u64> = list_snapshots(dir.path())
            .unwrap()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(remaining, [1005, 1004, 1003]);
    }

    #[test]
    fn load_corrupt_snapshot_returns_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garden-tick0-1000.json");
        fs::write(&path, b"{ this is not json").unwrap();
        assert!(matches!(load_snapshot(&path), Err(SnapshotError::Deserialize(_))));
    }

    #[test]
    fn load_latest_valid_falls_back_on_corrupt() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("garden-tick10-1000.json"), state_json()).unwrap();
        fs::write(dir.path().join("garden-tick20-2000.json"), b"corrupt data here").unwrap();

        let restored = load_latest_valid_snapshot(dir.path()).unwrap();
        assert_eq!(restored, make_state());
    }

    #[test]
    fn load_latest_valid_all_corrupt_returns_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("garden-tick10-1000.json"), b"corrupt1").unwrap();
        fs::write(dir.path().join("garden-tick20-2000.json"), b"corrupt2").unwrap();
        assert!(matches!(
            load_latest_valid_snapshot(dir.path()),
            Err(SnapshotError::NoValidSnapshots)
        ));
    }

    #[test]
    fn atomic_write_no_temp_files_remain() {
        let dir = TempDir::new().unwrap();
        save_snapshot(&make_state(), dir.path()).unwrap();
        let temp_files = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_str().is_some_and(|n| n.starts_with('.')))
            .count();
        assert_eq!(temp_files, 0);
    }

    #[test]
    fn save_creates_directory_if_missing() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("saves");
        assert!(save_snapshot(&make_state(), &nested).unwrap().exists());
    }

    #[test]
    fn old_save_with_four_plots_is_truncated() {
        let dir = TempDir::new().unwrap();
        let mut state = make_state();
        state.plots.push(GardenPlot::new(3, 300));
        let path = dir.path().join("garden-tick0-1000.json");
        fs::write(&path, serde_json::to_vec(&state).unwrap()).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.plots.len(), 3);
    }

    #[test]
    fn save_without_tutorial_step_loads_as_done() {
        let dir = TempDir::new().unwrap();
        let mut value = serde_json::to_value(make_state()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("tutorialStep");
        object.remove("tickCount");
        let path = dir.path().join("garden-tick0-1000.json");
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.tutorial_step, TutorialStep::DONE);
        assert_eq!(loaded.tick_count, 0);
    }

    #[test]
    fn inconsistent_plot_is_repaired_on_load() {
        let dir = TempDir::new().unwrap();
        let mut value = serde_json::to_value(make_state()).unwrap();
        value["plots"][0]["status"] = serde_json::json!("ready");
        value["plots"][0]["progress"] = serde_json::json!(100);
        let path = dir.path().join("garden-tick0-1000.json");
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.plots[0].status, PlotStatus::Empty);
        assert!(loaded.plots[0].is_consistent());
    }

    #[test]
    fn store_rotates_and_loads_newest() {
        let dir = TempDir::new().unwrap();
        let store = SaveStore::new(dir.path(), 2);
        assert!(store.load().is_none());

        let mut state = make_state();
        for tick in 1..=3 {
            state.tick_count = tick;
            store.save(&state).unwrap();
        }
        assert_eq!(list_snapshots(dir.path()).unwrap().len(), 2);
        assert_eq!(store.load().unwrap().tick_count, 3);
    }

    #[test]
    fn reset_game_saved_in_same_second_loads_as_newest() {
        let dir = TempDir::new().unwrap();
        let store = SaveStore::new(dir.path(), 5);
        let mut played = make_state();
        played.tick_count = 500;
        played.money = 999;
        store.save(&played).unwrap();
        store.save(&make_state()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.money, 200);
        assert_eq!(loaded.tick_count, 0);
    }

    #[test]
    fn single_slot_rotation_keeps_latest_save() {
        let dir = TempDir::new().unwrap();
        let store = SaveStore::new(dir.path(), 1);
        let mut played = make_state();
        played.tick_count = 500;
        played.money = 999;
        store.save(&played).unwrap();
        store.save(&make_state()).unwrap();

        let saves = list_snapshots(dir.path()).unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].tick_count, 0);
        assert_eq!(store.load().unwrap().money, 200);
    }

    #[test]
    fn next_timestamp_moves_past_future_saves() {
        let dir = TempDir::new().unwrap();
        let future = unix_millis_now() + 60_000;
        fs::write(dir.path().join(snapshot_filename(3, future)), state_json()).unwrap();
        assert_eq!(next_timestamp(dir.path()).unwrap(), future + 1);
    }

    #[test]
    fn restore_makes_old_save_newest() {
        let dir = TempDir::new().unwrap();
        let store = SaveStore::new(dir.path(), 5);
        let mut state = make_state();
        state.money = 999;
        let old = dir.path().join("garden-tick7-1000.json");
        fs::write(&old, serde_json::to_vec(&state).unwrap()).unwrap();
        state.money = 1;
        state.tick_count = 50;
        fs::write(
            dir.path().join("garden-tick50-2000.json"),
            serde_json::to_vec(&state).unwrap(),
        )
        .unwrap();

        store.restore(&old).unwrap();
        assert_eq!(store.load().unwrap().money, 999);
    }
}
