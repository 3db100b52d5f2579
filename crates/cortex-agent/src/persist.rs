use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::errors::PersistError;

/// Result files older than this are removed before a new one is written.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Writes `payload` as a timestamped JSON file in `dir` and returns its
/// absolute path. Stale files in `dir` are swept first.
pub fn persist_result(payload: &Value, dir: &Path) -> Result<PathBuf, PersistError> {
    let dir = ensure_result_dir(dir)?;
    let removed = sweep_stale_results(&dir, SystemTime::now());
    if removed > 0 {
        info!("Removed {} stale result file(s) from {}", removed, dir.display());
    }

    let path = dir.join(result_file_name(Local::now()));
    let empty = Value::Object(Map::new());
    let payload = if payload.is_null() { &empty } else { payload };
    let contents = serde_json::to_string_pretty(payload)?;

    fs::write(&path, contents).map_err(|source| PersistError::Write {
        path: path.display().to_string(),
        source,
    })?;

    Ok(path)
}

/// Resolves `dir` against the working directory and creates it if missing.
pub fn ensure_result_dir(dir: &Path) -> Result<PathBuf, PersistError> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(PersistError::WorkingDir)?
            .join(dir)
    };

    fs::create_dir_all(&dir).map_err(|source| PersistError::CreateDir {
        path: dir.display().to_string(),
        source,
    })?;

    Ok(dir)
}

/// Deletes regular files in `dir` last modified more than
/// [`RETENTION_WINDOW`] before `now`. Entries that cannot be inspected or
/// removed are skipped. Returns how many files were deleted.
pub fn sweep_stale_results(dir: &Path, now: SystemTime) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping sweep of {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        // Files stamped in the future have no age yet
        let Ok(age) = now.duration_since(modified) else {
            continue;
        };
        if age <= RETENTION_WINDOW {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed stale result file {}", path.display());
                removed += 1;
            }
            Err(e) => debug!("Could not remove {}: {}", path.display(), e),
        }
    }

    removed
}

/// `agent-result-<YYYYMMDD>-<HHMMSS>-<epoch millis>.json`, local time.
pub fn result_file_name(now: DateTime<Local>) -> String {
    format!(
        "agent-result-{}-{}.json",
        now.format("%Y%m%d-%H%M%S"),
        now.timestamp_millis()
    )
}
