//! Local state persisted between invocations.
//!
//! Two JSON files live in the data directory (`~/.local/share/blogdesk` on
//! Linux, overridable with `BLOGDESK_DATA_DIR`):
//! - `schedule.json`: the displayed schedule and its month label
//! - `session.json`: the login token and user
//!
//! Loading never fails: a missing or unreadable file yields `None`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::model::User;
use crate::config::env_string;
use crate::schedule::ScheduleEntry;

const SCHEDULE_FILE: &str = "schedule.json";
const SESSION_FILE: &str = "session.json";

/// Resolve the data directory.
pub fn data_dir() -> Option<PathBuf> {
    if let Some(dir) = env_string("BLOGDESK_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::data_dir().map(|p| p.join("blogdesk"))
}

/// The schedule currently on display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub month: String,
    pub entries: Vec<ScheduleEntry>,
    pub imported_at: DateTime<Utc>,
}

impl StoredSchedule {
    pub fn load(dir: &Path) -> Option<Self> {
        load_json(&dir.join(SCHEDULE_FILE))
    }

    pub fn save(&self, dir: &Path) -> Result<(), String> {
        save_json(dir, SCHEDULE_FILE, self)
    }
}

/// A logged-in session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn load(dir: &Path) -> Option<Self> {
        load_json(&dir.join(SESSION_FILE))
    }

    pub fn save(&self, dir: &Path) -> Result<(), String> {
        save_json(dir, SESSION_FILE, self)
    }

    /// Remove the stored session. Missing file is not an error.
    pub fn clear(dir: &Path) -> Result<(), String> {
        let path = dir.join(SESSION_FILE);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| format!("failed to remove {}: {}", path.display(), e))?;
        }
        Ok(())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

fn save_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("failed to create {}: {}", dir.display(), e))?;

    let contents = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize {}: {}", file, e))?;

    let path = dir.join(file);
    fs::write(&path, contents).map_err(|e| format!("failed to write {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "writer".to_string(),
            role: Some("USER".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StoredSchedule::load(dir.path()).is_none());
        assert!(Session::load(dir.path()).is_none());
    }

    #[test]
    fn test_session_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let session = Session {
            token: "t0k".to_string(),
            user: sample_user(),
        };
        session.save(&nested).unwrap();
        assert_eq!(Session::load(&nested), Some(session));

        Session::clear(&nested).unwrap();
        assert!(Session::load(&nested).is_none());
        // Clearing twice is fine
        Session::clear(&nested).unwrap();
    }

    #[test]
    fn test_schedule_persists() {
        let dir = tempfile::tempdir().unwrap();
        let stored = StoredSchedule {
            month: "2026年4月".to_string(),
            entries: vec![ScheduleEntry {
                date: "4月1日".to_string(),
                day: "星期三".to_string(),
                shift: "A班".to_string(),
                note: "n".to_string(),
            }],
            imported_at: Utc::now(),
        };
        stored.save(dir.path()).unwrap();

        let loaded = StoredSchedule::load(dir.path()).unwrap();
        assert_eq!(loaded.month, "2026年4月");
        assert_eq!(loaded.entries, stored.entries);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(Session::load(dir.path()).is_none());
    }
}
