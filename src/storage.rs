use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub type DB<T> = HashMap<String, T>;

const SNAPSHOT_FILE: &str = "appointments.json";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "snapshot io error: {}", e),
            StoreError::Serde(e) => write!(f, "snapshot serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e)
    }
}

fn snapshot_path(location: &str) -> PathBuf {
    Path::new(location).join(SNAPSHOT_FILE)
}

/// Loads the full snapshot from `location`. A missing file is an empty
/// store, not an error.
pub fn load_db<T: DeserializeOwned>(location: &str) -> Result<DB<T>, StoreError> {
    let path = snapshot_path(location);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Rewrites the whole snapshot. Writes to a temp file first and renames it
/// into place so a crash mid-write never leaves a truncated snapshot.
pub fn save_db<T: Serialize>(location: &str, db: &DB<T>) -> Result<(), StoreError> {
    fs::create_dir_all(location)?;
    let path = snapshot_path(location);
    let tmp = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(db)?;
    fs::write(&tmp, content)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        label: String,
        armed: bool,
    }

    fn temp_location() -> String {
        std::env::temp_dir()
            .join(format!("yaksokbot_store_{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let location = temp_location();
        let db: DB<Entry> = load_db(&location).expect("load should succeed");
        assert!(db.is_empty());
    }

    #[test]
    fn snapshot_round_trip() {
        let location = temp_location();
        let mut db: DB<Entry> = HashMap::new();
        db.insert(
            "123".to_string(),
            Entry {
                label: "2025년 7월 3일 목요일".to_string(),
                armed: true,
            },
        );
        db.insert(
            "456".to_string(),
            Entry {
                label: "2025년 7월 4일 금요일".to_string(),
                armed: false,
            },
        );

        save_db(&location, &db).expect("save should succeed");
        let reloaded: DB<Entry> = load_db(&location).expect("load should succeed");
        assert_eq!(reloaded, db);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let location = temp_location();
        let mut db: DB<Entry> = HashMap::new();
        db.insert(
            "123".to_string(),
            Entry {
                label: "x".to_string(),
                armed: false,
            },
        );
        save_db(&location, &db).expect("save should succeed");
        assert!(!snapshot_path(&location).with_extension("json.tmp").exists());
    }
}
