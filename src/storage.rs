use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Settings, Task};

pub const DATA_FILE: &str = "tasks.json";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt data in {}: {source}", .path.display())]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON files under a single data directory. Every save rewrites the whole file.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn data_path(&self) -> PathBuf {
        self.root.join(DATA_FILE)
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// A missing file loads as an empty list; a malformed one is `CorruptData`.
    pub fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.load_json(self.data_path())?.unwrap_or_default())
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.write_atomic(self.data_path(), tasks)
    }

    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        Ok(self
            .load_json(self.root.join(SETTINGS_FILE))?
            .unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(SETTINGS_FILE), settings)
    }

    fn load_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<Option<T>, StorageError> {
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        match serde_json::from_slice(&buf) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(StorageError::CorruptData { path, source }),
        }
    }

    fn write_atomic<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        data: &T,
    ) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, &path)?;
        log::debug!("storage: wrote {} bytes to {}", json.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use chrono::NaiveDate;

    fn make_task(id: u32, priority: &str, due: &str) -> Task {
        Task::new(
            id,
            format!("task-{id}"),
            format!("description {id}"),
            priority.to_string(),
            NaiveDate::parse_from_str(due, "%Y-%m-%d").unwrap(),
        )
    }

    #[test]
    fn load_tasks_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        assert!(storage.load_tasks().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_preserves_fields_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        let mut done = make_task(5, "Urgent", "2024-02-29");
        done.mark_complete();
        let tasks = vec![
            make_task(9, "Low", "2030-01-01"),
            done,
            make_task(1, "High", "2025-12-31"),
        ];

        storage.save_tasks(&tasks).unwrap();
        let loaded = storage.load_tasks().unwrap();
        assert_eq!(loaded, tasks);
        assert_eq!(loaded[1].status, TaskStatus::Completed);
        assert!(!dir.path().join("tasks.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage
            .save_tasks(&[make_task(1, "Low", "2030-01-01"), make_task(2, "Low", "2030-01-02")])
            .unwrap();
        storage.save_tasks(&[make_task(3, "High", "2030-01-03")]).unwrap();

        let loaded = storage.load_tasks().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 3);
    }

    #[test]
    fn persisted_file_uses_plain_date_and_status_strings() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.save_tasks(&[make_task(1, "High", "2030-01-01")]).unwrap();

        let raw = fs::read_to_string(storage.data_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["due_date"], "2030-01-01");
        assert_eq!(value[0]["status"], "Pending");
        assert_eq!(value[0]["id"], 1);
    }

    #[test]
    fn malformed_file_reports_corrupt_data() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        fs::write(storage.data_path(), "{ not json").unwrap();
        assert!(matches!(
            storage.load_tasks(),
            Err(StorageError::CorruptData { .. })
        ));

        // Valid JSON with the wrong shape is corrupt too.
        fs::write(storage.data_path(), r#"[{"id": 1, "due_date": "someday"}]"#).unwrap();
        assert!(matches!(
            storage.load_tasks(),
            Err(StorageError::CorruptData { .. })
        ));
    }

    #[test]
    fn settings_default_when_missing_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        assert_eq!(storage.load_settings().unwrap(), Settings::default());

        let settings = Settings {
            reminder_window_days: 5,
            autosave_sorted_order: false,
        };
        storage.save_settings(&settings).unwrap();
        assert_eq!(storage.load_settings().unwrap(), settings);
    }

    #[test]
    fn ensure_dirs_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        let storage = Storage::new(root.clone());
        storage.ensure_dirs().unwrap();
        assert!(root.is_dir());
        storage.save_tasks(&[]).unwrap();
        assert!(storage.load_tasks().unwrap().is_empty());
    }
}
