//! JSONL snapshot of the task graph
//!
//! The whole task set is written to `tasks.jsonl`, one JSON object per
//! line. Writes go through a temp file and an atomic rename; file locks
//! (`fs2`) guard concurrent access from other processes. Snapshot
//! write-back is a best-effort side channel: the engine never blocks on
//! it and a failed write never rolls back an in-memory mutation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::Task;

/// Store for the task snapshot in JSONL format
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a snapshot store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all tasks from the snapshot
    pub fn read_all(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open snapshot: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on snapshot")?;

        let reader = BufReader::new(&file);
        let mut tasks = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            tasks.push(task);
        }

        // Lock is released when the file is dropped
        Ok(tasks)
    }

    /// Writes the full task set to the snapshot (rewrite + atomic rename)
    pub fn write_all<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on snapshot")?;

            let mut writer = BufWriter::new(&file);

            // Sort by id for stable diffs
            let mut sorted: Vec<_> = tasks.into_iter().collect();
            sorted.sort_by(|a, b| a.id.cmp(&b.id));

            for task in sorted {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush snapshot")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    #[test]
    fn read_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn write_and_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let a = make_task("A");
        let mut b = make_task("B");
        b.push_warning("note");

        store.write_all([&a, &b]).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().any(|t| t.id == a.id));
        assert!(loaded
            .iter()
            .any(|t| t.id == b.id && t.warnings == vec!["note"]));
    }

    #[test]
    fn rewrite_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let a = make_task("A");
        let b = make_task("B");
        store.write_all([&a, &b]).unwrap();
        store.write_all([&a]).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, a.id);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        store.write_all([&make_task("A")]).unwrap();

        assert!(!store.path().with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested").join("tasks.jsonl"));

        store.write_all([&make_task("A")]).unwrap();
        assert!(store.path().exists());
    }
}
