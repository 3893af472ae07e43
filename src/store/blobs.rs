//! Blob storage for task attachments
//!
//! Attachment bytes are opaque to the engine; they land in an uploads
//! directory as `{attachment-id}_{filename}`. Deletion is best-effort: a
//! missing file is not an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::AttachmentId;

/// Filesystem store for attachment bytes
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    /// Creates a blob store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the uploads directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Normalizes a client-supplied filename to a storable name
    ///
    /// Path components are stripped; an empty name falls back to
    /// `unnamed_{id}`.
    pub fn storage_name(id: &AttachmentId, filename: &str) -> String {
        let base = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .trim();

        if base.is_empty() {
            format!("unnamed_{}", id)
        } else {
            base.to_string()
        }
    }

    /// Writes attachment bytes, returning the stored path
    pub fn store(&self, id: &AttachmentId, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let name = Self::storage_name(id, filename);
        let path = self.dir.join(format!("{}_{}", id, name));
        fs::write(&path, bytes)?;

        Ok(path)
    }

    /// Removes a stored blob; missing files are ignored
    pub fn delete(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
