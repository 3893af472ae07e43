//! Opaque identifiers for tasks, attachments and external references
//!
//! ID Format:
//! - Task IDs: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//! - Attachment IDs: `f-{7-char-hash}` (e.g., `f-4a1c8b0`)
//!
//! Hashes are derived from title + creation timestamp, so the same title
//! created at different times produces different IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{7-char-hash}}', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid attachment ID format: expected 'f-{{7-char-hash}}', got '{0}'")]
    InvalidAttachmentId(String),

    #[error("Reference ID must not be empty")]
    EmptyRef,
}

/// Generates a 7-character hash from a seed string and timestamp
fn generate_hash(seed: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", seed, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

fn valid_hash(hash: &str) -> bool {
    hash.len() == 7 && hash.chars().all(|c| c.is_ascii_hexdigit())
}

/// Task ID in the format `t-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    hash: String,
}

impl TaskId {
    /// Creates a new task ID from title and creation timestamp
    pub fn new(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(title, timestamp),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.hash)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        if !valid_hash(hash) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Attachment ID in the format `f-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttachmentId {
    hash: String,
}

impl AttachmentId {
    /// Creates a new attachment ID from filename and upload timestamp
    pub fn new(filename: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(filename, timestamp),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f-{}", self.hash)
    }
}

impl FromStr for AttachmentId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("f-")
            .ok_or_else(|| IdError::InvalidAttachmentId(s.to_string()))?;

        if !valid_hash(hash) {
            return Err(IdError::InvalidAttachmentId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for AttachmentId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AttachmentId> for String {
    fn from(id: AttachmentId) -> Self {
        id.to_string()
    }
}

/// Opaque reference to an external entity (category, assignee, creator)
///
/// The engine never resolves these; they are matched by equality and
/// carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefId(String);

impl RefId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdError::EmptyRef);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RefId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RefId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RefId> for String {
    fn from(id: RefId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_roundtrip() {
        let id = TaskId::new("Write report", Utc::now());
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn task_id_display_format() {
        let id = TaskId::new("Write report", Utc::now());
        let s = id.to_string();
        assert!(s.starts_with("t-"));
        assert_eq!(s.len(), 9);
    }

    #[test]
    fn same_title_different_time_differs() {
        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::nanoseconds(1);
        assert_ne!(TaskId::new("Same", t1), TaskId::new("Same", t2));
    }

    #[test]
    fn invalid_task_id_rejected() {
        assert!("x-1234567".parse::<TaskId>().is_err());
        assert!("t-123".parse::<TaskId>().is_err());
        assert!("t-zzzzzzz".parse::<TaskId>().is_err());
    }

    #[test]
    fn attachment_id_roundtrip() {
        let id = AttachmentId::new("notes.pdf", Utc::now());
        let parsed: AttachmentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn attachment_prefix_is_not_task_prefix() {
        let id = AttachmentId::new("notes.pdf", Utc::now());
        assert!(id.to_string().parse::<TaskId>().is_err());
    }

    #[test]
    fn ref_id_trims() {
        let r = RefId::new("  work  ").unwrap();
        assert_eq!(r.as_str(), "work");
    }

    #[test]
    fn empty_ref_id_rejected() {
        assert_eq!(RefId::new("   "), Err(IdError::EmptyRef));
    }

    #[test]
    fn serde_as_string() {
        let id = TaskId::new("Serde", Utc::now());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
