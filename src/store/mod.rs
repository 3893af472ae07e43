//! # Storage Layer
//!
//! The in-memory graph store, the task repository over it, and the
//! external side channels: a JSONL snapshot, attachment blob storage,
//! and workspace configuration.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.cascade/tasks.jsonl` |
//! | Attachments | raw bytes | `.cascade/uploads/{id}_{name}` |
//! | Config | TOML | `.cascade/config.toml` |
//!
//! Snapshot writes are atomic (temp file + rename) and `fs2`-locked.
//! Per the engine's persistence contract the snapshot is best-effort:
//! the in-memory graph is authoritative and a failed snapshot write is
//! never allowed to fail or roll back a mutation.

mod blobs;
mod config;
mod graph;
mod repository;
mod snapshot;
mod workspace;

pub use blobs::BlobStore;
pub use config::Config;
pub use graph::GraphStore;
pub use repository::TaskRepository;
pub use snapshot::SnapshotStore;
pub use workspace::{Workspace, WorkspaceError};
