//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Workspace | Workspace management | `init` |
//! | Tasks | Lifecycle and edits | `add`, `update`, `done`, `reopen`, `rm` |
//! | Structure | Hierarchy and dependencies | `sub`, `dep` |
//! | Queries | Listing and inspection | `list`, `show` |
//! | Files | Attachments | `attach`, `detach` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! cascade --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
