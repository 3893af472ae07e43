//! Validation and propagation engine
//!
//! The pieces the service composes: title uniqueness, dependency cycle
//! prevention, deadline-driven priority/status assignment, and the
//! hierarchical completion/reopening/deletion state machine.

pub mod assign;
pub mod cycles;
pub mod hierarchy;
pub mod uniqueness;
