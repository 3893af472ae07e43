//! Domain model: identifiers, the task entity, and the error taxonomy

mod error;
mod id;
mod task;

pub use error::TaskError;
pub use id::{AttachmentId, IdError, RefId, TaskId};
pub use task::{Attachment, NewTask, Priority, Task, TaskPatch, TaskStatus, Urgency};
