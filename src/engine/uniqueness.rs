//! Title uniqueness validation
//!
//! Titles are globally unique after trimming and case-folding. Blank
//! titles skip the check entirely; on update, a title that matches the
//! task's own current title (case-insensitively) is never a conflict.

use crate::domain::{TaskError, TaskId};
use crate::store::TaskRepository;

/// Normalizes a title for comparison
fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Checks whether `title` is available, excluding `exclude` from the scan
///
/// Fails with [`TaskError::DuplicateTitle`] when another task already
/// carries the same normalized title.
pub fn check_available(
    repo: &TaskRepository,
    title: &str,
    exclude: Option<&TaskId>,
) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Ok(());
    }

    // An update keeping its own title (in any casing) is never a conflict
    if let Some(id) = exclude {
        if let Some(current) = repo.get(id) {
            if normalize(&current.title) == normalize(title) {
                return Ok(());
            }
        }
    }

    let wanted = normalize(title);
    let taken = repo
        .list()
        .filter(|t| Some(&t.id) != exclude)
        .any(|t| normalize(&t.title) == wanted);

    if taken {
        Err(TaskError::DuplicateTitle(title.trim().to_string()))
    } else {
        Ok(())
    }
}
