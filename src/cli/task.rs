//! Task command implementations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::output::Output;
use crate::domain::{NewTask, Priority, RefId, TaskError, TaskId, TaskPatch, TaskStatus, Urgency};
use crate::service::{ListFilter, TaskService};
use crate::store::Workspace;

/// Opens the enclosing workspace and builds a service over its stores
pub fn open_service(output: &Output) -> Result<TaskService> {
    let workspace = Workspace::open_current()?;
    output.verbose(&format!("workspace at {}", workspace.root().display()));

    let service = TaskService::in_memory()
        .with_snapshot(workspace.snapshot_store())?
        .with_blobs(workspace.blob_store());
    Ok(service)
}

/// Parses a deadline string; malformed input is treated as no deadline
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM` and bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_deadline(output: &Output, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        output.verbose(&format!("ignoring unparsable deadline '{}'", raw));
    }
    parsed
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

fn parse_ref(raw: Option<&str>) -> Result<Option<RefId>> {
    match raw {
        Some(s) => Ok(Some(s.parse::<RefId>()?)),
        None => Ok(None),
    }
}

fn print_task(output: &Output, task: &crate::domain::Task) {
    if output.is_json() {
        output.data(task);
        return;
    }
    output.row(&[
        &task.id.to_string(),
        task.status.map(|s| s.label()).unwrap_or("-"),
        task.priority.map(|p| p.label()).unwrap_or("-"),
        &task.title,
    ]);
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    output: &Output,
    title: &str,
    description: Option<&str>,
    deadline: Option<&str>,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    category: Option<&str>,
    assignee: Option<&str>,
    creator: Option<&str>,
) -> Result<()> {
    let service = open_service(output)?;

    let input = NewTask {
        title: Some(title.to_string()),
        description: description.map(String::from),
        deadline: parse_deadline(output, deadline),
        status,
        priority,
        category: parse_ref(category)?,
        assignee: parse_ref(assignee)?,
        creator: parse_ref(creator)?,
    };

    let task = service.create(input)?;
    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created {} '{}'", task.id, task.title));
    }
    Ok(())
}

pub fn list(
    output: &Output,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    category: Option<&str>,
    query: Option<&str>,
) -> Result<()> {
    let service = open_service(output)?;

    let filter = ListFilter {
        status,
        priority,
        category: parse_ref(category)?,
        query: query.map(String::from),
    };
    let tasks = service.list(&filter);

    if output.is_json() {
        output.data(&tasks);
    } else {
        output.row(&["ID", "STATUS", "PRIORITY", "TITLE"]);
        for task in &tasks {
            print_task(output, task);
        }
    }
    Ok(())
}

pub fn show(output: &Output, id: &str) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;

    let task = service.get(&id)?;
    output.data(&task);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn update(
    output: &Output,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    deadline: Option<&str>,
    warning: Option<&str>,
    urgency: Option<Urgency>,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    category: Option<&str>,
    assignee: Option<&str>,
) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;

    let patch = TaskPatch {
        title: title.map(String::from),
        description: description.map(String::from),
        deadline: parse_deadline(output, deadline),
        warning: warning.map(String::from),
        urgency,
        status,
        priority,
        category: parse_ref(category)?,
        assignee: parse_ref(assignee)?,
        completed: None,
        termination_cause: None,
    };

    let task = service.update(&id, patch)?;
    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Updated {}", task.id));
    }
    Ok(())
}

pub fn subtask(
    output: &Output,
    parent: &str,
    title: &str,
    description: Option<&str>,
    deadline: Option<&str>,
) -> Result<()> {
    let service = open_service(output)?;
    let parent: TaskId = parent.parse()?;

    let input = NewTask {
        title: Some(title.to_string()),
        description: description.map(String::from),
        deadline: parse_deadline(output, deadline),
        ..NewTask::default()
    };

    let task = service.add_subtask(&parent, input)?;
    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created subtask {} under {}", task.id, parent));
    }
    Ok(())
}

pub fn done(output: &Output, id: &str, cause: Option<&str>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let default_cause = workspace.config().default_cause.clone();
    let service = TaskService::in_memory()
        .with_snapshot(workspace.snapshot_store())?
        .with_blobs(workspace.blob_store());

    let id: TaskId = id.parse()?;
    let cause = cause.unwrap_or(&default_cause);

    let task = service.complete(&id, Some(cause))?;
    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Completed {} ({})", task.id, cause));
    }
    Ok(())
}

pub fn reopen(output: &Output, id: &str) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;

    let task = service.reopen(&id)?;
    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Reopened {}", task.id));
    }
    Ok(())
}

pub fn dep(output: &Output, id: &str, depends_on: &str) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;
    let depends_on: TaskId = depends_on.parse()?;

    let task = service.add_dependency(&id, &depends_on)?;
    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("{} now depends on {}", task.id, depends_on));
    }
    Ok(())
}

pub fn remove(output: &Output, id: &str) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;

    if service.delete(&id) {
        output.success(&format!("Deleted {} and its subtree", id));
        Ok(())
    } else {
        Err(TaskError::TaskNotFound(id).into())
    }
}

pub fn attach(output: &Output, id: &str, file: &str) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;

    let bytes = std::fs::read(file)?;
    let filename = std::path::Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    let attachment = service.add_attachment(&id, filename, &bytes)?;

    if output.is_json() {
        output.data(&attachment);
    } else {
        output.success(&format!(
            "Attached {} to {} as {}",
            attachment.filename, id, attachment.id
        ));
    }
    Ok(())
}

pub fn detach(output: &Output, id: &str, attachment_id: &str) -> Result<()> {
    let service = open_service(output)?;
    let id: TaskId = id.parse()?;
    let attachment_id: crate::domain::AttachmentId = attachment_id.parse()?;

    if service.remove_attachment(&id, &attachment_id)? {
        output.success(&format!("Removed {} from {}", attachment_id, id));
        Ok(())
    } else {
        Err(TaskError::AttachmentNotFound(attachment_id).into())
    }
}
