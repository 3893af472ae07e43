//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::task;
use crate::domain::{Priority, TaskStatus, Urgency};
use crate::store::Workspace;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(author, version, about = "Hierarchical task management with cascading completion")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new cascade workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Create a top-level task
    Add {
        /// Task title (must be unique, case-insensitive)
        title: String,

        /// Free-form description
        #[arg(long, short)]
        description: Option<String>,

        /// Deadline (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Initial status (todo, in-progress, completed, overdue)
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Priority (urgent, high, medium, low)
        #[arg(long, short)]
        priority: Option<Priority>,

        /// Category reference
        #[arg(long)]
        category: Option<String>,

        /// Assignee reference
        #[arg(long)]
        assignee: Option<String>,

        /// Creator reference
        #[arg(long)]
        creator: Option<String>,
    },

    /// List tasks
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Filter by priority
        #[arg(long)]
        priority: Option<Priority>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Substring match on title and description
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Show a single task with all its fields
    Show {
        /// Task ID
        id: String,
    },

    /// Update fields of a task
    Update {
        /// Task ID
        id: String,

        /// New title (must stay unique)
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// New deadline (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Append a warning message
        #[arg(long)]
        warning: Option<String>,

        /// Urgency (high, medium, low)
        #[arg(long)]
        urgency: Option<Urgency>,

        /// Status (todo, in-progress, completed, overdue)
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Priority (urgent, high, medium, low)
        #[arg(long, short)]
        priority: Option<Priority>,

        /// Category reference
        #[arg(long)]
        category: Option<String>,

        /// Assignee reference
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Create a subtask under an existing task
    Sub {
        /// Parent task ID
        parent: String,

        /// Subtask title
        title: String,

        /// Free-form description
        #[arg(long, short)]
        description: Option<String>,

        /// Deadline (defaults to the parent's deadline)
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Complete a task and cascade through its subtree
    Done {
        /// Task ID
        id: String,

        /// Termination cause recorded on the task
        #[arg(long)]
        cause: Option<String>,
    },

    /// Reopen a completed task
    Reopen {
        /// Task ID
        id: String,
    },

    /// Declare that one task depends on another
    Dep {
        /// Task ID
        id: String,

        /// ID of the task it depends on
        depends_on: String,
    },

    /// Delete a task and its entire subtree
    Rm {
        /// Task ID
        id: String,
    },

    /// Attach a file to a task
    Attach {
        /// Task ID
        id: String,

        /// Path to the file to attach
        file: String,
    },

    /// Remove an attachment from a task
    Detach {
        /// Task ID
        id: String,

        /// Attachment ID
        attachment_id: String,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    match cli.command {
        Commands::Init { path } => {
            let workspace = Workspace::init(&path)?;
            output.success(&format!(
                "Initialized cascade workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Add {
            title,
            description,
            deadline,
            status,
            priority,
            category,
            assignee,
            creator,
        } => task::add(
            &output,
            &title,
            description.as_deref(),
            deadline.as_deref(),
            status,
            priority,
            category.as_deref(),
            assignee.as_deref(),
            creator.as_deref(),
        )?,

        Commands::List {
            status,
            priority,
            category,
            query,
        } => task::list(
            &output,
            status,
            priority,
            category.as_deref(),
            query.as_deref(),
        )?,

        Commands::Show { id } => task::show(&output, &id)?,

        Commands::Update {
            id,
            title,
            description,
            deadline,
            warning,
            urgency,
            status,
            priority,
            category,
            assignee,
        } => task::update(
            &output,
            &id,
            title.as_deref(),
            description.as_deref(),
            deadline.as_deref(),
            warning.as_deref(),
            urgency,
            status,
            priority,
            category.as_deref(),
            assignee.as_deref(),
        )?,

        Commands::Sub {
            parent,
            title,
            description,
            deadline,
        } => task::subtask(
            &output,
            &parent,
            &title,
            description.as_deref(),
            deadline.as_deref(),
        )?,

        Commands::Done { id, cause } => task::done(&output, &id, cause.as_deref())?,

        Commands::Reopen { id } => task::reopen(&output, &id)?,

        Commands::Dep { id, depends_on } => task::dep(&output, &id, &depends_on)?,

        Commands::Rm { id } => task::remove(&output, &id)?,

        Commands::Attach { id, file } => task::attach(&output, &id, &file)?,

        Commands::Detach { id, attachment_id } => task::detach(&output, &id, &attachment_id)?,
    }

    Ok(())
}
