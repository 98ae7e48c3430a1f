//! CLI argument parsing for task-cli.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use task_cli::{Status, parse_id};

#[derive(Parser)]
#[command(
    name = "task-cli",
    about = "Track tasks in a local JSON file",
    version = env!("GIT_DESCRIBE"),
    arg_required_else_help = true,
    after_help = "Logs are written to: ~/.local/share/task-cli/logs/task-cli.log"
)]
pub struct Cli {
    /// Path to the task store (default: ./tasks.json, or `file:` in config.yaml)
    #[arg(short, long, global = true, env = "TASK_CLI_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a new task
    Add {
        /// Task description
        description: String,
    },

    /// Change a task's description
    Update {
        /// Task ID
        #[arg(value_parser = parse_id)]
        id: u64,

        /// New description
        description: String,
    },

    /// Delete a task (deleting a missing task is not an error)
    Delete {
        /// Task ID
        #[arg(value_parser = parse_id)]
        id: u64,
    },

    /// Mark a task as in progress
    MarkInProgress {
        /// Task ID
        #[arg(value_parser = parse_id)]
        id: u64,
    },

    /// Mark a task as done
    MarkDone {
        /// Task ID
        #[arg(value_parser = parse_id)]
        id: u64,
    },

    /// Move a task back to todo
    MarkTodo {
        /// Task ID
        #[arg(value_parser = parse_id)]
        id: u64,
    },

    /// List tasks, optionally only those with a given status
    List {
        /// Status filter (todo, in_progress, done; case-insensitive)
        status: Option<Status>,

        /// Also show created/updated timestamps
        #[arg(short, long)]
        long: bool,
    },

    /// Show a single task
    Show {
        /// Task ID
        #[arg(value_parser = parse_id)]
        id: u64,
    },
}
