//! task-cli - track tasks in a local JSON file.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use task_cli::config::APP_DIR;
use task_cli::{Config, Repository, RepositoryLifecycleExt, Status, Task};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("task-cli.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn format_status(status: Status) -> ColoredString {
    match status {
        Status::Todo => "todo".green(),
        Status::InProgress => "in_progress".yellow(),
        Status::Done => "done".blue(),
    }
}

fn format_timestamp(ts: Option<chrono::DateTime<chrono::Utc>>, missing: &str) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| missing.to_string())
}

fn print_task_line(task: &Task, long: bool) {
    if long {
        println!(
            "{} {} {} {} {}",
            task.id.to_string().cyan(),
            format_status(task.status),
            format!("created {}", format_timestamp(task.created_at, "unknown")).dimmed(),
            format!("updated {}", format_timestamp(task.updated_at, "never")).dimmed(),
            task.description
        );
    } else {
        println!(
            "{} {} {}",
            task.id.to_string().cyan(),
            format_status(task.status),
            task.description
        );
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.file).context("Failed to resolve configuration")?;
    let mut repo = Repository::open(&config).context("Failed to open task store")?;

    if let Some(diagnostic) = repo.recovered_from_corruption() {
        eprintln!("{} {}", "Warning:".yellow().bold(), diagnostic);
    }

    match cli.command {
        Command::Add { description } => {
            let id = repo.create(&description)?;
            println!("{} Task added successfully (ID: {})", "✓".green(), id.to_string().cyan());
        }

        Command::Update { id, description } => {
            let task = repo.update(id, &description)?;
            println!("{} Updated: {} {}", "✓".green(), task.id.to_string().cyan(), task.description);
        }

        Command::Delete { id } => {
            if repo.delete(id)? {
                println!("{} Deleted task {}", "✓".green(), id.to_string().cyan());
            } else {
                println!("{}", format!("No task with ID {}, nothing to delete", id).dimmed());
            }
        }

        Command::MarkInProgress { id } => {
            let task = repo.start(id)?;
            println!("{} Started: {} {}", "→".blue(), task.id.to_string().cyan(), task.description);
        }

        Command::MarkDone { id } => {
            let task = repo.complete(id)?;
            println!("{} Done: {} {}", "✓".green(), task.id.to_string().cyan(), task.description);
        }

        Command::MarkTodo { id } => {
            let task = repo.reopen(id)?;
            println!("{} Reopened: {} {}", "↺".yellow(), task.id.to_string().cyan(), task.description);
        }

        Command::List { status, long } => {
            let tasks: Vec<&Task> = match status {
                Some(status) => repo.list_by_status(status),
                None => repo.list().iter().collect(),
            };

            if tasks.is_empty() {
                match status {
                    Some(status) => println!("{}", format!("No tasks with status {}", status).dimmed()),
                    None => println!("{}", "No tasks found".dimmed()),
                }
            } else {
                for task in tasks {
                    print_task_line(task, long);
                }
            }
        }

        Command::Show { id } => {
            let task = repo.get(id)?;
            println!("{}: {}", "ID".bold(), task.id.to_string().cyan());
            println!("{}: {}", "Description".bold(), task.description);
            println!("{}: {}", "Status".bold(), format_status(task.status));
            println!("{}: {}", "Created".bold(), format_timestamp(task.created_at, "unknown"));
            println!("{}: {}", "Updated".bold(), format_timestamp(task.updated_at, "never"));
        }
    }

    Ok(())
}

fn main() {
    // The command still runs if the log file cannot be opened
    let _ = setup_logging();

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
