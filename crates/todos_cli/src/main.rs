//! `todos` command-line front end.
//!
//! Usage:
//!   todos lists                       - Show every list, open ones first
//!   todos new-list <title>            - Create a list
//!   todos add <list> <title>          - Add a todo to a list
//!   todos check <list> <todo>         - Mark a todo completed
//!   todos --session <file> <command>  - Run against a session file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use todos_core::{
    init_logging_from_config, sort_todos_completed_last, Backend, RecordId, ServiceError,
    Session, SessionStore, StoreConfig, TodoList, TodoService, TodoStore,
};

/// Session file used when `TODOS_BACKEND=session` and no `--session` is given.
const DEFAULT_SESSION_FILE: &str = "todos-session.json";

#[derive(Parser)]
#[command(name = "todos")]
#[command(about = "Keep todo lists in a database or a session file")]
#[command(version)]
struct Cli {
    /// Store lists in this session file instead of the database
    #[arg(long, global = true, value_name = "FILE")]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every list, open ones first
    Lists,
    /// Show one list and its todos
    Show { list: RecordId },
    /// Create a list
    NewList { title: String },
    /// Rename a list
    Rename { list: RecordId, title: String },
    /// Delete a list and all of its todos
    DeleteList { list: RecordId },
    /// Add a todo to a list
    Add { list: RecordId, title: String },
    /// Remove a todo from a list
    Remove { list: RecordId, todo: RecordId },
    /// Mark a todo completed
    Check { list: RecordId, todo: RecordId },
    /// Mark a todo open again
    Uncheck { list: RecordId, todo: RecordId },
    /// Mark every todo in a list completed
    CompleteAll { list: RecordId },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::Show { .. } => "show",
            Self::NewList { .. } => "new-list",
            Self::Rename { .. } => "rename",
            Self::DeleteList { .. } => "delete-list",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Check { .. } => "check",
            Self::Uncheck { .. } => "uncheck",
            Self::CompleteAll { .. } => "complete-all",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = StoreConfig::from_env().context("reading configuration")?;
    init_logging_from_config(&config).context("starting logger")?;

    let session_path = cli.session.clone().or_else(|| match config.backend {
        Backend::Session => Some(PathBuf::from(DEFAULT_SESSION_FILE)),
        Backend::Database => None,
    });

    match session_path {
        Some(path) => run_with_session(&path, cli.command),
        None => {
            let store = config.open_database().with_context(|| {
                format!(
                    "opening database `{}`",
                    config.database_path.display()
                )
            })?;
            let mut service = TodoService::new(store);
            finish(run(&mut service, cli.command))
        }
    }
}

fn run_with_session(path: &Path, command: Command) -> Result<()> {
    let mut session = Session::load(path)
        .with_context(|| format!("loading session `{}`", path.display()))?;

    let outcome = {
        let mut service = TodoService::new(SessionStore::new(&mut session));
        run(&mut service, command)
    };

    if session.is_modified() {
        session
            .save(path)
            .with_context(|| format!("saving session `{}`", path.display()))?;
        session.clear_modified();
    }
    finish(outcome)
}

fn finish(outcome: Result<(), ServiceError>) -> Result<()> {
    outcome.map_err(|err| {
        error!("event=cli_command module=cli status=error error={err}");
        let message = err.user_message();
        anyhow::Error::new(err).context(message)
    })
}

fn run<S: TodoStore>(service: &mut TodoService<S>, command: Command) -> Result<(), ServiceError> {
    info!(
        "event=cli_command module=cli backend={} command={}",
        service.store().backend_name(),
        command.name()
    );

    match command {
        Command::Lists => {
            let lists = service.lists()?;
            if lists.is_empty() {
                println!("No lists yet.");
            }
            for list in &lists {
                print_list_summary(list);
            }
        }
        Command::Show { list } => {
            let list = service.list(&list)?;
            print_list_summary(&list);
            let mut todos = list.todos;
            sort_todos_completed_last(&mut todos);
            for todo in &todos {
                let mark = if todo.completed { 'x' } else { ' ' };
                println!("  [{mark}] {}  {}", todo.id, todo.title);
            }
        }
        Command::NewList { title } => {
            let id = service.create_list(&title)?;
            println!("The list has been created. ({id})");
        }
        Command::Rename { list, title } => {
            service.rename_list(&list, &title)?;
            println!("The list has been updated.");
        }
        Command::DeleteList { list } => {
            service.delete_list(&list)?;
            println!("The list has been deleted.");
        }
        Command::Add { list, title } => {
            let id = service.add_todo(&list, &title)?;
            println!("The todo was added. ({id})");
        }
        Command::Remove { list, todo } => {
            service.delete_todo(&list, &todo)?;
            println!("The todo has been deleted.");
        }
        Command::Check { list, todo } => {
            service.set_todo_completed(&list, &todo, true)?;
            println!("The todo has been updated.");
        }
        Command::Uncheck { list, todo } => {
            service.set_todo_completed(&list, &todo, false)?;
            println!("The todo has been updated.");
        }
        Command::CompleteAll { list } => {
            service.complete_all(&list)?;
            println!("All todos have been completed.");
        }
    }
    Ok(())
}

fn print_list_summary(list: &TodoList) {
    let mark = if list.is_completed() { 'x' } else { ' ' };
    println!(
        "[{mark}] {}  {} ({}/{})",
        list.id,
        list.title,
        list.todos_remaining(),
        list.todos_count()
    );
}
