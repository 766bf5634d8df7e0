use clap::{Arg, ArgAction, ArgMatches, Command};
use color_eyre::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    config::{resolve_data_dir, FileConfigStore},
    observability::TracingObserver,
    storage::{FileKeyValueStore, MemoryKeyValueStore},
    tui::{run_tui, App},
};
use application::{AppError, AppResult, Board, DragResult, DropLocation, TaskStore};
use domain::{parse_deadline, Priority, Status, TaskDraft, TaskId, TaskUpdate};
use ports::{AppConfig, ConfigResult, ConfigStore, KeyValueStore};

fn task_id_arg() -> Arg {
    Arg::new("task_id")
        .help("Task ID")
        .required(true)
        .index(1)
}

fn task_field_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("description")
                .long("description")
                .short('d')
                .value_name("TEXT")
                .help("Task description"),
        )
        .arg(
            Arg::new("priority")
                .long("priority")
                .short('p')
                .value_name("PRIORITY")
                .help("high, medium or low"),
        )
        .arg(
            Arg::new("status")
                .long("status")
                .short('s')
                .value_name("STATUS")
                .help("todo, in-progress or completed"),
        )
        .arg(
            Arg::new("deadline")
                .long("deadline")
                .value_name("YYYY-MM-DD")
                .help("Due date"),
        )
}

fn cli() -> Command {
    Command::new("taskboard")
        .version("0.1.0")
        .about("A keyboard-driven task board for the terminal")
        .long_about("A three-column task board (To Do, In Progress, Completed) with comments,\ndeadlines and a trash bin.\n\nRun without a subcommand to open the interactive board.")
        .arg(
            Arg::new("data_dir")
                .long("data-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory for task data (can also be set via TASKBOARD_DATA_DIR env var)")
                .global(true),
        )
        .arg(
            Arg::new("in_memory")
                .long("in-memory")
                .action(ArgAction::SetTrue)
                .help("Keep tasks in memory only; nothing is written to disk")
                .global(true),
        )
        .subcommand(
            Command::new("tasks")
                .about("Task operations")
                .subcommand(
                    Command::new("list").about("List tasks as JSON").arg(
                        Arg::new("status")
                            .long("status")
                            .short('s')
                            .value_name("STATUS")
                            .help("Only tasks with this status"),
                    ),
                )
                .subcommand(task_field_args(
                    Command::new("add").about("Create a task").arg(
                        Arg::new("title")
                            .help("Task title")
                            .required(true)
                            .index(1),
                    ),
                ))
                .subcommand(task_field_args(
                    Command::new("edit")
                        .about("Edit a task; unspecified fields are kept")
                        .arg(task_id_arg())
                        .arg(
                            Arg::new("title")
                                .long("title")
                                .short('t')
                                .value_name("TITLE")
                                .help("New title"),
                        )
                        .arg(
                            Arg::new("clear_deadline")
                                .long("clear-deadline")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("deadline")
                                .help("Remove the deadline"),
                        ),
                ))
                .subcommand(
                    Command::new("delete")
                        .about("Move a task to the trash")
                        .arg(task_id_arg()),
                )
                .subcommand(
                    Command::new("status")
                        .about("Change a task's status")
                        .arg(task_id_arg())
                        .arg(
                            Arg::new("status")
                                .help("todo, in-progress or completed")
                                .required(true)
                                .index(2),
                        ),
                )
                .subcommand(
                    Command::new("comment")
                        .about("Add a comment to a task")
                        .arg(task_id_arg())
                        .arg(
                            Arg::new("text")
                                .help("Comment text")
                                .required(true)
                                .index(2),
                        ),
                )
                .subcommand(
                    Command::new("move")
                        .about("Move a task to a column position")
                        .arg(task_id_arg())
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .value_name("STATUS")
                                .help("Destination column")
                                .required(true),
                        )
                        .arg(
                            Arg::new("index")
                                .long("index")
                                .value_name("N")
                                .value_parser(clap::value_parser!(usize))
                                .help("Position within the column (defaults to the end)"),
                        ),
                ),
        )
        .subcommand(Command::new("board").about("Print the board as text"))
        .subcommand(
            Command::new("trash")
                .about("Deleted task operations")
                .subcommand(Command::new("list").about("List deleted tasks as JSON"))
                .subcommand(
                    Command::new("restore")
                        .about("Put a deleted task back on the board")
                        .arg(task_id_arg()),
                )
                .subcommand(
                    Command::new("purge")
                        .about("Permanently delete a task from the trash")
                        .arg(task_id_arg()),
                )
                .subcommand(Command::new("empty").about("Permanently delete every task in the trash")),
        )
        .subcommand(
            Command::new("config")
                .about("Configuration")
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting and save it")
                        .arg(
                            Arg::new("key")
                                .help("data_dir, status_change_delay_ms, comment_author or log_level")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("value")
                                .help("New value")
                                .required(true)
                                .index(2),
                        ),
                ),
        )
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> AppResult<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| AppError::Application(format!("missing argument: {id}")))
}

fn task_id(matches: &ArgMatches) -> AppResult<TaskId> {
    Ok(required(matches, "task_id")?.into())
}

fn draft_from(matches: &ArgMatches) -> AppResult<TaskDraft> {
    let mut draft = TaskDraft::new(required(matches, "title")?);
    if let Some(description) = matches.get_one::<String>("description") {
        draft = draft.with_description(description.clone());
    }
    if let Some(priority) = matches.get_one::<String>("priority") {
        draft = draft.with_priority(priority.parse::<Priority>()?);
    }
    if let Some(status) = matches.get_one::<String>("status") {
        draft = draft.with_status(status.parse::<Status>()?);
    }
    if let Some(deadline) = matches.get_one::<String>("deadline") {
        draft = draft.with_deadline(parse_deadline(deadline)?);
    }
    draft.validate()?;
    Ok(draft)
}

fn update_from(matches: &ArgMatches) -> AppResult<TaskUpdate> {
    let mut update = TaskUpdate::new(task_id(matches)?);
    update.title = matches.get_one::<String>("title").cloned();
    update.description = matches.get_one::<String>("description").cloned();
    update.priority = matches
        .get_one::<String>("priority")
        .map(|p| p.parse::<Priority>())
        .transpose()?;
    update.status = matches
        .get_one::<String>("status")
        .map(|s| s.parse::<Status>())
        .transpose()?;
    if let Some(deadline) = matches.get_one::<String>("deadline") {
        update.deadline = Some(Some(parse_deadline(deadline)?));
    } else if matches.get_flag("clear_deadline") {
        update.deadline = Some(None);
    }
    update.validate()?;
    Ok(update)
}

/// `--data-dir` beats everything `resolve_data_dir` consults.
fn data_dir_for(matches: &ArgMatches, config: &AppConfig) -> ConfigResult<PathBuf> {
    match matches.get_one::<PathBuf>("data_dir") {
        Some(dir) => Ok(dir.clone()),
        None => resolve_data_dir(config),
    }
}

fn not_found(id: TaskId) -> color_eyre::Report {
    AppError::TaskNotFound(id).into()
}

fn run_tasks_command(store: &mut TaskStore, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => {
            let status = list_matches
                .get_one::<String>("status")
                .map(|s| s.parse::<Status>())
                .transpose()?;
            let tasks: Vec<_> = store
                .active()
                .iter()
                .filter(|t| status.map_or(true, |s| t.status == s))
                .collect();
            print_json(&tasks)
        }
        Some(("add", add_matches)) => {
            let task = store.create(draft_from(add_matches)?)?;
            print_json(&task)
        }
        Some(("edit", edit_matches)) => {
            let update = update_from(edit_matches)?;
            let id = update.id.clone();
            if update.is_empty() {
                return Err(AppError::Application("nothing to change".to_string()).into());
            }
            match store.update(update)? {
                Some(task) => print_json(&task),
                None => Err(not_found(id)),
            }
        }
        Some(("delete", delete_matches)) => {
            let id = task_id(delete_matches)?;
            if !store.delete(&id)? {
                return Err(not_found(id));
            }
            eprintln!("Moved {id} to trash");
            Ok(())
        }
        Some(("status", status_matches)) => {
            let id = task_id(status_matches)?;
            let status = required(status_matches, "status")?.parse::<Status>()?;
            if !store.change_status(&id, status)? {
                return Err(not_found(id));
            }
            match store.get(&id) {
                Some(task) => print_json(task),
                None => Err(not_found(id)),
            }
        }
        Some(("comment", comment_matches)) => {
            let id = task_id(comment_matches)?;
            let text = required(comment_matches, "text")?;
            if store.get(&id).is_none() {
                return Err(not_found(id));
            }
            match store.add_comment(&id, text)? {
                Some(comment) => print_json(&comment),
                None => Err(AppError::Application("comment text is empty".to_string()).into()),
            }
        }
        Some(("move", move_matches)) => {
            let id = task_id(move_matches)?;
            let to = required(move_matches, "to")?.parse::<Status>()?;
            let Some(task) = store.get(&id) else {
                return Err(not_found(id));
            };
            let column = Board::from_tasks(store.active());
            let source = DropLocation {
                status: task.status,
                index: column
                    .column(task.status)
                    .tasks
                    .iter()
                    .position(|t| t.id == id)
                    .unwrap_or_default(),
            };
            let index = move_matches
                .get_one::<usize>("index")
                .copied()
                .unwrap_or(column.column(to).len());
            let drag = DragResult {
                task_id: id.clone(),
                source,
                destination: Some(DropLocation { status: to, index }),
            };
            store.move_task(&drag)?;
            match store.get(&id) {
                Some(task) => print_json(task),
                None => Err(not_found(id)),
            }
        }
        _ => {
            eprintln!("❌ Unknown tasks subcommand");
            std::process::exit(1);
        }
    }
}

fn run_trash_command(store: &mut TaskStore, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => print_json(store.deleted()),
        Some(("restore", restore_matches)) => {
            let id = task_id(restore_matches)?;
            if !store.restore(&id)? {
                return Err(not_found(id));
            }
            match store.get(&id) {
                Some(task) => print_json(task),
                None => Err(not_found(id)),
            }
        }
        Some(("purge", purge_matches)) => {
            let id = task_id(purge_matches)?;
            if store.get_deleted(&id).is_none() || !store.purge_one(&id)? {
                return Err(not_found(id));
            }
            eprintln!("Permanently deleted {id}");
            Ok(())
        }
        Some(("empty", _)) => {
            let count = store.purge_all()?;
            eprintln!("Permanently deleted {count} tasks");
            Ok(())
        }
        _ => {
            eprintln!("❌ Unknown trash subcommand");
            std::process::exit(1);
        }
    }
}

async fn run_config_command(
    config_store: &FileConfigStore,
    mut config: AppConfig,
    data_dir: &std::path::Path,
    matches: &ArgMatches,
) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            println!("data_dir = {}", data_dir.display());
            println!("status_change_delay_ms = {}", config.status_change_delay_ms);
            println!("comment_author = {}", config.comment_author);
            println!("log_level = {}", config.log_level);
            Ok(())
        }
        Some(("set", set_matches)) => {
            config.set(required(set_matches, "key")?, required(set_matches, "value")?)?;
            config_store.save_config(&config).await?;
            Ok(())
        }
        _ => {
            eprintln!("❌ Unknown config subcommand");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    let matches = cli().get_matches();

    // Load configuration
    let config_store = FileConfigStore::new()?;
    let config = config_store.load_config().await?;

    let data_dir = data_dir_for(&matches, &config)?;
    std::fs::create_dir_all(&data_dir)?;

    // Initialize logging to file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("taskboard.log"))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_max_level(
            config
                .log_level
                .parse::<tracing::Level>()
                .unwrap_or(tracing::Level::INFO),
        )
        .init();

    if let Some(("config", config_matches)) = matches.subcommand() {
        return run_config_command(&config_store, config, &data_dir, config_matches).await;
    }

    // Create dependencies
    let kv: Arc<dyn KeyValueStore> = if matches.get_flag("in_memory") {
        tracing::info!("using in-memory storage");
        Arc::new(MemoryKeyValueStore::new())
    } else {
        tracing::info!(dir = %data_dir.display(), "using file storage");
        Arc::new(FileKeyValueStore::new(&data_dir))
    };

    let mut store = TaskStore::open(kv, Arc::new(TracingObserver))?
        .with_comment_author(config.comment_author.clone());

    // Handle subcommands
    match matches.subcommand() {
        Some(("tasks", tasks_matches)) => run_tasks_command(&mut store, tasks_matches)?,
        Some(("trash", trash_matches)) => run_trash_command(&mut store, trash_matches)?,
        Some(("board", _)) => print!("{}", Board::from_tasks(store.active()).render_text()),
        None => {
            // Default behavior - run TUI
            let app = App::new(store, Duration::from_millis(config.status_change_delay_ms));

            if let Err(e) = run_tui(app).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("❌ Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}
