mod settings;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_store::BoardStore;
use crate::io::config_io;
use crate::io::paths::resolve_data_dir;
use crate::io::store::KvStore;
use crate::model::config::AppConfig;
use crate::model::draft::{TaskDraft, TaskPatch};
use crate::model::task::{Task, timestamp_now};
use crate::ops::board_ops::{self, BoardCommand};
use crate::ops::columns::partition;
use crate::ops::drag;
use crate::ops::filter::Filters;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        None => crate::tui::run(&data_dir),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&data_dir, args, json),
            Commands::Board => cmd_board(&data_dir, json),
            Commands::Show(args) => cmd_show(&data_dir, args, json),

            // Write commands
            Commands::Add(args) => cmd_add(&data_dir, args, json),
            Commands::Edit(args) => cmd_edit(&data_dir, args, json),
            Commands::Delete(args) => cmd_delete(&data_dir, args),
            Commands::Done(args) => cmd_done(&data_dir, args, json),
            Commands::Mv(args) => cmd_mv(&data_dir, args, json),
            Commands::Sub(args) => cmd_sub(&data_dir, args, json),

            // Profile and settings
            Commands::Name(args) => settings::cmd_name(&data_dir, args, json),
            Commands::Theme(args) => settings::cmd_theme(&data_dir, args, json),
            Commands::Config(args) => settings::cmd_config(&data_dir, args, json),
            Commands::Recovery(args) => settings::cmd_recovery(&data_dir, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the board, reporting anything the load had to upgrade or set aside.
fn open_board(data_dir: &Path) -> BoardStore {
    let (store, report) = BoardStore::load(KvStore::open(data_dir), timestamp_now());
    if report.dropped > 0 {
        eprintln!(
            "warning: {} unreadable task record(s) moved to the recovery log (see `tb recovery`)",
            report.dropped
        );
    }
    store
}

/// Run a command and fail if the result could not be written to disk.
fn apply(store: &mut BoardStore, command: BoardCommand) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let (_, created) = store.apply(command, timestamp_now());
    check_saved(store)?;
    Ok(created)
}

fn check_saved(store: &mut BoardStore) -> CmdResult {
    match store.take_save_error() {
        Some(e) => Err(format!(
            "could not save board: {} (unsaved data kept in the recovery log)",
            e
        )
        .into()),
        None => Ok(()),
    }
}

fn resolve(store: &BoardStore, query: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(board_ops::resolve_task_id(store.tasks(), query)?)
}

fn task<'a>(store: &'a BoardStore, id: &str) -> Result<&'a Task, Box<dyn std::error::Error>> {
    store
        .find(id)
        .ok_or_else(|| format!("task not found: {}", id).into())
}

fn print_task_json(task: &Task) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(task)?);
    Ok(())
}

fn load_config(data_dir: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(config_io::load_config(data_dir)?)
}

pub(crate) fn data_dir_display(data_dir: &Path) -> PathBuf {
    std::fs::canonicalize(data_dir).unwrap_or_else(|_| data_dir.to_path_buf())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data_dir: &Path, args: ListArgs, json: bool) -> CmdResult {
    let store = open_board(data_dir);
    let filters = Filters {
        status: args.status.unwrap_or_default(),
        category: args.category,
    };
    let columns = partition(store.tasks());
    let tasks: Vec<&Task> = columns
        .iter()
        .filter(|(stage, _)| args.stage.is_none_or(|s| s == *stage))
        .flat_map(|(_, tasks)| tasks.iter().copied())
        .filter(|t| filters.matches(t))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        for task in tasks {
            println!("{}", format_list_line(task));
        }
    }
    Ok(())
}

fn cmd_board(data_dir: &Path, json: bool) -> CmdResult {
    let store = open_board(data_dir);
    let columns = partition(store.tasks());
    if json {
        println!("{}", serde_json::to_string_pretty(&board_to_json(&columns))?);
    } else {
        println!("{}", store.profile().greeting());
        println!();
        for line in format_board(&columns) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(data_dir: &Path, args: IdArg, json: bool) -> CmdResult {
    let store = open_board(data_dir);
    let id = resolve(&store, &args.id)?;
    let task = task(&store, &id)?;
    if json {
        print_task_json(task)?;
    } else {
        for line in format_task_detail(task) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let config = load_config(data_dir)?;
    let draft = TaskDraft {
        title: args.title,
        description: args.desc.unwrap_or_default(),
        category: args.category.unwrap_or(config.board.default_category),
        priority: args.priority.unwrap_or(config.board.default_priority),
        stage: None,
        subtasks: None,
    };
    if !draft.is_valid() {
        return Err("title cannot be empty".into());
    }

    let mut store = open_board(data_dir);
    let stage = args.stage.unwrap_or(config.board.default_stage);
    let id = apply(
        &mut store,
        BoardCommand::Add {
            draft,
            stage: Some(stage),
        },
    )?
    .ok_or("title cannot be empty")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&CreatedJson { id })?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_edit(data_dir: &Path, args: EditArgs, json: bool) -> CmdResult {
    let patch = TaskPatch {
        title: args.title,
        description: args.desc,
        category: args.category,
        priority: args.priority,
        stage: args.stage,
        subtasks: None,
    };
    if !patch.is_valid() {
        return Err("title cannot be empty".into());
    }
    if patch.is_empty() {
        return Err("nothing to change (use --title, --desc, --category, --priority or --stage)".into());
    }

    let mut store = open_board(data_dir);
    let id = resolve(&store, &args.id)?;
    apply(&mut store, BoardCommand::Update { id: id.clone(), patch })?;
    if json {
        print_task_json(task(&store, &id)?)?;
    }
    Ok(())
}

fn cmd_delete(data_dir: &Path, args: DeleteArgs) -> CmdResult {
    let config = load_config(data_dir)?;
    let mut store = open_board(data_dir);
    let id = resolve(&store, &args.id)?;
    if !args.yes && config.board.confirm_delete {
        let title = &task(&store, &id)?.title;
        return Err(format!(
            "refusing to delete \"{}\" without --yes (deleted tasks are kept in the recovery log)",
            title
        )
        .into());
    }
    apply(&mut store, BoardCommand::Delete { id: id.clone() })?;
    println!("deleted {}", short_id(&id));
    Ok(())
}

fn cmd_done(data_dir: &Path, args: IdArg, json: bool) -> CmdResult {
    let mut store = open_board(data_dir);
    let id = resolve(&store, &args.id)?;
    apply(&mut store, BoardCommand::ToggleDone { id: id.clone() })?;
    let task = task(&store, &id)?;
    if json {
        print_task_json(task)?;
    } else {
        println!("{} → {}", short_id(&id), task.stage.label());
    }
    Ok(())
}

fn cmd_mv(data_dir: &Path, args: MvArgs, json: bool) -> CmdResult {
    let mut store = open_board(data_dir);
    let id = resolve(&store, &args.id)?;
    let position = args.position.unwrap_or(usize::MAX);
    let next = drag::move_task(store.tasks(), &id, args.stage, position, timestamp_now())
        .ok_or_else(|| format!("task not found: {}", id))?;
    apply(&mut store, BoardCommand::Replace(next))?;

    let (stage, index) =
        drag::locate(store.tasks(), &id).ok_or_else(|| format!("task not found: {}", id))?;
    if json {
        print_task_json(task(&store, &id)?)?;
    } else {
        println!("{} → {} #{}", short_id(&id), stage.label(), index);
    }
    Ok(())
}

fn cmd_sub(data_dir: &Path, args: SubCmd, json: bool) -> CmdResult {
    let mut store = open_board(data_dir);
    match args.action {
        SubAction::Add(a) => {
            let id = resolve(&store, &a.id)?;
            if a.title.trim().is_empty() {
                return Err("title cannot be empty".into());
            }
            apply(
                &mut store,
                BoardCommand::AddSubtask {
                    todo_id: id.clone(),
                    title: a.title,
                },
            )?;
            let sub = task(&store, &id)?
                .subtasks
                .last()
                .ok_or("sub-task was not added")?;
            if json {
                println!("{}", serde_json::to_string_pretty(sub)?);
            } else {
                println!("{}", sub.id);
            }
        }
        SubAction::Rm(a) => {
            let id = resolve(&store, &a.id)?;
            let sub_id = board_ops::resolve_subtask_id(task(&store, &id)?, &a.sub_id)?;
            apply(
                &mut store,
                BoardCommand::RemoveSubtask {
                    todo_id: id.clone(),
                    subtask_id: sub_id,
                },
            )?;
            if json {
                print_task_json(task(&store, &id)?)?;
            }
        }
        SubAction::Toggle(a) => {
            let id = resolve(&store, &a.id)?;
            let sub_id = board_ops::resolve_subtask_id(task(&store, &id)?, &a.sub_id)?;
            apply(
                &mut store,
                BoardCommand::ToggleSubtask {
                    todo_id: id.clone(),
                    subtask_id: sub_id.clone(),
                },
            )?;
            let parent = task(&store, &id)?;
            if json {
                print_task_json(parent)?;
            } else if let Some(sub) = parent.subtasks.iter().find(|s| s.id == sub_id) {
                println!("{}", format_subtask_line(sub));
            }
        }
    }
    Ok(())
}
