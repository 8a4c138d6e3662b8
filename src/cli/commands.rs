use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::task::{Category, Priority, Stage};
use crate::ops::filter::StatusFilter;

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - a kanban board in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $TB_DATA_DIR or ~/.taskboard)
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task (top of its column)
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Print the board, one column per stage
    Board,
    /// Show task details
    Show(IdArg),
    /// Edit task fields
    Edit(EditArgs),
    /// Permanently delete a task
    Delete(DeleteArgs),
    /// Toggle a task between done and not done
    Done(IdArg),
    /// Move a task to a stage and position
    Mv(MvArgs),
    /// Manage a task's sub-tasks
    Sub(SubCmd),
    /// Show or set your display name
    Name(NameArgs),
    /// Show or set the color theme
    Theme(ThemeArgs),
    /// Show configuration, or change a value
    Config(ConfigCmd),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Task ID (any unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Description
    #[arg(long, short)]
    pub desc: Option<String>,
    /// Category (work, personal, shopping, learning, health, other)
    #[arg(long, short)]
    pub category: Option<Category>,
    /// Priority (low, medium, high, critical)
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// Column to create the task in (default: backlog)
    #[arg(long, short)]
    pub stage: Option<Stage>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by completion (all, active, completed)
    #[arg(long)]
    pub status: Option<StatusFilter>,
    /// Filter by category
    #[arg(long)]
    pub category: Option<Category>,
    /// Only show one column
    #[arg(long)]
    pub stage: Option<Stage>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (any unique prefix)
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long, short)]
    pub desc: Option<String>,
    /// New category
    #[arg(long, short)]
    pub category: Option<Category>,
    /// New priority
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// New stage (the task keeps its position in the collection)
    #[arg(long, short)]
    pub stage: Option<Stage>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ID (any unique prefix)
    pub id: String,
    /// Confirm the deletion
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID (any unique prefix)
    pub id: String,
    /// Target stage (backlog, todo, in-progress, done)
    pub stage: Stage,
    /// Position in the target column, 0 = top (default: bottom)
    pub position: Option<usize>,
}

// ---------------------------------------------------------------------------
// Sub-tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Append a sub-task
    Add(SubAddArgs),
    /// Remove a sub-task
    Rm(SubIdArgs),
    /// Toggle a sub-task's completion
    Toggle(SubIdArgs),
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Parent task ID
    pub id: String,
    /// Sub-task title
    pub title: String,
}

#[derive(Args)]
pub struct SubIdArgs {
    /// Parent task ID
    pub id: String,
    /// Sub-task ID (any unique prefix)
    pub sub_id: String,
}

// ---------------------------------------------------------------------------
// Profile and settings
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NameArgs {
    /// New display name (omit to show the current one)
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// light, dark or toggle (omit to show the current theme)
    pub value: Option<String>,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a value, e.g. `tb config set board.default_stage todo`
    Set(ConfigSetArgs),
    /// Print the absolute path to config.toml
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Dotted key (board.default_category, board.default_priority,
    /// board.default_stage, board.confirm_delete, ui.show_key_hints,
    /// ui.colors.<light|dark>.<slot>)
    pub key: String,
    /// New value
    pub value: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
