use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::board_store::BoardStore;
use crate::io::config_io::load_config_or_default;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::KvStore;
use crate::model::config::AppConfig;
use crate::model::draft::{TaskDraft, TaskPatch};
use crate::model::task::{Category, Priority, Stage, SubTask, Task, timestamp_now};
use crate::ops::board_ops::BoardCommand;
use crate::ops::columns::{ColumnCache, partition};
use crate::ops::drag::{self, DragCoordinator};
use crate::ops::filter::Filters;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// A card is picked up and follows the arrow keys until dropped
    Move,
    /// Add/edit form
    Edit,
    /// Single-line prompt (name, new sub-task)
    Prompt,
    Confirm,
}

/// A card being carried in MOVE mode.
///
/// The target is a slot in the unfiltered destination column with the card
/// itself already taken out, so `target_index` ranges over `0..=len`.
#[derive(Debug, Clone)]
pub struct MoveState {
    pub task_id: String,
    pub target_stage: Stage,
    pub target_index: usize,
    /// Filters in effect when the card was picked up, restored afterwards
    pub saved_filters: Filters,
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    Add,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Category,
    Priority,
    Stage,
    Subtasks,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Title,
        FormField::Description,
        FormField::Category,
        FormField::Priority,
        FormField::Stage,
        FormField::Subtasks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Notes",
            FormField::Category => "Category",
            FormField::Priority => "Priority",
            FormField::Stage => "Stage",
            FormField::Subtasks => "Sub-tasks",
        }
    }

    /// Fields that take typed text
    pub fn is_text(self) -> bool {
        matches!(
            self,
            FormField::Title | FormField::Description | FormField::Subtasks
        )
    }

    pub fn next(self) -> Self {
        step(&FormField::ALL, self, true)
    }

    pub fn prev(self) -> Self {
        step(&FormField::ALL, self, false)
    }
}

/// The neighbour of `current` in `all`, wrapping at both ends
pub fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let pos = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    all[next]
}

/// State of the add/edit dialog
#[derive(Debug, Clone)]
pub struct FormState {
    pub target: FormTarget,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub stage: Stage,
    pub subtasks: Vec<SubTask>,
    /// Title of the sub-task being typed
    pub subtask_input: String,
    /// Selected row in the sub-task list
    pub subtask_cursor: usize,
    pub field: FormField,
    /// Byte offset in the focused text field
    pub cursor: usize,
    pub error: Option<String>,
}

impl FormState {
    /// Empty form creating a card in `stage`, seeded with the configured defaults
    pub fn for_add(stage: Stage, config: &AppConfig) -> Self {
        FormState {
            target: FormTarget::Add,
            title: String::new(),
            description: String::new(),
            category: config.board.default_category,
            priority: config.board.default_priority,
            stage,
            subtasks: Vec::new(),
            subtask_input: String::new(),
            subtask_cursor: 0,
            field: FormField::Title,
            cursor: 0,
            error: None,
        }
    }

    pub fn for_edit(task: &Task) -> Self {
        FormState {
            target: FormTarget::Edit {
                id: task.id.clone(),
            },
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category,
            priority: task.priority,
            stage: task.stage,
            subtasks: task.subtasks.clone(),
            subtask_input: String::new(),
            subtask_cursor: 0,
            field: FormField::Title,
            cursor: task.title.len(),
            error: None,
        }
    }

    /// The focused text buffer, if the focused field takes text
    pub fn text(&self) -> Option<&String> {
        match self.field {
            FormField::Title => Some(&self.title),
            FormField::Description => Some(&self.description),
            FormField::Subtasks => Some(&self.subtask_input),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Subtasks => Some(&mut self.subtask_input),
            _ => None,
        }
    }

    /// Move focus, placing the cursor at the end of the new field's text
    pub fn focus(&mut self, field: FormField) {
        self.field = field;
        self.cursor = self.text().map_or(0, |t| t.len());
    }

    /// The command this form submits; `None` while the title is blank
    pub fn to_command(&self) -> Option<BoardCommand> {
        match &self.target {
            FormTarget::Add => {
                let draft = TaskDraft {
                    title: self.title.clone(),
                    description: self.description.clone(),
                    category: self.category,
                    priority: self.priority,
                    stage: None,
                    subtasks: Some(self.subtasks.clone()),
                };
                draft.is_valid().then_some(BoardCommand::Add {
                    draft,
                    stage: Some(self.stage),
                })
            }
            FormTarget::Edit { id } => {
                let patch = TaskPatch {
                    title: Some(self.title.clone()),
                    description: Some(self.description.clone()),
                    category: Some(self.category),
                    priority: Some(self.priority),
                    stage: Some(self.stage),
                    subtasks: Some(self.subtasks.clone()),
                };
                patch.is_valid().then(|| BoardCommand::Update {
                    id: id.clone(),
                    patch,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt and confirmation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    Name,
    Subtask { todo_id: String },
}

#[derive(Debug, Clone)]
pub struct PromptState {
    pub purpose: PromptPurpose,
    pub buffer: String,
    pub cursor: usize,
    pub error: Option<String>,
}

impl PromptState {
    pub fn new(purpose: PromptPurpose, initial: &str) -> Self {
        PromptState {
            purpose,
            buffer: initial.to_string(),
            cursor: initial.len(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask { id: String, title: String },
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Main application state
pub struct App {
    pub store: BoardStore,
    pub config: AppConfig,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    /// Column with keyboard focus
    pub focused: Stage,
    /// Cursor row per column, indexing the filtered column
    pub cursors: [usize; 4],
    /// First visible card per column
    pub scroll: [usize; 4],
    pub filters: Filters,
    pub columns: ColumnCache,
    pub drag: DragCoordinator,
    pub move_state: Option<MoveState>,
    pub form: Option<FormState>,
    pub prompt: Option<PromptState>,
    pub confirm: Option<ConfirmAction>,
    pub show_help: bool,
    /// Session override of `ui.show_key_hints`
    pub key_hints_override: Option<bool>,
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

impl App {
    pub fn new(store: BoardStore, config: AppConfig) -> Self {
        let theme = Theme::from_config(store.theme(), &config.ui);
        let needs_name = store.profile().needs_name();
        let mut app = App {
            store,
            config,
            theme,
            mode: Mode::Navigate,
            should_quit: false,
            focused: Stage::Backlog,
            cursors: [0; 4],
            scroll: [0; 4],
            filters: Filters::default(),
            columns: ColumnCache::new(),
            drag: DragCoordinator::new(),
            move_state: None,
            form: None,
            prompt: None,
            confirm: None,
            show_help: false,
            key_hints_override: None,
            status_message: None,
            status_is_error: false,
        };
        if needs_name {
            app.open_prompt(PromptPurpose::Name, "");
        }
        app
    }

    /// Collection indices of the cards shown in `stage`, in display order
    pub fn visible(&mut self, stage: Stage) -> Vec<usize> {
        let tasks = self.store.tasks();
        self.columns
            .column(self.store.revision(), tasks, stage)
            .iter()
            .copied()
            .filter(|&i| self.filters.matches(&tasks[i]))
            .collect()
    }

    pub fn cursor_task(&mut self) -> Option<&Task> {
        let visible = self.visible(self.focused);
        let index = *visible.get(self.cursors[self.focused.index()])?;
        self.store.tasks().get(index)
    }

    pub fn cursor_task_id(&mut self) -> Option<String> {
        self.cursor_task().map(|t| t.id.clone())
    }

    /// Keep every cursor on an existing card
    pub fn clamp_cursors(&mut self) {
        for stage in Stage::ALL {
            let len = self.visible(stage).len();
            let cursor = &mut self.cursors[stage.index()];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
    }

    /// Focus the card with `id`, if it is visible under the current filters
    pub fn focus_task(&mut self, id: &str) {
        let Some(stage) = self.store.find(id).map(|t| t.stage) else {
            return;
        };
        let visible = self.visible(stage);
        let tasks = self.store.tasks();
        if let Some(pos) = visible.iter().position(|&i| tasks[i].id == id) {
            self.focused = stage;
            self.cursors[stage.index()] = pos;
        }
    }

    pub fn key_hints_visible(&self) -> bool {
        self.key_hints_override
            .unwrap_or(self.config.ui.show_key_hints)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = true;
    }

    /// Apply a board command and surface a failed save in the status row.
    /// Returns the id of a created task.
    pub fn dispatch(&mut self, command: BoardCommand) -> Option<String> {
        let (changed, created) = self.store.apply(command, timestamp_now());
        if let Some(err) = self.store.take_save_error() {
            self.set_error(format!("could not save: {} (kept in recovery log)", err));
        }
        if changed {
            self.clamp_cursors();
        }
        created
    }

    // -----------------------------------------------------------------------
    // Dialogs
    // -----------------------------------------------------------------------

    pub fn open_prompt(&mut self, purpose: PromptPurpose, initial: &str) {
        self.prompt = Some(PromptState::new(purpose, initial));
        self.mode = Mode::Prompt;
    }

    pub fn open_add_form(&mut self) {
        self.form = Some(FormState::for_add(self.focused, &self.config));
        self.mode = Mode::Edit;
    }

    pub fn open_edit_form(&mut self) {
        if let Some(form) = self.cursor_task().map(FormState::for_edit) {
            self.form = Some(form);
            self.mode = Mode::Edit;
        }
    }

    pub fn close_dialog(&mut self) {
        self.form = None;
        self.prompt = None;
        self.confirm = None;
        self.mode = Mode::Navigate;
    }

    pub fn toggle_theme(&mut self) {
        let next = self.theme.preference.toggle();
        if let Err(e) = self.store.set_theme(next) {
            self.set_error(format!("could not save theme: {}", e));
        }
        self.theme = Theme::from_config(next, &self.config.ui);
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    /// Pick up the focused card. Filters are lifted while it is carried so
    /// positions refer to whole columns.
    pub fn begin_move(&mut self) {
        let Some(id) = self.cursor_task_id() else {
            return;
        };
        let Some((stage, index)) = drag::locate(self.store.tasks(), &id) else {
            return;
        };
        let saved_filters = self.filters;
        self.filters.clear();
        self.drag.begin(stage, index);
        self.move_state = Some(MoveState {
            task_id: id,
            target_stage: stage,
            target_index: index,
            saved_filters,
        });
        self.mode = Mode::Move;
    }

    /// Number of slots in `stage` with the carried card taken out
    pub fn move_slots(&self, stage: Stage) -> usize {
        let Some(ms) = &self.move_state else {
            return 0;
        };
        let len = self
            .store
            .tasks()
            .iter()
            .filter(|t| t.stage == stage && t.id != ms.task_id)
            .count();
        len + 1
    }

    /// The board as it would look if the card were dropped now
    pub fn move_preview(&self) -> Option<Vec<Task>> {
        let ms = self.move_state.as_ref()?;
        let mut drag = self.drag.clone();
        drag.drop_at(
            self.store.tasks(),
            ms.target_stage,
            ms.target_index,
            timestamp_now(),
        )
    }

    pub fn commit_move(&mut self) {
        let Some(ms) = self.move_state.take() else {
            return;
        };
        let dropped = self.drag.drop_at(
            self.store.tasks(),
            ms.target_stage,
            ms.target_index,
            timestamp_now(),
        );
        self.filters = ms.saved_filters;
        self.mode = Mode::Navigate;
        match dropped {
            Some(tasks) => {
                self.dispatch(BoardCommand::Replace(tasks));
                self.focus_task(&ms.task_id);
            }
            None => self.set_error("that card is no longer on the board"),
        }
        self.clamp_cursors();
    }

    pub fn cancel_move(&mut self) {
        self.drag.cancel();
        if let Some(ms) = self.move_state.take() {
            self.filters = ms.saved_filters;
            self.focus_task(&ms.task_id);
        }
        self.mode = Mode::Navigate;
    }

    /// Move the focused card to the end of the neighbouring column in one step
    pub fn shift_card(&mut self, forward: bool) {
        let Some(task) = self.cursor_task() else {
            return;
        };
        let target = if forward {
            task.stage.next()
        } else {
            task.stage.prev()
        };
        if target == task.stage {
            return;
        }
        let id = task.id.clone();
        if let Some(next) =
            drag::move_task(self.store.tasks(), &id, target, usize::MAX, timestamp_now())
        {
            self.dispatch(BoardCommand::Replace(next));
            self.focus_task(&id);
        }
    }

    /// Per-stage card counts on the unfiltered board
    pub fn column_counts(&self) -> [usize; 4] {
        partition(self.store.tasks()).counts()
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    let Some(state) = read_ui_state(app.store.data_dir()) else {
        return;
    };
    app.focused = state.focused_stage;
    app.cursors = state.cursors;
    app.filters = state.filters;
    app.key_hints_override = state.key_hints_override;
    app.clamp_cursors();
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    let filters = app
        .move_state
        .as_ref()
        .map_or(app.filters, |ms| ms.saved_filters);
    let state = UiState {
        focused_stage: app.focused,
        cursors: app.cursors,
        filters,
        key_hints_override: app.key_hints_override,
    };
    let _ = write_ui_state(app.store.data_dir(), &state);
}

/// Run the TUI application
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_or_default(data_dir);
    let (store, report) = BoardStore::load(KvStore::open(data_dir), timestamp_now());

    let mut app = App::new(store, config);
    restore_ui_state(&mut app);
    if report.dropped > 0 {
        app.set_error(format!(
            "{} unreadable card(s) moved to the recovery log",
            report.dropped
        ));
    } else if report.migrated {
        app.set_status("upgraded cards from an older format");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    save_ui_state(&app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                save_ui_state(app);
                save_counter = 0;
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
