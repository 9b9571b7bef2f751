use crate::application::bootstrap::bootstrap_workspace;
use crate::application::routine_service::RoutineService;
use crate::domain::models::{Routine, SelectedDays, Subroutine, Task, TaskList};
use crate::domain::reducer::{reduce, TaskAction, TaskBoard};
use crate::domain::schedule::{next_occurrence, subroutine_count};
use crate::domain::timer::{SubroutineTimer, TimerPhase};
use crate::infrastructure::collections::CollectionStore;
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::notifications::{
    NotificationGateway, PermissionStatus, UnsupportedNotificationGateway,
};
use crate::infrastructure::storage::SqliteKeyValueStore;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::{interval, Duration as TokioDuration};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", Utc::now().timestamp_micros())
}

pub struct AppState {
    config_dir: PathBuf,
    database_path: PathBuf,
    timezone: Tz,
    collections: CollectionStore<SqliteKeyValueStore>,
    routines: RoutineService<SqliteKeyValueStore>,
    notifications: Arc<dyn NotificationGateway>,
    runtime: Mutex<RuntimeState>,
    log: Arc<CommandLog>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let timezone = bootstrap.timezone;
        let log = Arc::new(CommandLog::new(&bootstrap.logs_dir));
        let store = Arc::new(SqliteKeyValueStore::new(&bootstrap.database_path));
        let collections = CollectionStore::new(store, Arc::clone(&log));
        let routines = RoutineService::new(collections.clone())
            .with_now_provider(Arc::new(move || Utc::now().with_timezone(&timezone)));

        // Storage is truth: the board starts from whatever is persisted.
        let mut board = TaskBoard::default();
        board = reduce(board, TaskAction::AddLists(collections.fetch_lists()));
        board = reduce(board, TaskAction::AddTasks(collections.fetch_tasks()));

        Ok(Self {
            config_dir: bootstrap.config_dir,
            database_path: bootstrap.database_path,
            timezone,
            collections,
            routines,
            notifications: Arc::new(UnsupportedNotificationGateway),
            runtime: Mutex::new(RuntimeState {
                board,
                active_routine: None,
                timer: None,
            }),
            log,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        self.log.error(command, &error.to_string());
        error.to_string()
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}

#[derive(Debug, Default)]
struct RuntimeState {
    board: TaskBoard,
    active_routine: Option<Routine>,
    timer: Option<ActiveTimer>,
}

#[derive(Debug, Clone)]
struct ActiveTimer {
    routine_id: String,
    subroutine_id: String,
    countdown: SubroutineTimer,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskQueryResponse {
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoutineOverviewResponse {
    pub id: String,
    pub name: String,
    pub selected_time: String,
    pub next_occurrence: String,
    pub total_duration: String,
    pub subroutine_count: usize,
    pub is_complete: bool,
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimerStateResponse {
    pub routine_id: String,
    pub subroutine_id: String,
    pub phase: String,
    pub remaining_seconds: u64,
    pub initial_seconds: u64,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportEntryResponse {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubroutineDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub duration: String,
    #[serde(default)]
    pub completed: bool,
}

fn lock_runtime(state: &AppState) -> Result<MutexGuard<'_, RuntimeState>, InfraError> {
    state
        .runtime
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("runtime lock poisoned: {error}")))
}

fn dispatch(runtime: &mut RuntimeState, action: TaskAction) {
    runtime.board = reduce(std::mem::take(&mut runtime.board), action);
}

fn normalized_optional(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

// Tasks ---------------------------------------------------------------------

pub fn create_task_impl(
    state: &AppState,
    title: String,
    description: Option<String>,
    due_date: Option<String>,
    due_time: Option<String>,
) -> Result<Task, InfraError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InfraError::InvalidConfig(
            "title must not be empty".to_string(),
        ));
    }

    let mut runtime = lock_runtime(state)?;
    let task = Task {
        id: next_id("tsk"),
        title: title.to_string(),
        description: normalized_optional(description).unwrap_or_default(),
        due_date: normalized_optional(due_date),
        due_time: normalized_optional(due_time),
        completed: false,
        list_id: runtime.board.selected_list_id.clone(),
    };
    task.validate().map_err(InfraError::InvalidConfig)?;

    let mut tasks = state.collections.fetch_tasks();
    tasks.push(task.clone());
    state.collections.save_tasks(&tasks)?;
    dispatch(&mut runtime, TaskAction::AddTasks(tasks));

    state.log.info("create_task", &format!("created task_id={}", task.id));
    Ok(task)
}

pub fn update_task_impl(
    state: &AppState,
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    due_date: Option<String>,
    due_time: Option<String>,
) -> Result<Task, InfraError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "task_id must not be empty".to_string(),
        ));
    }

    let mut tasks = state.collections.fetch_tasks();
    let Some(task) = tasks.iter_mut().find(|task| task.id == task_id) else {
        return Err(InfraError::InvalidConfig(format!("task not found: {task_id}")));
    };

    if let Some(title) = title {
        let title = title.trim();
        if title.is_empty() {
            return Err(InfraError::InvalidConfig(
                "title must not be empty".to_string(),
            ));
        }
        task.title = title.to_string();
    }
    if let Some(description) = description {
        task.description = description.trim().to_string();
    }
    if let Some(due_date) = normalized_optional(due_date) {
        task.due_date = Some(due_date);
    }
    if let Some(due_time) = normalized_optional(due_time) {
        task.due_time = Some(due_time);
    }
    task.validate().map_err(InfraError::InvalidConfig)?;
    let updated = task.clone();

    state.collections.save_tasks(&tasks)?;
    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::AddTasks(tasks));

    state.log.info("update_task", &format!("updated task_id={task_id}"));
    Ok(updated)
}

pub fn complete_task_impl(state: &AppState, task_id: String) -> Result<Task, InfraError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "task_id must not be empty".to_string(),
        ));
    }

    let mut tasks = state.collections.fetch_tasks();
    let Some(task) = tasks.iter_mut().find(|task| task.id == task_id) else {
        return Err(InfraError::InvalidConfig(format!("task not found: {task_id}")));
    };
    task.completed = true;
    let updated = task.clone();

    state.collections.save_tasks(&tasks)?;
    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::MarkCompleted(task_id.to_string()));

    state
        .log
        .info("complete_task", &format!("completed task_id={task_id}"));
    Ok(updated)
}

pub fn delete_task_impl(state: &AppState, task_id: String) -> Result<bool, InfraError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "task_id must not be empty".to_string(),
        ));
    }

    let mut tasks = state.collections.fetch_tasks();
    let before = tasks.len();
    tasks.retain(|task| task.id != task_id);
    if tasks.len() == before {
        return Ok(false);
    }

    state.collections.save_tasks(&tasks)?;
    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::AddTasks(tasks));

    state.log.info("delete_task", &format!("deleted task_id={task_id}"));
    Ok(true)
}

/// Tasks for one list (the current selection by default), split into the
/// active and completed groups the task view renders.
pub fn list_tasks_impl(
    state: &AppState,
    list_id: Option<String>,
) -> Result<TaskQueryResponse, InfraError> {
    let stored = state.collections.fetch_tasks();
    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::AddTasks(stored.clone()));

    let list_id = normalized_optional(list_id)
        .unwrap_or_else(|| runtime.board.selected_list_id.clone());
    let (completed, active): (Vec<Task>, Vec<Task>) = stored
        .into_iter()
        .filter(|task| task.list_id == list_id)
        .partition(|task| task.completed);

    Ok(TaskQueryResponse { active, completed })
}

/// Removes the selected list's completed tasks. Tasks in other lists are
/// untouched regardless of completion.
pub fn purge_completed_tasks_impl(state: &AppState) -> Result<usize, InfraError> {
    let mut runtime = lock_runtime(state)?;
    let selected = runtime.board.selected_list_id.clone();

    let mut tasks = state.collections.fetch_tasks();
    let before = tasks.len();
    tasks.retain(|task| !(task.list_id == selected && task.completed));
    let removed = before - tasks.len();
    if removed == 0 {
        return Ok(0);
    }

    state.collections.save_tasks(&tasks)?;
    dispatch(&mut runtime, TaskAction::AddTasks(tasks));

    state.log.info(
        "purge_completed_tasks",
        &format!("removed {removed} completed tasks from list_id={selected}"),
    );
    Ok(removed)
}

// Lists ---------------------------------------------------------------------

pub fn create_list_impl(state: &AppState, name: String) -> Result<TaskList, InfraError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InfraError::InvalidConfig(
            "name must not be empty".to_string(),
        ));
    }

    let list = TaskList {
        id: next_id("lst"),
        name: name.to_string(),
    };
    let mut lists = state.collections.fetch_lists();
    lists.push(list.clone());
    state.collections.save_lists(&lists)?;

    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::AddLists(lists));

    state.log.info("create_list", &format!("created list_id={}", list.id));
    Ok(list)
}

pub fn rename_list_impl(
    state: &AppState,
    list_id: String,
    name: String,
) -> Result<TaskList, InfraError> {
    let list_id = list_id.trim();
    let name = name.trim();
    if list_id.is_empty() || name.is_empty() {
        return Err(InfraError::InvalidConfig(
            "list_id and name must not be empty".to_string(),
        ));
    }

    let mut lists = state.collections.fetch_lists();
    let Some(list) = lists.iter_mut().find(|list| list.id == list_id) else {
        return Err(InfraError::InvalidConfig(format!("list not found: {list_id}")));
    };
    list.name = name.to_string();
    let updated = list.clone();

    state.collections.save_lists(&lists)?;
    let mut runtime = lock_runtime(state)?;
    dispatch(
        &mut runtime,
        TaskAction::EditList {
            id: list_id.to_string(),
            name: name.to_string(),
        },
    );

    state.log.info("rename_list", &format!("renamed list_id={list_id}"));
    Ok(updated)
}

/// Deletes the list only. Tasks that referenced it stay behind as orphans;
/// every task reader tolerates them.
pub fn delete_list_impl(state: &AppState, list_id: String) -> Result<bool, InfraError> {
    let list_id = list_id.trim();
    if list_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "list_id must not be empty".to_string(),
        ));
    }

    let mut lists = state.collections.fetch_lists();
    let before = lists.len();
    lists.retain(|list| list.id != list_id);
    if lists.len() == before {
        return Ok(false);
    }

    state.collections.save_lists(&lists)?;
    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::DeleteList(list_id.to_string()));

    state.log.info("delete_list", &format!("deleted list_id={list_id}"));
    Ok(true)
}

pub fn select_list_impl(state: &AppState, list_id: String) -> Result<String, InfraError> {
    let list_id = list_id.trim();
    if list_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "list_id must not be empty".to_string(),
        ));
    }

    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::SelectList(list_id.to_string()));
    Ok(runtime.board.selected_list_id.clone())
}

pub fn list_lists_impl(state: &AppState) -> Result<Vec<TaskList>, InfraError> {
    let lists = state.collections.fetch_lists();
    let mut runtime = lock_runtime(state)?;
    dispatch(&mut runtime, TaskAction::AddLists(lists.clone()));
    Ok(lists)
}

// Routines ------------------------------------------------------------------

pub fn save_routine_impl(
    state: &AppState,
    routine_id: Option<String>,
    name: String,
    subroutines: Vec<SubroutineDraft>,
    selected_time: String,
    selected_days: SelectedDays,
    notifications_enabled: bool,
) -> Result<Routine, InfraError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InfraError::InvalidConfig(
            "name must not be empty".to_string(),
        ));
    }

    let routine_id = normalized_optional(routine_id);
    let existing = routine_id
        .as_deref()
        .and_then(|id| state.routines.load_routine(id));

    let subroutines = subroutines
        .into_iter()
        .map(|draft| Subroutine {
            id: normalized_optional(draft.id).unwrap_or_else(|| next_id("sub")),
            name: draft.name.trim().to_string(),
            duration: normalize_duration(&draft.duration),
            completed: draft.completed,
        })
        .collect();

    let routine = Routine {
        id: routine_id.unwrap_or_else(|| next_id("rtn")),
        name: name.to_string(),
        subroutines,
        selected_time: selected_time.trim().to_string(),
        selected_days,
        total_duration: String::new(),
        notifications_enabled,
        status_date: existing.map(|previous| previous.status_date).unwrap_or_else(|| {
            state.now().date_naive().format("%Y-%m-%d").to_string()
        }),
    };

    let saved = state.routines.save_routine(routine)?;
    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(saved.clone());

    state
        .log
        .info("save_routine", &format!("saved routine_id={}", saved.id));
    Ok(saved)
}

// Bare numeric input means minutes; that is the one canonical creation path.
fn normalize_duration(duration: &str) -> String {
    let duration = duration.trim();
    if !duration.is_empty() && duration.chars().all(|character| character.is_ascii_digit()) {
        return format!("{duration} minutes");
    }
    duration.to_string()
}

/// Routine list rows. Runs the day-rollover sweep first, so stale completion
/// state never reaches the screen.
pub fn list_routines_impl(state: &AppState) -> Result<Vec<RoutineOverviewResponse>, InfraError> {
    let now = state.now();
    let routines = state.routines.apply_daily_reset()?;
    Ok(routines
        .iter()
        .map(|routine| RoutineOverviewResponse {
            id: routine.id.clone(),
            name: routine.name.clone(),
            selected_time: routine.selected_time.clone(),
            next_occurrence: next_occurrence(routine, now),
            total_duration: routine.total_duration.clone(),
            subroutine_count: subroutine_count(Some(&routine.subroutines)),
            is_complete: routine.is_complete(),
            notifications_enabled: routine.notifications_enabled,
        })
        .collect())
}

/// Refresh-on-focus: the working copy is replaced with the freshest persisted
/// routine, discarding any un-persisted local state.
pub fn get_routine_impl(state: &AppState, routine_id: String) -> Result<Routine, InfraError> {
    let routine_id = routine_id.trim();
    if routine_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "routine_id must not be empty".to_string(),
        ));
    }

    state.routines.apply_daily_reset()?;
    let Some(routine) = state.routines.load_routine(routine_id) else {
        return Err(InfraError::InvalidConfig(format!(
            "routine not found: {routine_id}"
        )));
    };

    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(routine.clone());
    Ok(routine)
}

pub fn delete_routine_impl(state: &AppState, routine_id: String) -> Result<bool, InfraError> {
    let routine_id = routine_id.trim();
    if routine_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "routine_id must not be empty".to_string(),
        ));
    }

    let removed = state.routines.delete_routine(routine_id)?;
    if removed {
        let mut runtime = lock_runtime(state)?;
        if runtime
            .active_routine
            .as_ref()
            .is_some_and(|routine| routine.id == routine_id)
        {
            runtime.active_routine = None;
        }
        if runtime
            .timer
            .as_ref()
            .is_some_and(|timer| timer.routine_id == routine_id)
        {
            runtime.timer = None;
        }
        state
            .log
            .info("delete_routine", &format!("deleted routine_id={routine_id}"));
    }
    Ok(removed)
}

pub fn toggle_subroutine_impl(
    state: &AppState,
    routine_id: String,
    subroutine_id: String,
) -> Result<Routine, InfraError> {
    let updated = state
        .routines
        .toggle_subroutine(routine_id.trim(), subroutine_id.trim())?;
    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(updated.clone());
    Ok(updated)
}

pub fn toggle_all_subroutines_impl(
    state: &AppState,
    routine_id: String,
) -> Result<Routine, InfraError> {
    let updated = state.routines.toggle_all_subroutines(routine_id.trim())?;
    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(updated.clone());
    Ok(updated)
}

pub fn reorder_subroutines_impl(
    state: &AppState,
    routine_id: String,
    ordered_ids: Vec<String>,
) -> Result<Routine, InfraError> {
    let updated = state
        .routines
        .reorder_subroutines(routine_id.trim(), &ordered_ids)?;
    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(updated.clone());
    Ok(updated)
}

pub fn set_routine_notifications_impl(
    state: &AppState,
    routine_id: String,
    enabled: bool,
) -> Result<Routine, InfraError> {
    let updated = state
        .routines
        .set_notifications_enabled(routine_id.trim(), enabled)?;
    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(updated.clone());
    Ok(updated)
}

// Timer ---------------------------------------------------------------------

/// Opens the countdown for one subroutine, idle at its full duration. The
/// subroutine is read fresh from storage; a duration the countdown cannot
/// parse is corrupt data and a hard error.
pub fn open_subroutine_timer_impl(
    state: &AppState,
    routine_id: String,
    subroutine_id: String,
) -> Result<TimerStateResponse, InfraError> {
    let routine_id = routine_id.trim();
    let subroutine_id = subroutine_id.trim();
    if routine_id.is_empty() || subroutine_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "routine_id and subroutine_id must not be empty".to_string(),
        ));
    }

    let Some(routine) = state.routines.load_routine(routine_id) else {
        return Err(InfraError::InvalidConfig(format!(
            "routine not found: {routine_id}"
        )));
    };
    let Some(subroutine) = routine
        .subroutines
        .iter()
        .find(|candidate| candidate.id == subroutine_id)
    else {
        return Err(InfraError::InvalidConfig(format!(
            "subroutine not found: {subroutine_id}"
        )));
    };

    let countdown =
        SubroutineTimer::from_duration(&subroutine.duration).map_err(InfraError::CorruptData)?;

    let mut runtime = lock_runtime(state)?;
    let timer = ActiveTimer {
        routine_id: routine_id.to_string(),
        subroutine_id: subroutine_id.to_string(),
        countdown,
    };
    let response = to_timer_state_response(&timer);
    runtime.timer = Some(timer);

    state.log.info(
        "open_subroutine_timer",
        &format!("opened timer for subroutine_id={subroutine_id}"),
    );
    Ok(response)
}

pub fn start_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    with_active_timer(state, |timer| {
        match timer.countdown.phase() {
            TimerPhase::Paused => timer.countdown.resume(),
            _ => timer.countdown.start(),
        }
        .map_err(InfraError::InvalidConfig)
    })
}

pub fn pause_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    with_active_timer(state, |timer| {
        timer.countdown.pause().map_err(InfraError::InvalidConfig)
    })
}

pub fn reset_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    with_active_timer(state, |timer| {
        timer.countdown.reset();
        Ok(())
    })
}

/// One-second advance, driven by the presentation layer's interval (or the
/// async ticker below).
pub fn tick_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    with_active_timer(state, |timer| {
        timer.countdown.tick();
        Ok(())
    })
}

/// Drives the countdown at one-second granularity until it leaves the
/// running phase. Dropping the future (screen exit) cancels the ticks.
pub async fn run_timer_ticker_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let mut ticks = interval(TokioDuration::from_secs(1));
    loop {
        ticks.tick().await;
        let snapshot = tick_timer_impl(state)?;
        if snapshot.phase != TimerPhase::Running.as_str() {
            return Ok(snapshot);
        }
    }
}

pub fn get_timer_state_impl(state: &AppState) -> Result<Option<TimerStateResponse>, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(runtime.timer.as_ref().map(to_timer_state_response))
}

/// Leaves the timer screen without touching completion state.
pub fn skip_timer_impl(state: &AppState) -> Result<(), InfraError> {
    let mut runtime = lock_runtime(state)?;
    if runtime.timer.take().is_none() {
        return Err(InfraError::InvalidConfig(
            "no active subroutine timer".to_string(),
        ));
    }
    state.log.info("skip_timer", "skipped active subroutine timer");
    Ok(())
}

/// The user's explicit completion confirmation: finishes the countdown and
/// toggles exactly the subroutine this timer was opened for.
pub fn complete_timer_impl(state: &AppState) -> Result<Routine, InfraError> {
    let timer = {
        let mut runtime = lock_runtime(state)?;
        let Some(mut timer) = runtime.timer.take() else {
            return Err(InfraError::InvalidConfig(
                "no active subroutine timer".to_string(),
            ));
        };
        if let Err(error) = timer.countdown.confirm_complete() {
            runtime.timer = Some(timer);
            return Err(InfraError::InvalidConfig(error));
        }
        timer
    };

    let updated = state
        .routines
        .toggle_subroutine(&timer.routine_id, &timer.subroutine_id)?;
    let mut runtime = lock_runtime(state)?;
    runtime.active_routine = Some(updated.clone());

    state.log.info(
        "complete_timer",
        &format!("completed subroutine_id={}", timer.subroutine_id),
    );
    Ok(updated)
}

fn with_active_timer(
    state: &AppState,
    operation: impl FnOnce(&mut ActiveTimer) -> Result<(), InfraError>,
) -> Result<TimerStateResponse, InfraError> {
    let mut runtime = lock_runtime(state)?;
    let Some(timer) = runtime.timer.as_mut() else {
        return Err(InfraError::InvalidConfig(
            "no active subroutine timer".to_string(),
        ));
    };
    operation(timer)?;
    Ok(to_timer_state_response(timer))
}

fn to_timer_state_response(timer: &ActiveTimer) -> TimerStateResponse {
    TimerStateResponse {
        routine_id: timer.routine_id.clone(),
        subroutine_id: timer.subroutine_id.clone(),
        phase: timer.countdown.phase().as_str().to_string(),
        remaining_seconds: timer.countdown.remaining_seconds(),
        initial_seconds: timer.countdown.initial_seconds(),
        progress: timer.countdown.progress(),
    }
}

// Maintenance ---------------------------------------------------------------

pub fn export_storage_impl(state: &AppState) -> Result<Vec<ExportEntryResponse>, InfraError> {
    let pairs = state.collections.export_all()?;
    state
        .log
        .info("export_storage", &format!("exported {} keys", pairs.len()));
    Ok(pairs
        .into_iter()
        .map(|(key, value)| ExportEntryResponse { key, value })
        .collect())
}

/// Wipes the store and the in-memory state with it. The confirm/cancel
/// prompt in front of this is the presentation layer's job.
pub fn clear_storage_impl(state: &AppState) -> Result<(), InfraError> {
    state.collections.clear_all()?;
    let mut runtime = lock_runtime(state)?;
    *runtime = RuntimeState::default();
    state.log.info("clear_storage", "cleared all stored data");
    Ok(())
}

/// Startup permission check: ask for the current status and request once
/// when it is still undetermined.
pub fn notification_permission_impl(state: &AppState) -> Result<String, InfraError> {
    let status = state.notifications.permission_status()?;
    let status = match status {
        PermissionStatus::Undetermined => state.notifications.request_permission()?,
        granted_or_denied => granted_or_denied,
    };
    state.log.info(
        "notification_permission",
        &format!("notification permission {}", status.as_str()),
    );
    Ok(status.as_str().to_string())
}
