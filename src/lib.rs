pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::commands::{
    clear_storage_impl, complete_task_impl, complete_timer_impl, create_list_impl,
    create_task_impl, delete_list_impl, delete_routine_impl, delete_task_impl,
    export_storage_impl, get_routine_impl, get_timer_state_impl, list_lists_impl,
    list_routines_impl, list_tasks_impl, notification_permission_impl,
    open_subroutine_timer_impl, pause_timer_impl, purge_completed_tasks_impl, rename_list_impl,
    reorder_subroutines_impl, reset_timer_impl, run_timer_ticker_impl, save_routine_impl,
    select_list_impl, set_routine_notifications_impl, skip_timer_impl, start_timer_impl,
    tick_timer_impl, toggle_all_subroutines_impl, toggle_subroutine_impl, update_task_impl,
    AppState, ExportEntryResponse, RoutineOverviewResponse, SubroutineDraft, TaskQueryResponse,
    TimerStateResponse,
};
pub use application::routine_service::RoutineService;
pub use domain::models::{Routine, SelectedDays, Subroutine, Task, TaskList, DEFAULT_LIST_ID};
pub use domain::reducer::{reduce, TaskAction, TaskBoard};
pub use domain::schedule::{next_occurrence, reset_routine_status, subroutine_count, total_duration};
pub use domain::timer::{SubroutineTimer, TimerPhase};
pub use infrastructure::error::InfraError;
