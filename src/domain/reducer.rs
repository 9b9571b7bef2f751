use crate::domain::models::{Task, TaskList, DEFAULT_LIST_ID};

/// Process-wide task view state: the list collection, the current list
/// selection, and the task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBoard {
    pub lists: Vec<TaskList>,
    pub selected_list_id: String,
    pub tasks: Vec<Task>,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            selected_list_id: DEFAULT_LIST_ID.to_string(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    AddTasks(Vec<Task>),
    AddLists(Vec<TaskList>),
    EditList { id: String, name: String },
    DeleteList(String),
    MarkCompleted(String),
    SelectList(String),
}

/// Pure state transition. Persistence is the caller's concern; deleting a
/// list deliberately leaves its tasks behind as orphans.
pub fn reduce(state: TaskBoard, action: TaskAction) -> TaskBoard {
    match action {
        TaskAction::AddTasks(tasks) => TaskBoard { tasks, ..state },
        TaskAction::AddLists(lists) => TaskBoard { lists, ..state },
        TaskAction::EditList { id, name } => TaskBoard {
            lists: state
                .lists
                .into_iter()
                .map(|list| {
                    if list.id == id {
                        TaskList {
                            name: name.clone(),
                            ..list
                        }
                    } else {
                        list
                    }
                })
                .collect(),
            ..state
        },
        TaskAction::DeleteList(id) => TaskBoard {
            lists: state.lists.into_iter().filter(|list| list.id != id).collect(),
            ..state
        },
        TaskAction::MarkCompleted(task_id) => TaskBoard {
            tasks: state
                .tasks
                .into_iter()
                .map(|task| {
                    if task.id == task_id {
                        Task {
                            completed: true,
                            ..task
                        }
                    } else {
                        task
                    }
                })
                .collect(),
            ..state
        },
        TaskAction::SelectList(id) => TaskBoard {
            selected_list_id: id,
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, list_id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: String::new(),
            due_date: None,
            due_time: None,
            completed: false,
            list_id: list_id.to_string(),
        }
    }

    fn list(id: &str, name: &str) -> TaskList {
        TaskList {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn sample_board() -> TaskBoard {
        TaskBoard {
            lists: vec![list("lst-1", "Errands"), list("lst-2", "Work")],
            selected_list_id: "lst-1".to_string(),
            tasks: vec![task("tsk-1", "lst-1"), task("tsk-2", "lst-1"), task("tsk-3", "lst-2")],
        }
    }

    #[test]
    fn default_selection_is_the_sentinel_list() {
        assert_eq!(TaskBoard::default().selected_list_id, DEFAULT_LIST_ID);
    }

    #[test]
    fn add_tasks_replaces_the_task_collection() {
        let board = reduce(sample_board(), TaskAction::AddTasks(vec![task("tsk-9", "lst-1")]));
        assert_eq!(board.tasks.len(), 1);
        assert_eq!(board.tasks[0].id, "tsk-9");
        assert_eq!(board.lists.len(), 2);
    }

    #[test]
    fn mark_completed_flips_only_the_matching_task() {
        let board = reduce(sample_board(), TaskAction::MarkCompleted("tsk-2".to_string()));
        assert!(!board.tasks[0].completed);
        assert!(board.tasks[1].completed);
        assert!(!board.tasks[2].completed);
    }

    #[test]
    fn mark_completed_with_unknown_id_changes_nothing() {
        let before = sample_board();
        let board = reduce(before.clone(), TaskAction::MarkCompleted("tsk-404".to_string()));
        assert_eq!(board, before);
    }

    #[test]
    fn delete_list_leaves_orphaned_tasks_behind() {
        let board = reduce(sample_board(), TaskAction::DeleteList("lst-2".to_string()));
        assert_eq!(board.lists.len(), 1);
        assert_eq!(board.lists[0].id, "lst-1");
        // Tasks that referenced the deleted list survive as orphans.
        assert!(board.tasks.iter().any(|task| task.list_id == "lst-2"));
    }

    #[test]
    fn edit_list_renames_only_the_matching_list() {
        let board = reduce(
            sample_board(),
            TaskAction::EditList {
                id: "lst-1".to_string(),
                name: "Chores".to_string(),
            },
        );
        assert_eq!(board.lists[0].name, "Chores");
        assert_eq!(board.lists[1].name, "Work");
    }

    #[test]
    fn select_list_changes_only_the_selection() {
        let board = reduce(sample_board(), TaskAction::SelectList("lst-2".to_string()));
        assert_eq!(board.selected_list_id, "lst-2");
        assert_eq!(board.tasks.len(), 3);
    }
}
