use crate::domain::models::{Routine, Subroutine, Task, TaskList};
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

pub const KEY_TASKS: &str = "tasks";
pub const KEY_LISTS: &str = "lists";
pub const KEY_ROUTINES: &str = "routines";

pub fn subroutines_key(routine_id: &str) -> String {
    format!("subroutines_{routine_id}")
}

/// Typed whole-collection access over the key-value store.
///
/// Reads never fail past this boundary: an unset key, an unreadable store or
/// a malformed blob all degrade to an empty collection with a logged
/// diagnostic. Writes overwrite the whole collection and do surface errors.
pub struct CollectionStore<S: KeyValueStore> {
    store: Arc<S>,
    log: Arc<CommandLog>,
}

impl<S: KeyValueStore> Clone for CollectionStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            log: Arc::clone(&self.log),
        }
    }
}

impl<S: KeyValueStore> CollectionStore<S> {
    pub fn new(store: Arc<S>, log: Arc<CommandLog>) -> Self {
        Self { store, log }
    }

    pub fn fetch_tasks(&self) -> Vec<Task> {
        self.fetch_collection(KEY_TASKS)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), InfraError> {
        self.save_collection(KEY_TASKS, tasks)
    }

    pub fn fetch_lists(&self) -> Vec<TaskList> {
        self.fetch_collection(KEY_LISTS)
    }

    pub fn save_lists(&self, lists: &[TaskList]) -> Result<(), InfraError> {
        self.save_collection(KEY_LISTS, lists)
    }

    pub fn fetch_routines(&self) -> Vec<Routine> {
        self.fetch_collection(KEY_ROUTINES)
    }

    pub fn save_routines(&self, routines: &[Routine]) -> Result<(), InfraError> {
        self.save_collection(KEY_ROUTINES, routines)
    }

    // The per-routine key persists a subroutine list independently of the
    // copy embedded in the routine; reconciliation is explicit in callers.
    pub fn fetch_subroutines(&self, routine_id: &str) -> Vec<Subroutine> {
        self.fetch_collection(&subroutines_key(routine_id))
    }

    pub fn save_subroutines(
        &self,
        routine_id: &str,
        subroutines: &[Subroutine],
    ) -> Result<(), InfraError> {
        self.save_collection(&subroutines_key(routine_id), subroutines)
    }

    pub fn remove_subroutines(&self, routine_id: &str) -> Result<(), InfraError> {
        self.store.remove(&subroutines_key(routine_id))
    }

    /// Raw key/value dump of the whole store, for the export feature. The
    /// pairing format is not a committed contract.
    pub fn export_all(&self) -> Result<Vec<(String, String)>, InfraError> {
        let mut pairs = Vec::new();
        for key in self.store.list_keys()? {
            if let Some(value) = self.store.get(&key)? {
                pairs.push((key, value));
            }
        }
        Ok(pairs)
    }

    pub fn clear_all(&self) -> Result<(), InfraError> {
        self.store.clear()
    }

    fn fetch_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key) {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(collection) => collection,
                Err(error) => {
                    self.log.error(
                        "fetch_collection",
                        &format!("malformed blob at key '{key}': {error}"),
                    );
                    Vec::new()
                }
            },
            Err(error) => {
                self.log.error(
                    "fetch_collection",
                    &format!("read failed for key '{key}': {error}"),
                );
                Vec::new()
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, collection: &[T]) -> Result<(), InfraError> {
        let raw = serde_json::to_string(collection)?;
        self.store.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DEFAULT_LIST_ID;
    use crate::infrastructure::storage::InMemoryKeyValueStore;

    fn collection_store() -> CollectionStore<InMemoryKeyValueStore> {
        // Point the diagnostics log at a directory that does not exist; the
        // log is best-effort and the tests only care about the data path.
        let log = Arc::new(CommandLog::new(
            std::env::temp_dir().join("dayloop-collections-tests-nolog"),
        ));
        CollectionStore::new(Arc::new(InMemoryKeyValueStore::default()), log)
    }

    fn sample_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: String::new(),
            due_date: None,
            due_time: None,
            completed: false,
            list_id: DEFAULT_LIST_ID.to_string(),
        }
    }

    #[test]
    fn unset_keys_read_as_empty_collections() {
        let collections = collection_store();
        assert!(collections.fetch_tasks().is_empty());
        assert!(collections.fetch_lists().is_empty());
        assert!(collections.fetch_routines().is_empty());
        assert!(collections.fetch_subroutines("rtn-1").is_empty());
    }

    #[test]
    fn saved_collections_read_back() {
        let collections = collection_store();
        let tasks = vec![sample_task("tsk-1"), sample_task("tsk-2")];
        collections.save_tasks(&tasks).expect("save tasks");
        assert_eq!(collections.fetch_tasks(), tasks);
    }

    #[test]
    fn malformed_blob_degrades_to_empty() {
        let collections = collection_store();
        collections.store.set(KEY_TASKS, "{not json").expect("seed corrupt blob");
        assert!(collections.fetch_tasks().is_empty());
    }

    #[test]
    fn subroutine_side_key_is_per_routine() {
        let collections = collection_store();
        let steps = vec![Subroutine {
            id: "sub-1".to_string(),
            name: "Stretch".to_string(),
            duration: "5 minutes".to_string(),
            completed: false,
        }];
        collections.save_subroutines("rtn-1", &steps).expect("save side key");

        assert_eq!(collections.fetch_subroutines("rtn-1"), steps);
        assert!(collections.fetch_subroutines("rtn-2").is_empty());

        collections.remove_subroutines("rtn-1").expect("remove side key");
        assert!(collections.fetch_subroutines("rtn-1").is_empty());
    }

    #[test]
    fn export_pairs_every_key_and_clear_wipes() {
        let collections = collection_store();
        collections.save_tasks(&[sample_task("tsk-1")]).expect("save tasks");
        collections
            .save_lists(&[TaskList {
                id: DEFAULT_LIST_ID.to_string(),
                name: "Default List".to_string(),
            }])
            .expect("save lists");

        let pairs = collections.export_all().expect("export");
        let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec![KEY_LISTS, KEY_TASKS]);
        assert!(pairs.iter().all(|(_, value)| !value.is_empty()));

        collections.clear_all().expect("clear");
        assert!(collections.export_all().expect("export").is_empty());
    }
}
