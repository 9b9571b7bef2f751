use crate::domain::models::Routine;
use crate::domain::schedule::{reset_routine_status, total_duration};
use crate::infrastructure::collections::CollectionStore;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

pub type NowProvider = Arc<dyn Fn() -> DateTime<Tz> + Send + Sync>;

fn utc_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&chrono_tz::UTC)
}

/// Owner of the routine collection's update protocol: every mutation builds
/// a new routine value, runs fetch-all → replace-by-id → save-all, mirrors
/// the subroutine list to its side key, and only then hands the new value
/// back for the caller's working copy. A failed write surfaces as an error
/// with nothing replaced locally.
pub struct RoutineService<S: KeyValueStore> {
    collections: CollectionStore<S>,
    now_provider: NowProvider,
}

impl<S: KeyValueStore> RoutineService<S> {
    pub fn new(collections: CollectionStore<S>) -> Self {
        Self {
            collections,
            now_provider: Arc::new(utc_now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn now(&self) -> DateTime<Tz> {
        (self.now_provider)()
    }

    /// Validating upsert. The cached total duration is recomputed here, so a
    /// routine can never be saved with a stale aggregate.
    pub fn save_routine(&self, mut routine: Routine) -> Result<Routine, InfraError> {
        routine.total_duration = total_duration(&routine.subroutines);
        routine.validate().map_err(InfraError::InvalidConfig)?;

        let mut routines = self.collections.fetch_routines();
        let existing = routines
            .iter_mut()
            .find(|candidate| candidate.id == routine.id);
        match existing {
            Some(slot) => *slot = routine.clone(),
            None => routines.push(routine.clone()),
        }

        self.collections.save_routines(&routines)?;
        self.collections
            .save_subroutines(&routine.id, &routine.subroutines)?;
        Ok(routine)
    }

    pub fn load_routine(&self, routine_id: &str) -> Option<Routine> {
        self.collections
            .fetch_routines()
            .into_iter()
            .find(|routine| routine.id == routine_id)
    }

    pub fn list_routines(&self) -> Vec<Routine> {
        self.collections.fetch_routines()
    }

    pub fn delete_routine(&self, routine_id: &str) -> Result<bool, InfraError> {
        let mut routines = self.collections.fetch_routines();
        let before = routines.len();
        routines.retain(|routine| routine.id != routine_id);
        if routines.len() == before {
            return Ok(false);
        }

        self.collections.save_routines(&routines)?;
        self.collections.remove_subroutines(routine_id)?;
        Ok(true)
    }

    /// Flips one subroutine's completion, addressed by its stable id.
    pub fn toggle_subroutine(
        &self,
        routine_id: &str,
        subroutine_id: &str,
    ) -> Result<Routine, InfraError> {
        let today = self.today();
        self.update_routine(routine_id, |mut routine| {
            let Some(subroutine) = routine
                .subroutines
                .iter_mut()
                .find(|candidate| candidate.id == subroutine_id)
            else {
                return Err(InfraError::InvalidConfig(format!(
                    "subroutine not found: {subroutine_id}"
                )));
            };
            subroutine.completed = !subroutine.completed;
            routine.status_date = today;
            Ok(routine)
        })
    }

    /// All-or-nothing toggle: anything incomplete marks everything complete;
    /// a fully complete routine flips back to all incomplete.
    pub fn toggle_all_subroutines(&self, routine_id: &str) -> Result<Routine, InfraError> {
        let today = self.today();
        self.update_routine(routine_id, |mut routine| {
            let mark_complete = !routine
                .subroutines
                .iter()
                .all(|subroutine| subroutine.completed);
            for subroutine in &mut routine.subroutines {
                subroutine.completed = mark_complete;
            }
            routine.status_date = today;
            Ok(routine)
        })
    }

    /// Persists a drag-and-drop ordering verbatim. The new order must be a
    /// permutation of the current subroutine ids.
    pub fn reorder_subroutines(
        &self,
        routine_id: &str,
        ordered_ids: &[String],
    ) -> Result<Routine, InfraError> {
        self.update_routine(routine_id, |mut routine| {
            if ordered_ids.len() != routine.subroutines.len() {
                return Err(InfraError::InvalidConfig(format!(
                    "reorder expects {} subroutine ids, got {}",
                    routine.subroutines.len(),
                    ordered_ids.len()
                )));
            }

            let mut reordered = Vec::with_capacity(ordered_ids.len());
            for subroutine_id in ordered_ids {
                let position = routine
                    .subroutines
                    .iter()
                    .position(|candidate| &candidate.id == subroutine_id)
                    .ok_or_else(|| {
                        InfraError::InvalidConfig(format!(
                            "reorder references unknown subroutine: {subroutine_id}"
                        ))
                    })?;
                reordered.push(routine.subroutines.remove(position));
            }
            routine.subroutines = reordered;
            Ok(routine)
        })
    }

    pub fn set_notifications_enabled(
        &self,
        routine_id: &str,
        enabled: bool,
    ) -> Result<Routine, InfraError> {
        self.update_routine(routine_id, |mut routine| {
            routine.notifications_enabled = enabled;
            Ok(routine)
        })
    }

    /// Day-rollover sweep over the whole collection, persisted only when at
    /// least one routine actually reset.
    pub fn apply_daily_reset(&self) -> Result<Vec<Routine>, InfraError> {
        let now = self.now();
        let routines = self.collections.fetch_routines();
        let reset: Vec<Routine> = routines
            .iter()
            .map(|routine| reset_routine_status(routine, now))
            .collect();

        if reset != routines {
            self.collections.save_routines(&reset)?;
            for routine in &reset {
                self.collections
                    .save_subroutines(&routine.id, &routine.subroutines)?;
            }
        }
        Ok(reset)
    }

    fn today(&self) -> String {
        self.now().date_naive().format("%Y-%m-%d").to_string()
    }

    fn update_routine(
        &self,
        routine_id: &str,
        transform: impl FnOnce(Routine) -> Result<Routine, InfraError>,
    ) -> Result<Routine, InfraError> {
        let mut routines = self.collections.fetch_routines();
        let position = routines
            .iter()
            .position(|candidate| candidate.id == routine_id)
            .ok_or_else(|| {
                InfraError::InvalidConfig(format!("routine not found: {routine_id}"))
            })?;

        let mut updated = transform(routines[position].clone())?;
        updated.total_duration = total_duration(&updated.subroutines);
        routines[position] = updated.clone();

        self.collections.save_routines(&routines)?;
        self.collections
            .save_subroutines(&updated.id, &updated.subroutines)?;
        Ok(updated)
    }
}
