use std::sync::Arc;

use super::AppResult;
use crate::domain::Task;
use crate::ports::{KeyValueStore, StoreEvent, StoreObserver};

/// Key holding the active collection.
pub const ACTIVE_TASKS_KEY: &str = "tasks";
/// Key holding the trash.
pub const DELETED_TASKS_KEY: &str = "deletedTasks";

/// Reads and writes the two task collections as whole JSON documents.
pub struct TaskPersistence {
    store: Arc<dyn KeyValueStore>,
    observer: Arc<dyn StoreObserver>,
}

impl TaskPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, observer: Arc<dyn StoreObserver>) -> Self {
        Self { store, observer }
    }

    pub fn load_active(&self) -> AppResult<Vec<Task>> {
        self.load(ACTIVE_TASKS_KEY)
    }

    pub fn load_deleted(&self) -> AppResult<Vec<Task>> {
        self.load(DELETED_TASKS_KEY)
    }

    pub fn save_active(&self, tasks: &[Task]) -> AppResult<()> {
        self.save(ACTIVE_TASKS_KEY, tasks)
    }

    pub fn save_deleted(&self, tasks: &[Task]) -> AppResult<()> {
        self.save(DELETED_TASKS_KEY, tasks)
    }

    // Missing and unparsable values both read as an empty collection.
    fn load(&self, key: &'static str) -> AppResult<Vec<Task>> {
        let Some(raw) = self.store.get(key)? else {
            self.observer
                .record(&StoreEvent::SnapshotLoaded { key, count: 0 });
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => {
                self.observer.record(&StoreEvent::SnapshotLoaded {
                    key,
                    count: tasks.len(),
                });
                Ok(tasks)
            }
            Err(e) => {
                self.observer.record(&StoreEvent::SnapshotCorrupt {
                    key,
                    error: e.to_string(),
                });
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, key: &'static str, tasks: &[Task]) -> AppResult<()> {
        let json = serde_json::to_string(tasks)?;
        self.store.set(key, &json)?;
        self.observer.record(&StoreEvent::SnapshotPersisted {
            key,
            count: tasks.len(),
        });
        Ok(())
    }
}
