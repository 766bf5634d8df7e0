use std::collections::HashSet;
use std::sync::Arc;

use super::{AppResult, TaskPersistence};
use crate::domain::*;
use crate::ports::{KeyValueStore, StoreEvent, StoreObserver};

/// A slot on the board: a status column and a position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub status: Status,
    pub index: usize,
}

/// Outcome of a drag gesture. `destination` is `None` when the drag was
/// cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct DragResult {
    pub task_id: TaskId,
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

/// Owns the active and deleted task collections.
///
/// Every successful mutation rewrites the collection(s) it touched through
/// [`TaskPersistence`]. Operations naming an unknown id do nothing and
/// report `false`/`None`; the only error is a failed write.
pub struct TaskStore {
    persistence: TaskPersistence,
    observer: Arc<dyn StoreObserver>,
    comment_author: String,
    active: Vec<Task>,
    deleted: Vec<Task>,
}

impl TaskStore {
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        observer: Arc<dyn StoreObserver>,
    ) -> AppResult<Self> {
        let persistence = TaskPersistence::new(store, observer.clone());
        let active = persistence.load_active()?;
        let mut deleted = persistence.load_deleted()?;

        // The two collections must be disjoint; a hand-edited store can break
        // that, in which case the board copy wins.
        let active_ids: HashSet<&TaskId> = active.iter().map(|t| &t.id).collect();
        let mut dropped = Vec::new();
        deleted.retain(|task| {
            let duplicate = active_ids.contains(&task.id);
            if duplicate {
                dropped.push(task.id.clone());
            }
            !duplicate
        });
        if !dropped.is_empty() {
            persistence.save_deleted(&deleted)?;
        }
        for task_id in dropped {
            observer.record(&StoreEvent::DuplicateDropped { task_id });
        }

        Ok(Self {
            persistence,
            observer,
            comment_author: LOCAL_AUTHOR.to_string(),
            active,
            deleted,
        })
    }

    pub fn with_comment_author(mut self, author: impl Into<String>) -> Self {
        self.comment_author = author.into();
        self
    }

    /// Tasks on the board, in display order.
    pub fn active(&self) -> &[Task] {
        &self.active
    }

    /// Tasks in the trash, oldest deletion first.
    pub fn deleted(&self) -> &[Task] {
        &self.deleted
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.active.iter().find(|t| &t.id == id)
    }

    pub fn get_deleted(&self, id: &TaskId) -> Option<&Task> {
        self.deleted.iter().find(|t| &t.id == id)
    }

    pub fn create(&mut self, draft: TaskDraft) -> AppResult<Task> {
        let task = Task::from_draft(draft);
        let task_id = task.id.clone();

        self.active.push(task.clone());
        sort_by_priority(&mut self.active);
        self.persistence.save_active(&self.active)?;

        self.observer.record(&StoreEvent::TaskCreated { task_id });
        Ok(task)
    }

    /// Merge `update` into the stored task; see [`Task::apply`].
    pub fn update(&mut self, update: TaskUpdate) -> AppResult<Option<Task>> {
        let Some(position) = self.position(&update.id) else {
            self.not_found("update", &update.id);
            return Ok(None);
        };

        let task_id = update.id.clone();
        self.active[position].apply(update);
        let updated = self.active[position].clone();

        sort_by_priority(&mut self.active);
        self.persistence.save_active(&self.active)?;

        self.observer.record(&StoreEvent::TaskUpdated { task_id });
        Ok(Some(updated))
    }

    /// Soft delete: the task moves to the end of the trash intact.
    pub fn delete(&mut self, id: &TaskId) -> AppResult<bool> {
        let Some(position) = self.position(id) else {
            self.not_found("delete", id);
            return Ok(false);
        };

        let task = self.active.remove(position);
        self.deleted.push(task);
        // Trash first: a failure between the writes leaves the task in both
        // collections, which `open` repairs, rather than in neither.
        self.persistence.save_deleted(&self.deleted)?;
        self.persistence.save_active(&self.active)?;

        self.observer
            .record(&StoreEvent::TaskDeleted { task_id: id.clone() });
        Ok(true)
    }

    pub fn restore(&mut self, id: &TaskId) -> AppResult<bool> {
        let Some(position) = self.deleted_position(id) else {
            self.not_found("restore", id);
            return Ok(false);
        };

        let task = self.deleted.remove(position);
        self.active.push(task);
        sort_by_priority(&mut self.active);
        self.persistence.save_active(&self.active)?;
        self.persistence.save_deleted(&self.deleted)?;

        self.observer
            .record(&StoreEvent::TaskRestored { task_id: id.clone() });
        Ok(true)
    }

    /// Permanently remove one task from the trash.
    pub fn purge_one(&mut self, id: &TaskId) -> AppResult<bool> {
        let Some(position) = self.deleted_position(id) else {
            self.not_found("purge", id);
            return Ok(false);
        };

        self.deleted.remove(position);
        self.persistence.save_deleted(&self.deleted)?;

        self.observer
            .record(&StoreEvent::TaskPurged { task_id: id.clone() });
        Ok(true)
    }

    /// Empty the trash. Returns how many tasks were purged.
    pub fn purge_all(&mut self) -> AppResult<usize> {
        let count = self.deleted.len();
        self.deleted.clear();
        self.persistence.save_deleted(&self.deleted)?;

        self.observer.record(&StoreEvent::TrashEmptied { count });
        Ok(count)
    }

    /// Set a task's status in place. Position is untouched: priority order
    /// does not depend on status.
    pub fn change_status(&mut self, id: &TaskId, status: Status) -> AppResult<bool> {
        let Some(position) = self.position(id) else {
            self.not_found("change_status", id);
            return Ok(false);
        };

        let from = self.active[position].status;
        self.active[position].status = status;
        self.persistence.save_active(&self.active)?;

        self.observer.record(&StoreEvent::StatusChanged {
            task_id: id.clone(),
            from,
            to: status,
        });
        Ok(true)
    }

    /// Append a comment. Blank text is ignored.
    pub fn add_comment(&mut self, id: &TaskId, text: &str) -> AppResult<Option<Comment>> {
        let text = text.trim();
        let Some(position) = self.position(id) else {
            self.not_found("add_comment", id);
            return Ok(None);
        };
        if text.is_empty() {
            self.observer
                .record(&StoreEvent::EmptyCommentIgnored { task_id: id.clone() });
            return Ok(None);
        }

        let comment = Comment::new(text, self.comment_author.as_str());
        self.active[position].comments.push(comment.clone());
        self.persistence.save_active(&self.active)?;

        self.observer.record(&StoreEvent::CommentAdded {
            task_id: id.clone(),
            comment_id: comment.id.clone(),
        });
        Ok(Some(comment))
    }

    /// Apply a finished drag. The dragged task takes the destination
    /// column's status and is placed at the destination slot. Indices are
    /// positions within a column, not within the whole collection.
    pub fn move_task(&mut self, drag: &DragResult) -> AppResult<bool> {
        let Some(destination) = drag.destination else {
            self.observer.record(&StoreEvent::DragCancelled {
                task_id: drag.task_id.clone(),
            });
            return Ok(false);
        };
        if destination == drag.source {
            return Ok(false);
        }
        let Some(position) = self.position(&drag.task_id) else {
            self.not_found("move", &drag.task_id);
            return Ok(false);
        };

        let mut task = self.active.remove(position);
        task.status = destination.status;

        let insert_at = self.absolute_index(destination);
        self.active.insert(insert_at, task);
        self.persistence.save_active(&self.active)?;

        self.observer.record(&StoreEvent::TaskMoved {
            task_id: drag.task_id.clone(),
            to: destination.status,
            index: destination.index,
        });
        Ok(true)
    }

    // Translate a column slot into a position in `active`.
    fn absolute_index(&self, location: DropLocation) -> usize {
        let column: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == location.status)
            .map(|(i, _)| i)
            .collect();

        match column.get(location.index) {
            Some(&i) => i,
            None => column.last().map_or(self.active.len(), |&last| last + 1),
        }
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.active.iter().position(|t| &t.id == id)
    }

    fn deleted_position(&self, id: &TaskId) -> Option<usize> {
        self.deleted.iter().position(|t| &t.id == id)
    }

    fn not_found(&self, operation: &'static str, id: &TaskId) {
        self.observer.record(&StoreEvent::TaskNotFound {
            operation,
            task_id: id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::observability::TracingObserver;
    use crate::adapters::storage::MemoryKeyValueStore;
    use crate::application::{ACTIVE_TASKS_KEY, DELETED_TASKS_KEY};
    use crate::ports::{MockKeyValueStore, MockStoreObserver, StoreError};
    use std::sync::Mutex;

    fn recording_observer() -> (MockStoreObserver, Arc<Mutex<Vec<StoreEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut observer = MockStoreObserver::new();
        observer
            .expect_record()
            .returning(move |event| sink.lock().unwrap().push(event.clone()));
        (observer, events)
    }

    fn open_store(kv: Arc<MemoryKeyValueStore>) -> TaskStore {
        TaskStore::open(kv, Arc::new(TracingObserver)).unwrap()
    }

    fn seeded(active: &[Task], deleted: &[Task]) -> (Arc<MemoryKeyValueStore>, TaskStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(ACTIVE_TASKS_KEY, &serde_json::to_string(active).unwrap())
            .unwrap();
        kv.set(DELETED_TASKS_KEY, &serde_json::to_string(deleted).unwrap())
            .unwrap();
        let store = open_store(kv.clone());
        (kv, store)
    }

    fn task(id: &str, title: &str, priority: Priority, status: Status) -> Task {
        Task {
            id: id.into(),
            title: title.to_string(),
            description: String::new(),
            priority,
            status,
            deadline: None,
            comments: Vec::new(),
        }
    }

    fn stored(kv: &MemoryKeyValueStore, key: &str) -> Vec<Task> {
        serde_json::from_str(&kv.get(key).unwrap().unwrap()).unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.0.as_str()).collect()
    }

    #[test]
    fn create_adds_todo_task_and_persists() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mut store = open_store(kv.clone());

        let created = store
            .create(TaskDraft::new("Test Task").with_priority(Priority::Medium))
            .unwrap();

        assert_eq!(store.active().len(), 1);
        assert_eq!(store.active()[0].title, "Test Task");
        assert_eq!(store.active()[0].status, Status::Todo);
        assert!(store.active()[0].comments.is_empty());
        assert_eq!(stored(&kv, ACTIVE_TASKS_KEY), vec![created]);
    }

    #[test]
    fn create_keeps_priority_order() {
        let mut store = open_store(Arc::new(MemoryKeyValueStore::new()));

        store.create(TaskDraft::new("low").with_priority(Priority::Low)).unwrap();
        store.create(TaskDraft::new("med").with_priority(Priority::Medium)).unwrap();
        store.create(TaskDraft::new("high").with_priority(Priority::High)).unwrap();
        store.create(TaskDraft::new("med2").with_priority(Priority::Medium)).unwrap();

        let titles: Vec<_> = store.active().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["high", "med", "med2", "low"]);
        assert!(is_priority_ordered(store.active()));
    }

    #[test]
    fn created_ids_are_unique() {
        let mut store = open_store(Arc::new(MemoryKeyValueStore::new()));
        for i in 0..20 {
            store.create(TaskDraft::new(format!("task {i}"))).unwrap();
        }
        let unique: HashSet<_> = store.active().iter().map(|t| &t.id).collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn update_merges_and_resorts() {
        let mut seeded_task = task("1", "Old", Priority::Low, Status::InProgress);
        seeded_task.comments.push(Comment::new("note", LOCAL_AUTHOR));
        let (kv, mut store) = seeded(
            &[
                task("2", "Other", Priority::Medium, Status::Todo),
                seeded_task.clone(),
            ],
            &[],
        );

        let mut update = TaskUpdate::new("1".into());
        update.title = Some("New".to_string());
        update.priority = Some(Priority::High);
        let updated = store.update(update).unwrap().unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.comments, seeded_task.comments);
        assert_eq!(ids(store.active()), ["1", "2"]);
        assert_eq!(ids(&stored(&kv, ACTIVE_TASKS_KEY)), ["1", "2"]);
    }

    #[test]
    fn update_without_status_keeps_stored_status() {
        let (_, mut store) = seeded(&[task("1", "T", Priority::Medium, Status::Todo)], &[]);
        store.change_status(&"1".into(), Status::Completed).unwrap();

        let mut update = TaskUpdate::new("1".into());
        update.description = Some("edited".to_string());
        store.update(update).unwrap();

        assert_eq!(store.active()[0].status, Status::Completed);
        assert_eq!(store.active()[0].description, "edited");
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (observer, events) = recording_observer();
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mut store = TaskStore::open(kv.clone(), Arc::new(observer)).unwrap();

        let result = store.update(TaskUpdate::new("missing".into())).unwrap();

        assert!(result.is_none());
        assert!(kv.get(ACTIVE_TASKS_KEY).unwrap().is_none());
        assert!(events.lock().unwrap().contains(&StoreEvent::TaskNotFound {
            operation: "update",
            task_id: "missing".into(),
        }));
    }

    #[test]
    fn delete_moves_task_to_trash() {
        let (kv, mut store) = seeded(&[task("1", "T", Priority::Medium, Status::Todo)], &[]);

        assert!(store.delete(&"1".into()).unwrap());

        assert!(store.active().is_empty());
        assert_eq!(ids(store.deleted()), ["1"]);
        assert!(stored(&kv, ACTIVE_TASKS_KEY).is_empty());
        assert_eq!(ids(&stored(&kv, DELETED_TASKS_KEY)), ["1"]);
    }

    #[test]
    fn delete_appends_without_sorting_trash() {
        let (_, mut store) = seeded(
            &[
                task("h", "high", Priority::High, Status::Todo),
                task("l", "low", Priority::Low, Status::Todo),
            ],
            &[],
        );

        store.delete(&"l".into()).unwrap();
        store.delete(&"h".into()).unwrap();

        assert_eq!(ids(store.deleted()), ["l", "h"]);
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let (_, mut store) = seeded(&[task("1", "T", Priority::Medium, Status::Todo)], &[]);
        assert!(!store.delete(&"2".into()).unwrap());
        assert_eq!(store.active().len(), 1);
        assert!(store.deleted().is_empty());
    }

    #[test]
    fn restore_moves_task_back() {
        let (kv, mut store) = seeded(&[], &[task("1", "T", Priority::Medium, Status::Todo)]);

        assert!(store.restore(&"1".into()).unwrap());

        assert_eq!(ids(store.active()), ["1"]);
        assert!(store.deleted().is_empty());
        assert_eq!(ids(&stored(&kv, ACTIVE_TASKS_KEY)), ["1"]);
        assert!(stored(&kv, DELETED_TASKS_KEY).is_empty());
    }

    #[test]
    fn delete_then_restore_round_trips_exactly() {
        let mut original = task("1", "T", Priority::Low, Status::InProgress);
        original.description = "details".to_string();
        original.deadline = Some(parse_deadline("2030-01-02").unwrap());
        original.comments.push(Comment::new("hi", LOCAL_AUTHOR));
        let (kv, mut store) = seeded(
            &[task("0", "first", Priority::High, Status::Todo), original.clone()],
            &[],
        );

        store.delete(&"1".into()).unwrap();
        store.restore(&"1".into()).unwrap();

        assert_eq!(store.get(&"1".into()), Some(&original));
        assert!(store.get_deleted(&"1".into()).is_none());

        // Reloading from storage yields the same bytes.
        let reopened = open_store(kv);
        assert_eq!(reopened.get(&"1".into()), Some(&original));
    }

    #[test]
    fn restore_resorts_active() {
        let (_, mut store) = seeded(
            &[
                task("m", "medium", Priority::Medium, Status::Todo),
                task("l", "low", Priority::Low, Status::Todo),
            ],
            &[task("h", "high", Priority::High, Status::Completed)],
        );

        store.restore(&"h".into()).unwrap();

        assert_eq!(ids(store.active()), ["h", "m", "l"]);
    }

    #[test]
    fn restore_goes_after_tasks_of_equal_priority() {
        let (kv, mut store) = seeded(
            &[
                task("m1", "first", Priority::Medium, Status::Todo),
                task("m2", "second", Priority::Medium, Status::InProgress),
            ],
            &[task("r", "restored", Priority::Medium, Status::Todo)],
        );

        store.restore(&"r".into()).unwrap();

        assert_eq!(ids(store.active()), ["m1", "m2", "r"]);
        assert_eq!(ids(&stored(&kv, ACTIVE_TASKS_KEY)), ["m1", "m2", "r"]);
    }

    #[test]
    fn purge_one_removes_only_that_task() {
        let (kv, mut store) = seeded(
            &[],
            &[
                task("1", "a", Priority::Medium, Status::Todo),
                task("2", "b", Priority::Medium, Status::Todo),
            ],
        );

        assert!(store.purge_one(&"1".into()).unwrap());
        assert!(!store.purge_one(&"1".into()).unwrap());

        assert_eq!(ids(store.deleted()), ["2"]);
        assert_eq!(ids(&stored(&kv, DELETED_TASKS_KEY)), ["2"]);
    }

    #[test]
    fn purge_one_ignores_active_tasks() {
        let (_, mut store) = seeded(&[task("1", "a", Priority::Medium, Status::Todo)], &[]);
        assert!(!store.purge_one(&"1".into()).unwrap());
        assert_eq!(store.active().len(), 1);
    }

    #[test]
    fn purge_all_empties_trash_and_is_idempotent() {
        let (kv, mut store) = seeded(
            &[],
            &[
                task("1", "a", Priority::Medium, Status::Todo),
                task("2", "b", Priority::Low, Status::Todo),
            ],
        );

        assert_eq!(store.purge_all().unwrap(), 2);
        assert!(store.deleted().is_empty());
        assert_eq!(store.purge_all().unwrap(), 0);
        assert!(store.deleted().is_empty());
        assert!(stored(&kv, DELETED_TASKS_KEY).is_empty());
    }

    #[test]
    fn change_status_does_not_resort() {
        let (kv, mut store) = seeded(
            &[
                task("1", "a", Priority::High, Status::Todo),
                task("2", "b", Priority::Low, Status::Todo),
            ],
            &[],
        );

        assert!(store.change_status(&"2".into(), Status::InProgress).unwrap());

        assert_eq!(ids(store.active()), ["1", "2"]);
        assert_eq!(store.active()[1].status, Status::InProgress);
        assert!(store.deleted().is_empty());
        assert_eq!(stored(&kv, ACTIVE_TASKS_KEY)[1].status, Status::InProgress);
    }

    #[test]
    fn change_status_unknown_id_is_noop() {
        let (_, mut store) = seeded(&[], &[task("1", "a", Priority::High, Status::Todo)]);
        assert!(!store.change_status(&"1".into(), Status::Completed).unwrap());
        assert_eq!(store.deleted()[0].status, Status::Todo);
    }

    #[test]
    fn add_comment_appends_with_author() {
        let (kv, _) = seeded(&[task("1", "a", Priority::High, Status::Todo)], &[]);
        let mut store = open_store(kv.clone()).with_comment_author("Tester");

        let first = store.add_comment(&"1".into(), "  first  ").unwrap().unwrap();
        store.add_comment(&"1".into(), "second").unwrap();

        let comments = &store.active()[0].comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0], first);
        assert_eq!(comments[0].text, "first");
        assert_eq!(comments[0].author, "Tester");
        assert_eq!(comments[1].text, "second");
        assert_ne!(comments[0].id, comments[1].id);
        assert_eq!(stored(&kv, ACTIVE_TASKS_KEY)[0].comments.len(), 2);
    }

    #[test]
    fn add_comment_to_unknown_task_is_noop() {
        let (_, mut store) = seeded(&[], &[task("1", "a", Priority::High, Status::Todo)]);
        assert!(store.add_comment(&"1".into(), "hello").unwrap().is_none());
        assert!(store.deleted()[0].comments.is_empty());
    }

    #[test]
    fn add_empty_comment_is_noop() {
        let (_, mut store) = seeded(&[task("1", "a", Priority::High, Status::Todo)], &[]);

        assert!(store.add_comment(&"1".into(), "").unwrap().is_none());
        assert!(store.add_comment(&"1".into(), "   \n").unwrap().is_none());

        assert!(store.active()[0].comments.is_empty());
    }

    #[test]
    fn move_to_other_column_sets_status_and_position() {
        let (kv, mut store) = seeded(
            &[
                task("a", "a", Priority::High, Status::Todo),
                task("b", "b", Priority::High, Status::InProgress),
                task("c", "c", Priority::Medium, Status::Todo),
                task("d", "d", Priority::Low, Status::InProgress),
            ],
            &[],
        );

        let moved = store
            .move_task(&DragResult {
                task_id: "c".into(),
                source: DropLocation { status: Status::Todo, index: 1 },
                destination: Some(DropLocation { status: Status::InProgress, index: 1 }),
            })
            .unwrap();

        assert!(moved);
        assert_eq!(ids(store.active()), ["a", "b", "c", "d"]);
        assert_eq!(store.get(&"c".into()).unwrap().status, Status::InProgress);
        assert_eq!(stored(&kv, ACTIVE_TASKS_KEY)[2].status, Status::InProgress);
    }

    #[test]
    fn move_to_top_of_column() {
        let (_, mut store) = seeded(
            &[
                task("a", "a", Priority::High, Status::Todo),
                task("b", "b", Priority::High, Status::InProgress),
                task("c", "c", Priority::Low, Status::Todo),
            ],
            &[],
        );

        store
            .move_task(&DragResult {
                task_id: "c".into(),
                source: DropLocation { status: Status::Todo, index: 1 },
                destination: Some(DropLocation { status: Status::InProgress, index: 0 }),
            })
            .unwrap();

        assert_eq!(ids(store.active()), ["a", "c", "b"]);
    }

    #[test]
    fn move_past_end_or_into_empty_column() {
        let (_, mut store) = seeded(
            &[
                task("a", "a", Priority::High, Status::Todo),
                task("b", "b", Priority::High, Status::InProgress),
                task("c", "c", Priority::Low, Status::Todo),
            ],
            &[],
        );

        store
            .move_task(&DragResult {
                task_id: "a".into(),
                source: DropLocation { status: Status::Todo, index: 0 },
                destination: Some(DropLocation { status: Status::InProgress, index: 9 }),
            })
            .unwrap();
        assert_eq!(ids(store.active()), ["b", "a", "c"]);

        store
            .move_task(&DragResult {
                task_id: "b".into(),
                source: DropLocation { status: Status::InProgress, index: 0 },
                destination: Some(DropLocation { status: Status::Completed, index: 0 }),
            })
            .unwrap();
        assert_eq!(ids(store.active()), ["a", "c", "b"]);
        assert_eq!(store.get(&"b".into()).unwrap().status, Status::Completed);
    }

    #[test]
    fn move_within_column_reorders() {
        let (_, mut store) = seeded(
            &[
                task("a", "a", Priority::Medium, Status::Todo),
                task("b", "b", Priority::Medium, Status::Todo),
                task("c", "c", Priority::Medium, Status::Todo),
            ],
            &[],
        );

        store
            .move_task(&DragResult {
                task_id: "c".into(),
                source: DropLocation { status: Status::Todo, index: 2 },
                destination: Some(DropLocation { status: Status::Todo, index: 0 }),
            })
            .unwrap();

        assert_eq!(ids(store.active()), ["c", "a", "b"]);
        assert!(store.active().iter().all(|t| t.status == Status::Todo));
    }

    #[test]
    fn move_noops() {
        let (kv, mut store) = seeded(&[task("a", "a", Priority::Medium, Status::Todo)], &[]);
        let before = kv.get(ACTIVE_TASKS_KEY).unwrap();
        let source = DropLocation { status: Status::Todo, index: 0 };

        let cancelled = DragResult {
            task_id: "a".into(),
            source,
            destination: None,
        };
        let same_slot = DragResult {
            task_id: "a".into(),
            source,
            destination: Some(source),
        };
        let unknown = DragResult {
            task_id: "zzz".into(),
            source,
            destination: Some(DropLocation { status: Status::Completed, index: 0 }),
        };

        assert!(!store.move_task(&cancelled).unwrap());
        assert!(!store.move_task(&same_slot).unwrap());
        assert!(!store.move_task(&unknown).unwrap());
        assert_eq!(store.active()[0].status, Status::Todo);
        assert_eq!(kv.get(ACTIVE_TASKS_KEY).unwrap(), before);
    }

    #[test]
    fn open_treats_corrupt_snapshots_as_empty() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(ACTIVE_TASKS_KEY, "not json").unwrap();
        kv.set(DELETED_TASKS_KEY, "[{\"broken\": true}]").unwrap();

        let store = open_store(kv);

        assert!(store.active().is_empty());
        assert!(store.deleted().is_empty());
    }

    #[test]
    fn open_drops_trash_entries_that_are_also_active() {
        let shared = task("1", "a", Priority::Medium, Status::Todo);
        let (_, store) = seeded(
            &[shared.clone()],
            &[shared, task("2", "b", Priority::Low, Status::Todo)],
        );

        assert_eq!(ids(store.active()), ["1"]);
        assert_eq!(ids(store.deleted()), ["2"]);
    }

    #[test]
    fn open_writes_back_repaired_trash() {
        let shared = task("1", "a", Priority::Medium, Status::Todo);
        let (kv, _) = seeded(
            &[shared.clone()],
            &[shared, task("2", "b", Priority::Low, Status::Todo)],
        );
        assert_eq!(ids(&stored(&kv, DELETED_TASKS_KEY)), ["2"]);

        let (observer, events) = recording_observer();
        TaskStore::open(kv, Arc::new(observer)).unwrap();

        assert!(!events
            .lock()
            .unwrap()
            .iter()
            .any(|event| matches!(event, StoreEvent::DuplicateDropped { .. })));
    }

    /// Backed by `backing`, except that writes to `rejected` fail.
    fn rejecting_writes(
        backing: Arc<MemoryKeyValueStore>,
        rejected: &'static str,
    ) -> MockKeyValueStore {
        let mut kv = MockKeyValueStore::new();
        let reads = backing.clone();
        kv.expect_get().returning(move |key| reads.get(key));
        kv.expect_set().returning(move |key, value| {
            if key == rejected {
                return Err(StoreError::Write {
                    key: key.to_string(),
                    message: "disk full".to_string(),
                });
            }
            backing.set(key, value)
        });
        kv
    }

    #[test]
    fn failed_delete_never_loses_the_task() {
        for rejected in [DELETED_TASKS_KEY, ACTIVE_TASKS_KEY] {
            let backing = Arc::new(MemoryKeyValueStore::new());
            let created = open_store(backing.clone())
                .create(TaskDraft::new("precious"))
                .unwrap();

            let mut store = TaskStore::open(
                Arc::new(rejecting_writes(backing.clone(), rejected)),
                Arc::new(TracingObserver),
            )
            .unwrap();
            assert!(store.delete(&created.id).is_err());

            let reopened = open_store(backing);
            assert_eq!(reopened.get(&created.id), Some(&created), "rejected {rejected}");
            assert!(reopened.deleted().is_empty(), "rejected {rejected}");
        }
    }

    #[test]
    fn write_failure_surfaces_as_error() {
        let mut kv = MockKeyValueStore::new();
        kv.expect_get().returning(|_| Ok(None));
        kv.expect_set().returning(|key, _| {
            Err(StoreError::Write {
                key: key.to_string(),
                message: "disk full".to_string(),
            })
        });

        let mut store = TaskStore::open(Arc::new(kv), Arc::new(TracingObserver)).unwrap();
        let result = store.create(TaskDraft::new("Test Task"));

        assert!(matches!(result, Err(crate::application::AppError::Store(_))));
    }

    #[test]
    fn mutations_report_to_observer() {
        let (observer, events) = recording_observer();
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(
            ACTIVE_TASKS_KEY,
            &serde_json::to_string(&[task("1", "a", Priority::High, Status::Todo)]).unwrap(),
        )
        .unwrap();
        let mut store = TaskStore::open(kv, Arc::new(observer)).unwrap();

        store.delete(&"1".into()).unwrap();
        store.restore(&"1".into()).unwrap();
        store.add_comment(&"1".into(), " ").unwrap();

        let events = events.lock().unwrap();
        assert!(events.contains(&StoreEvent::TaskDeleted { task_id: "1".into() }));
        assert!(events.contains(&StoreEvent::TaskRestored { task_id: "1".into() }));
        assert!(events.contains(&StoreEvent::EmptyCommentIgnored { task_id: "1".into() }));
        assert!(events.contains(&StoreEvent::SnapshotPersisted {
            key: DELETED_TASKS_KEY,
            count: 0,
        }));
    }
}
