use crate::domain::{CommentId, Status, TaskId};

/// Something the task store did, reported to whoever is watching.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SnapshotLoaded {
        key: &'static str,
        count: usize,
    },
    /// A stored value could not be parsed and was replaced by an empty
    /// collection.
    SnapshotCorrupt {
        key: &'static str,
        error: String,
    },
    /// A task id was found in both collections on load; the trash copy was
    /// dropped.
    DuplicateDropped {
        task_id: TaskId,
    },
    SnapshotPersisted {
        key: &'static str,
        count: usize,
    },
    TaskCreated {
        task_id: TaskId,
    },
    TaskUpdated {
        task_id: TaskId,
    },
    TaskDeleted {
        task_id: TaskId,
    },
    TaskRestored {
        task_id: TaskId,
    },
    TaskPurged {
        task_id: TaskId,
    },
    TrashEmptied {
        count: usize,
    },
    StatusChanged {
        task_id: TaskId,
        from: Status,
        to: Status,
    },
    CommentAdded {
        task_id: TaskId,
        comment_id: CommentId,
    },
    EmptyCommentIgnored {
        task_id: TaskId,
    },
    TaskMoved {
        task_id: TaskId,
        to: Status,
        index: usize,
    },
    DragCancelled {
        task_id: TaskId,
    },
    TaskNotFound {
        operation: &'static str,
        task_id: TaskId,
    },
}

#[cfg_attr(test, mockall::automock)]
pub trait StoreObserver: Send + Sync {
    fn record(&self, event: &StoreEvent);
}
