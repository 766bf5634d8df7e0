use crate::ports::{StoreEvent, StoreObserver};

/// Forwards store events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn record(&self, event: &StoreEvent) {
        match event {
            StoreEvent::SnapshotLoaded { key, count } => {
                tracing::debug!(key, count, "loaded snapshot");
            }
            StoreEvent::SnapshotCorrupt { key, error } => {
                tracing::warn!(key, %error, "stored value is not valid task JSON, starting empty");
            }
            StoreEvent::DuplicateDropped { task_id } => {
                tracing::warn!(%task_id, "task present in both board and trash, dropped trash copy");
            }
            StoreEvent::SnapshotPersisted { key, count } => {
                tracing::debug!(key, count, "persisted snapshot");
            }
            StoreEvent::TaskCreated { task_id } => {
                tracing::info!(%task_id, "task created");
            }
            StoreEvent::TaskUpdated { task_id } => {
                tracing::info!(%task_id, "task updated");
            }
            StoreEvent::TaskDeleted { task_id } => {
                tracing::info!(%task_id, "task moved to trash");
            }
            StoreEvent::TaskRestored { task_id } => {
                tracing::info!(%task_id, "task restored");
            }
            StoreEvent::TaskPurged { task_id } => {
                tracing::info!(%task_id, "task permanently deleted");
            }
            StoreEvent::TrashEmptied { count } => {
                tracing::info!(count, "trash emptied");
            }
            StoreEvent::StatusChanged { task_id, from, to } => {
                tracing::info!(%task_id, %from, %to, "status changed");
            }
            StoreEvent::CommentAdded {
                task_id,
                comment_id,
            } => {
                tracing::info!(%task_id, %comment_id, "comment added");
            }
            StoreEvent::EmptyCommentIgnored { task_id } => {
                tracing::debug!(%task_id, "ignored empty comment");
            }
            StoreEvent::TaskMoved { task_id, to, index } => {
                tracing::info!(%task_id, %to, index, "task moved");
            }
            StoreEvent::DragCancelled { task_id } => {
                tracing::debug!(%task_id, "drag cancelled");
            }
            StoreEvent::TaskNotFound { operation, task_id } => {
                tracing::debug!(operation, %task_id, "no such task, ignoring");
            }
        }
    }
}
