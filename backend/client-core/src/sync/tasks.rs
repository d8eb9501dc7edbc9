//! Task list synchronization: mutate-then-reconcile.

use crate::api::ApiClient;
use crate::error::api::ApiError;
use crate::error::sync::SyncError;
use crate::sync::validate_text;

use models::{MAX_DESCRIPTION_CHARS, Task, TaskCreate, TaskUpdate};

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::RwLock;
use uuid::Uuid;

const TASKS_ENDPOINT: &str = "/api/tasks";

/// Task statistics derived from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Result of an `update` call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The trimmed description matched the cached value; no call was issued
    /// and no pending state exists.
    Unchanged,
    /// The server confirmed the edit; the cache now holds this entity.
    Updated(Task),
}

/// A delete that has been requested but not yet confirmed.
///
/// Deleting is a two-step commit: [`TaskSync::request_delete`] hands the
/// caller this token to show its confirmation dialog around, and only
/// [`TaskSync::confirm_delete`] touches the server. Dropping the token
/// abandons the delete with no side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub task_id: Uuid,
    pub description: String,
}

/// Synchronizer for the task list.
///
/// Cheap to clone; all clones share the same cache.
#[derive(Clone)]
pub struct TaskSync {
    inner: Arc<TaskSyncInner>,
}

struct TaskSyncInner {
    api: ApiClient,
    cache: RwLock<Vec<Task>>,
}

impl TaskSync {
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(TaskSyncInner {
                api,
                cache: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Replace the cache with the server's task list.
    pub async fn load(&self) -> Result<Vec<Task>, SyncError> {
        let tasks: Vec<Task> = self.inner.api.get(TASKS_ENDPOINT).await?;
        info!("Loaded {} tasks", tasks.len());

        let mut cache = self.inner.cache.write().await;
        *cache = tasks.clone();
        Ok(tasks)
    }

    /// Snapshot of the cached task list.
    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.cache.read().await.clone()
    }

    /// Statistics over the cached task list.
    pub async fn summary(&self) -> TaskSummary {
        let cache = self.inner.cache.read().await;
        let completed = cache.iter().filter(|t| t.is_completed).count();
        TaskSummary {
            total: cache.len(),
            completed,
            pending: cache.len() - completed,
        }
    }

    /// Create a task and prepend the server's entity to the cache.
    ///
    /// No optimistic placeholder: creation has no pre-existing entry to roll
    /// back, so the cache changes only on confirmation.
    pub async fn create(&self, description: &str) -> Result<Task, SyncError> {
        let description = validate_text("description", description, Some(MAX_DESCRIPTION_CHARS))?;

        let body = TaskCreate { description };
        let task: Task = self.inner.api.post(TASKS_ENDPOINT, &body).await?;
        info!("Created task {}", task.id);

        let mut cache = self.inner.cache.write().await;
        cache.insert(0, task.clone());
        Ok(task)
    }

    /// Flip completion optimistically, then reconcile with the server.
    ///
    /// On success the cache entry is replaced wholesale with the returned
    /// entity (guards against clock/field drift); on failure the flip is
    /// reverted. Each call flips relative to the cache at invocation time -
    /// rapid toggles of the same id can race, and the last completing
    /// response wins.
    pub async fn toggle(&self, id: Uuid) -> Result<Task, SyncError> {
        let previous = {
            let mut cache = self.inner.cache.write().await;
            let task = cache
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| SyncError::unknown_entity(id))?;
            let previous = task.is_completed;
            task.is_completed = !previous;
            previous
        };

        let result: Result<Task, ApiError> = self
            .inner
            .api
            .patch(&format!("{TASKS_ENDPOINT}/{id}/toggle"))
            .await;

        match result {
            Ok(confirmed) => {
                debug!("Toggle confirmed for task {}", id);
                let mut cache = self.inner.cache.write().await;
                if let Some(task) = cache.iter_mut().find(|t| t.id == id) {
                    *task = confirmed.clone();
                }
                Ok(confirmed)
            }
            Err(e) => {
                warn!("Toggle failed for task {} - reverting: {}", id, e);
                let mut cache = self.inner.cache.write().await;
                if let Some(task) = cache.iter_mut().find(|t| t.id == id) {
                    task.is_completed = previous;
                }
                Err(e.into())
            }
        }
    }

    /// Edit a description with server-first confirmation.
    ///
    /// No optimistic write here: the cache is updated only after the server
    /// confirms, and the pending state is the caller's in-flight future. An
    /// edit that matches the cached value (after trim) is a no-op that never
    /// touches the network.
    pub async fn update(&self, id: Uuid, description: &str) -> Result<UpdateOutcome, SyncError> {
        let description = validate_text("description", description, Some(MAX_DESCRIPTION_CHARS))?;

        {
            let cache = self.inner.cache.read().await;
            let task = cache
                .iter()
                .find(|t| t.id == id)
                .ok_or_else(|| SyncError::unknown_entity(id))?;
            if task.description == description {
                debug!("Update for task {} is unchanged - skipping call", id);
                return Ok(UpdateOutcome::Unchanged);
            }
        }

        let body = TaskUpdate { description };
        let confirmed: Task = self
            .inner
            .api
            .put(&format!("{TASKS_ENDPOINT}/{id}"), &body)
            .await?;
        info!("Updated task {}", id);

        let mut cache = self.inner.cache.write().await;
        if let Some(task) = cache.iter_mut().find(|t| t.id == id) {
            *task = confirmed.clone();
        }
        Ok(UpdateOutcome::Updated(confirmed))
    }

    /// First half of the two-step delete: verify the entry and hand back a
    /// confirmation token. No server call, no cache change.
    pub async fn request_delete(&self, id: Uuid) -> Result<PendingDelete, SyncError> {
        let cache = self.inner.cache.read().await;
        let task = cache
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| SyncError::unknown_entity(id))?;
        Ok(PendingDelete {
            task_id: task.id,
            description: task.description.clone(),
        })
    }

    /// Second half of the two-step delete: execute against the server.
    ///
    /// A 404 is treated as already-deleted (the entry is removed and the
    /// call succeeds). Any other failure retains the entry and surfaces the
    /// error; nothing is retried automatically.
    pub async fn confirm_delete(&self, pending: PendingDelete) -> Result<(), SyncError> {
        let id = pending.task_id;
        let result = self
            .inner
            .api
            .delete(&format!("{TASKS_ENDPOINT}/{id}"))
            .await;

        match result {
            Ok(()) => {
                info!("Deleted task {}", id);
            }
            Err(ApiError::Http { status, .. }) if status.is_not_found() => {
                debug!("Task {} already gone server-side", id);
            }
            Err(e) => {
                warn!("Delete failed for task {} - entry retained: {}", id, e);
                return Err(e.into());
            }
        }

        let mut cache = self.inner.cache.write().await;
        cache.retain(|t| t.id != id);
        Ok(())
    }
}
