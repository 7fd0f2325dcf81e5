//! Task repository trait.
//!
//! The engine never talks to storage directly; every read and write goes
//! through this contract so analytics can run against any backend.

use async_trait::async_trait;

use crate::error::StudivonResult;
use crate::types::{SubjectAggregate, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus};

/// Persistence contract for task records.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a task and return the id assigned to it. Any id on the input is ignored.
    async fn insert_task(&self, task: Task) -> StudivonResult<String>;

    /// Fetch a task by id.
    async fn get_task(&self, id: &str) -> StudivonResult<Option<Task>>;

    /// Apply a patch unconditionally. Fails with `NotFound` for an unknown id.
    async fn update_task(&self, id: &str, patch: TaskPatch) -> StudivonResult<()>;

    /// Apply a patch only if the task's current status is one of `from`.
    ///
    /// The check and the write happen atomically. Returns `false` when the
    /// task exists but its status did not match; fails with `NotFound` for
    /// an unknown id.
    async fn transition_task(
        &self,
        id: &str,
        from: &[TaskStatus],
        patch: TaskPatch,
    ) -> StudivonResult<bool>;

    /// Count tasks matching a filter.
    async fn count_tasks(&self, filter: &TaskFilter) -> StudivonResult<usize>;

    /// Find tasks matching a filter, optionally sorted and truncated.
    async fn find_tasks(
        &self,
        filter: &TaskFilter,
        sort: Option<TaskSort>,
        limit: Option<usize>,
    ) -> StudivonResult<Vec<Task>>;

    /// Group matching tasks by subject.
    async fn aggregate_by_subject(&self, filter: &TaskFilter) -> StudivonResult<Vec<SubjectAggregate>>;
}
