//! In-process task repository.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StudivonError, StudivonResult};
use crate::traits::TaskRepository;
use crate::types::{SubjectAggregate, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus};

/// Stored record plus its insertion sequence, so unsorted reads are stable.
struct Entry {
    seq: u64,
    task: Task,
}

/// Task repository held entirely in memory.
///
/// All writes take the lock exclusively, which makes `transition_task`
/// atomic with respect to concurrent completions.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching tasks in insertion order.
    async fn select(&self, filter: &TaskFilter) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        let mut matched: Vec<&Entry> = tasks.values().filter(|e| filter.matches(&e.task)).collect();
        matched.sort_by_key(|e| e.seq);
        matched.into_iter().map(|e| e.task.clone()).collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert_task(&self, mut task: Task) -> StudivonResult<String> {
        let id = Uuid::new_v4().to_string();
        task.id = id.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.tasks.write().await.insert(id.clone(), Entry { seq, task });
        Ok(id)
    }

    async fn get_task(&self, id: &str) -> StudivonResult<Option<Task>> {
        Ok(self.tasks.read().await.get(id).map(|e| e.task.clone()))
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> StudivonResult<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks.get_mut(id).ok_or_else(|| StudivonError::not_found(id))?;
        patch.apply(&mut entry.task);
        Ok(())
    }

    async fn transition_task(
        &self,
        id: &str,
        from: &[TaskStatus],
        patch: TaskPatch,
    ) -> StudivonResult<bool> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks.get_mut(id).ok_or_else(|| StudivonError::not_found(id))?;
        if !from.contains(&entry.task.status) {
            return Ok(false);
        }
        patch.apply(&mut entry.task);
        Ok(true)
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StudivonResult<usize> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().filter(|e| filter.matches(&e.task)).count())
    }

    async fn find_tasks(
        &self,
        filter: &TaskFilter,
        sort: Option<TaskSort>,
        limit: Option<usize>,
    ) -> StudivonResult<Vec<Task>> {
        let mut found = self.select(filter).await;
        if let Some(sort) = sort {
            sort.apply(&mut found);
        }
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn aggregate_by_subject(&self, filter: &TaskFilter) -> StudivonResult<Vec<SubjectAggregate>> {
        let found = self.select(filter).await;

        let mut groups: BTreeMap<&str, (f64, usize, Option<chrono::DateTime<chrono::Utc>>)> =
            BTreeMap::new();
        for task in &found {
            let group = groups.entry(task.subject.as_str()).or_insert((0.0, 0, None));
            group.0 += task.efficiency_or_zero();
            group.1 += 1;
            group.2 = group.2.max(task.completed_at);
        }

        Ok(groups
            .into_iter()
            .map(|(subject, (total, count, last_date))| SubjectAggregate {
                subject: subject.to_string(),
                avg_efficiency: total / count as f64,
                count,
                last_date,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskType;
    use chrono::{Duration, Utc};

    fn practice(subject: &str, priority: u32) -> Task {
        let now = Utc::now();
        Task::pending("t", subject, TaskType::Practice, 3, 60, now, priority, now)
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let repo = InMemoryTaskRepository::new();
        let id = repo.insert_task(practice("Math", 80)).await.unwrap();
        let stored = repo.get_task(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert!(repo.get_task("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transition_only_from_listed_statuses() {
        let repo = InMemoryTaskRepository::new();
        let id = repo.insert_task(practice("Math", 80)).await.unwrap();
        let complete = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };

        let first = repo
            .transition_task(&id, &[TaskStatus::Pending, TaskStatus::Missed], complete.clone())
            .await
            .unwrap();
        let second = repo
            .transition_task(&id, &[TaskStatus::Pending, TaskStatus::Missed], complete)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let err = repo.update_task("nope", TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, StudivonError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_sorts_and_limits() {
        let repo = InMemoryTaskRepository::new();
        for p in [10, 90, 40] {
            repo.insert_task(practice("Math", p)).await.unwrap();
        }
        let top = repo
            .find_tasks(&TaskFilter::pending(), Some(TaskSort::PriorityDesc), Some(2))
            .await
            .unwrap();
        let order: Vec<_> = top.iter().map(|t| t.priority_score).collect();
        assert_eq!(order, vec![90, 40]);

        let unsorted = repo.find_tasks(&TaskFilter::all(), None, None).await.unwrap();
        let order: Vec<_> = unsorted.iter().map(|t| t.priority_score).collect();
        assert_eq!(order, vec![10, 90, 40]);
    }

    #[tokio::test]
    async fn test_aggregate_by_subject() {
        let repo = InMemoryTaskRepository::new();
        let now = Utc::now();
        for (subject, eff, days_ago) in [("Math", 0.5, 3), ("Math", 1.0, 1), ("Art", 1.2, 2)] {
            let mut task = practice(subject, 50);
            task.status = TaskStatus::Completed;
            task.efficiency_score = Some(eff);
            task.completed_at = Some(now - Duration::days(days_ago));
            repo.insert_task(task).await.unwrap();
        }
        repo.insert_task(practice("Math", 50)).await.unwrap();

        let groups = repo.aggregate_by_subject(&TaskFilter::completed()).await.unwrap();
        assert_eq!(groups.len(), 2);
        let math = groups.iter().find(|g| g.subject == "Math").unwrap();
        assert_eq!(math.count, 2);
        assert!((math.avg_efficiency - 0.75).abs() < 1e-9);
        assert_eq!(math.last_date, Some(now - Duration::days(1)));
    }
}
