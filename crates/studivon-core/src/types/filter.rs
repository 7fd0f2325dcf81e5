//! Filter and sort types for task queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus};

/// Conjunctive filter over task records. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    /// Status equals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Subject equals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Difficulty greater than or equal to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_difficulty: Option<u8>,
    /// `completedAt` greater than or equal to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_since: Option<DateTime<Utc>>,
    /// `completedAt` strictly less than.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_before: Option<DateTime<Utc>>,
    /// `deadline` less than or equal to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_until: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Match every task.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match tasks with the given status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Match pending tasks.
    pub fn pending() -> Self {
        Self::status(TaskStatus::Pending)
    }

    /// Match completed tasks.
    pub fn completed() -> Self {
        Self::status(TaskStatus::Completed)
    }

    /// Restrict to a subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Restrict to difficulty at or above `min`.
    pub fn with_min_difficulty(mut self, min: u8) -> Self {
        self.min_difficulty = Some(min);
        self
    }

    /// Restrict to tasks completed at or after `since`.
    pub fn completed_since(mut self, since: DateTime<Utc>) -> Self {
        self.completed_since = Some(since);
        self
    }

    /// Restrict to tasks completed strictly before `before`.
    pub fn completed_before(mut self, before: DateTime<Utc>) -> Self {
        self.completed_before = Some(before);
        self
    }

    /// Restrict to tasks due at or before `until`.
    pub fn deadline_until(mut self, until: DateTime<Utc>) -> Self {
        self.deadline_until = Some(until);
        self
    }

    /// Evaluate the filter against a task.
    ///
    /// Completion-time bounds never match a task without `completedAt`.
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| task.status != s) {
            return false;
        }
        if self.subject.as_ref().is_some_and(|s| &task.subject != s) {
            return false;
        }
        if self.min_difficulty.is_some_and(|d| task.difficulty < d) {
            return false;
        }
        if let Some(since) = self.completed_since {
            match task.completed_at {
                Some(at) if at >= since => {}
                _ => return false,
            }
        }
        if let Some(before) = self.completed_before {
            match task.completed_at {
                Some(at) if at < before => {}
                _ => return false,
            }
        }
        if self.deadline_until.is_some_and(|until| task.deadline > until) {
            return false;
        }
        true
    }
}

/// Sort orders the engine asks of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    /// Highest priority first.
    PriorityDesc,
    /// Most recently completed first.
    CompletedAtDesc,
    /// Oldest completion first.
    CompletedAtAsc,
}

impl TaskSort {
    /// Sort a slice in place. Stable, so ties keep insertion order.
    pub fn apply(self, tasks: &mut [Task]) {
        match self {
            TaskSort::PriorityDesc => tasks.sort_by(|a, b| b.priority_score.cmp(&a.priority_score)),
            TaskSort::CompletedAtDesc => tasks.sort_by(|a, b| b.completed_at.cmp(&a.completed_at)),
            TaskSort::CompletedAtAsc => tasks.sort_by(|a, b| a.completed_at.cmp(&b.completed_at)),
        }
    }
}

/// Per-subject aggregate over a filtered task set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAggregate {
    pub subject: String,
    /// Mean efficiency score; tasks without a score count as zero.
    pub avg_efficiency: f64,
    pub count: usize,
    /// Latest `completedAt` in the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskType;
    use chrono::Duration;

    fn task(subject: &str, difficulty: u8, completed_at: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        let mut t = Task::pending("t", subject, TaskType::Practice, difficulty, 60, now, 50, now);
        if completed_at.is_some() {
            t.status = TaskStatus::Completed;
            t.completed_at = completed_at;
        }
        t
    }

    #[test]
    fn test_default_filter_matches_everything() {
        assert!(TaskFilter::all().matches(&task("Math", 2, None)));
    }

    #[test]
    fn test_status_subject_and_difficulty() {
        let now = Utc::now();
        let filter = TaskFilter::completed().with_subject("Math").with_min_difficulty(4);

        assert!(filter.matches(&task("Math", 4, Some(now))));
        assert!(!filter.matches(&task("Math", 3, Some(now))));
        assert!(!filter.matches(&task("Physics", 5, Some(now))));
        assert!(!filter.matches(&task("Math", 5, None)));
    }

    #[test]
    fn test_completion_window_bounds() {
        let now = Utc::now();
        let filter = TaskFilter::completed()
            .completed_since(now - Duration::days(14))
            .completed_before(now - Duration::days(7));

        assert!(filter.matches(&task("Math", 3, Some(now - Duration::days(10)))));
        assert!(filter.matches(&task("Math", 3, Some(now - Duration::days(14)))));
        assert!(!filter.matches(&task("Math", 3, Some(now - Duration::days(7)))));
        assert!(!filter.matches(&task("Math", 3, Some(now - Duration::days(20)))));
    }

    #[test]
    fn test_priority_sort_is_descending() {
        let mut tasks = vec![task("a", 1, None), task("b", 1, None), task("c", 1, None)];
        tasks[0].priority_score = 10;
        tasks[1].priority_score = 90;
        tasks[2].priority_score = 40;
        TaskSort::PriorityDesc.apply(&mut tasks);
        let order: Vec<_> = tasks.iter().map(|t| t.priority_score).collect();
        assert_eq!(order, vec![90, 40, 10]);
    }
}
