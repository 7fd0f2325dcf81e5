//! Study task types.
//!
//! A [`Task`] is created pending, then moves to completed or missed. Completion
//! facts are only present once the task is completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Difficulty assumed for records that carry none.
pub const DEFAULT_DIFFICULTY: u8 = 3;
/// Lowest accepted difficulty.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest accepted difficulty.
pub const MAX_DIFFICULTY: u8 = 5;

fn default_difficulty() -> u8 {
    DEFAULT_DIFFICULTY
}

/// Clamp a raw difficulty into `[1, 5]`.
pub fn clamp_difficulty(raw: i64) -> u8 {
    raw.clamp(MIN_DIFFICULTY as i64, MAX_DIFFICULTY as i64) as u8
}

/// Kind of study session a task represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum TaskType {
    /// First exposure to the material. Never spawns a review.
    #[serde(rename = "First-time")]
    #[strum(serialize = "First-time")]
    FirstTime,
    /// Applied practice.
    #[default]
    Practice,
    /// Revision of previously studied material.
    Revision,
}

impl TaskType {
    /// Whether completing a task of this type feeds the spaced-repetition scheduler.
    pub fn is_reviewable(self) -> bool {
        matches!(self, TaskType::Practice | TaskType::Revision)
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Missed,
}

/// Time-of-day band a task was completed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum FocusWindow {
    /// 21:00 - 04:59.
    #[serde(rename = "Night Owl")]
    #[strum(serialize = "Night Owl")]
    NightOwl,
    /// 05:00 - 11:59.
    #[serde(rename = "Early Bird")]
    #[strum(serialize = "Early Bird")]
    EarlyBird,
    /// 12:00 - 20:59.
    #[serde(rename = "Mid-Day Steady")]
    #[strum(serialize = "Mid-Day Steady")]
    MidDaySteady,
}

impl FocusWindow {
    /// Classify an hour of day (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            21..=23 | 0..=4 => FocusWindow::NightOwl,
            5..=11 => FocusWindow::EarlyBird,
            _ => FocusWindow::MidDaySteady,
        }
    }
}

/// A study task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque identifier assigned by the repository.
    pub id: String,
    pub title: String,
    /// Groups tasks for analytics.
    pub subject: String,
    pub task_type: TaskType,
    /// Always within `[1, 5]`.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    pub estimated_minutes: u32,
    pub deadline: DateTime<Utc>,
    pub priority_score: u32,
    pub status: TaskStatus,
    #[serde(default)]
    pub needs_reschedule: bool,
    /// Review interval in days, set once the task takes part in spaced repetition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_level: Option<u32>,
    /// Task whose completion generated this review. Back-reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
    pub created_at: DateTime<Utc>,

    // Completion facts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_window: Option<FocusWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_score: Option<f64>,
}

impl Task {
    /// Build a pending task. The id is left empty until the repository assigns one.
    #[allow(clippy::too_many_arguments)]
    pub fn pending(
        title: impl Into<String>,
        subject: impl Into<String>,
        task_type: TaskType,
        difficulty: u8,
        estimated_minutes: u32,
        deadline: DateTime<Utc>,
        priority_score: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            subject: subject.into(),
            task_type,
            difficulty,
            estimated_minutes,
            deadline,
            priority_score,
            status: TaskStatus::Pending,
            needs_reschedule: false,
            stability_level: None,
            parent_task_id: None,
            created_at,
            actual_minutes: None,
            completed_at: None,
            completion_hour: None,
            focus_window: None,
            efficiency_score: None,
        }
    }

    /// Set the stability level.
    pub fn with_stability(mut self, stability: u32) -> Self {
        self.stability_level = Some(stability);
        self
    }

    /// Set the parent task reference.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_id.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Efficiency score, treating a missing value as zero.
    pub fn efficiency_or_zero(&self) -> f64 {
        self.efficiency_score.unwrap_or(0.0)
    }
}

/// Input for creating a task. Raw values are validated and clamped by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub subject: String,
    pub difficulty: i64,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub estimated_minutes: Option<i64>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        difficulty: i64,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            difficulty,
            deadline,
            estimated_minutes: None,
            task_type: None,
        }
    }

    pub fn with_estimate(mut self, minutes: i64) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }
}

/// Partial update of a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_reschedule: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_hour: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_window: Option<FocusWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_score: Option<f64>,
}

impl TaskPatch {
    /// Apply the patch to a task in place.
    pub fn apply(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority_score {
            task.priority_score = priority;
        }
        if let Some(flag) = self.needs_reschedule {
            task.needs_reschedule = flag;
        }
        if let Some(minutes) = self.actual_minutes {
            task.actual_minutes = Some(minutes);
        }
        if let Some(at) = self.completed_at {
            task.completed_at = Some(at);
        }
        if let Some(hour) = self.completion_hour {
            task.completion_hour = Some(hour);
        }
        if let Some(window) = self.focus_window {
            task.focus_window = Some(window);
        }
        if let Some(score) = self.efficiency_score {
            task.efficiency_score = Some(score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_focus_window_partitions_the_day() {
        assert_eq!(FocusWindow::from_hour(23), FocusWindow::NightOwl);
        assert_eq!(FocusWindow::from_hour(0), FocusWindow::NightOwl);
        assert_eq!(FocusWindow::from_hour(4), FocusWindow::NightOwl);
        assert_eq!(FocusWindow::from_hour(5), FocusWindow::EarlyBird);
        assert_eq!(FocusWindow::from_hour(9), FocusWindow::EarlyBird);
        assert_eq!(FocusWindow::from_hour(11), FocusWindow::EarlyBird);
        assert_eq!(FocusWindow::from_hour(12), FocusWindow::MidDaySteady);
        assert_eq!(FocusWindow::from_hour(14), FocusWindow::MidDaySteady);
        assert_eq!(FocusWindow::from_hour(20), FocusWindow::MidDaySteady);
        assert_eq!(FocusWindow::from_hour(21), FocusWindow::NightOwl);
    }

    #[test]
    fn test_clamp_difficulty() {
        assert_eq!(clamp_difficulty(-4), 1);
        assert_eq!(clamp_difficulty(0), 1);
        assert_eq!(clamp_difficulty(3), 3);
        assert_eq!(clamp_difficulty(9), 5);
    }

    #[test]
    fn test_enum_labels() {
        assert_eq!(TaskType::FirstTime.to_string(), "First-time");
        assert_eq!(TaskType::from_str("Revision").unwrap(), TaskType::Revision);
        assert_eq!(TaskStatus::Missed.to_string(), "missed");
        assert_eq!(FocusWindow::MidDaySteady.to_string(), "Mid-Day Steady");
        assert_eq!(
            serde_json::to_value(FocusWindow::NightOwl).unwrap(),
            serde_json::json!("Night Owl")
        );
    }

    #[test]
    fn test_only_practice_and_revision_are_reviewable() {
        assert!(!TaskType::FirstTime.is_reviewable());
        assert!(TaskType::Practice.is_reviewable());
        assert!(TaskType::Revision.is_reviewable());
    }

    #[test]
    fn test_missing_difficulty_reads_back_as_default() {
        let json = serde_json::json!({
            "id": "t1",
            "title": "Limits",
            "subject": "Calculus",
            "taskType": "Practice",
            "estimatedMinutes": 60,
            "deadline": "2025-03-01T00:00:00Z",
            "priorityScore": 75,
            "status": "pending",
            "createdAt": "2025-02-01T00:00:00Z"
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.difficulty, DEFAULT_DIFFICULTY);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let now = Utc::now();
        let mut task = Task::pending("Limits", "Calculus", TaskType::Practice, 3, 60, now, 80, now);
        TaskPatch {
            status: Some(TaskStatus::Missed),
            priority_score: Some(104),
            needs_reschedule: Some(true),
            ..Default::default()
        }
        .apply(&mut task);

        assert_eq!(task.status, TaskStatus::Missed);
        assert_eq!(task.priority_score, 104);
        assert!(task.needs_reschedule);
        assert_eq!(task.title, "Limits");
        assert!(task.efficiency_score.is_none());
    }
}
