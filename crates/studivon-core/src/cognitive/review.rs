//! Spaced-repetition scheduler.
//!
//! A completed Practice or Revision task spawns one Revision task. Its
//! stability (the review interval in days) grows by a quality multiplier
//! that never drops below 1, so intervals never shrink.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReviewConfig;
use crate::types::{Task, TaskType, MIN_DIFFICULTY};

/// Stability assumed for a task that has never been reviewed.
const INITIAL_STABILITY: u32 = 1;

/// Where and when the next review lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPlan {
    /// Interval in days; also the review task's stability level.
    pub interval_days: u32,
    pub next_review_date: DateTime<Utc>,
}

/// `max(1, round(current * multiplier))`, multiplier chosen by efficiency.
pub fn next_stability(current: Option<u32>, efficiency_ratio: f64, config: &ReviewConfig) -> u32 {
    let current = current.unwrap_or(INITIAL_STABILITY).max(INITIAL_STABILITY) as f64;
    let multiplier = if efficiency_ratio >= 1.0 {
        config.efficient_multiplier
    } else {
        config.inefficient_multiplier
    };
    ((current * multiplier).round() as u32).max(INITIAL_STABILITY)
}

/// Plan the follow-up review for a completion, if the task type takes part.
pub fn plan_review(
    task: &Task,
    efficiency_ratio: f64,
    now: DateTime<Utc>,
    config: &ReviewConfig,
) -> Option<ReviewPlan> {
    if !task.task_type.is_reviewable() {
        return None;
    }
    let interval_days = next_stability(task.stability_level, efficiency_ratio, config);
    Some(ReviewPlan {
        interval_days,
        next_review_date: now + Duration::days(interval_days as i64),
    })
}

impl ReviewPlan {
    /// The pending Revision task this plan spawns for `parent`.
    pub fn review_task(&self, parent: &Task, now: DateTime<Utc>, config: &ReviewConfig) -> Task {
        let estimated = ((parent.estimated_minutes as f64 * config.time_factor).round() as u32).max(1);
        Task::pending(
            format!("Review: {}", parent.title),
            parent.subject.clone(),
            TaskType::Revision,
            parent.difficulty.saturating_sub(1).max(MIN_DIFFICULTY),
            estimated,
            self.next_review_date,
            config.review_priority,
            now,
        )
        .with_stability(self.interval_days)
        .with_parent(parent.id.clone())
    }
}
