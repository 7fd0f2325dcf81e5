//! Priority engine.

use chrono::{DateTime, Utc};

use crate::config::PriorityConfig;
use crate::types::clamp_difficulty;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Whole days between `now` and `deadline`, rounded up, never below 1.
///
/// Distance is absolute, so an overdue deadline counts the same as one
/// equally far in the future.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (deadline - now).num_milliseconds().unsigned_abs() as f64;
    ((millis / MILLIS_PER_DAY).ceil() as i64).max(1)
}

/// Initial urgency score: `round(clamp(d, 1, 5) * w + n / days_until)`.
pub fn priority_score(
    difficulty: i64,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &PriorityConfig,
) -> u32 {
    let safe = clamp_difficulty(difficulty) as f64;
    let days = days_until(deadline, now) as f64;
    let score = safe * config.difficulty_weight + config.urgency_numerator / days;
    score.round().max(0.0) as u32
}

/// Priority after a missed session.
pub fn boosted_priority(old: u32, config: &PriorityConfig) -> u32 {
    (old as f64 * config.missed_boost).round().max(0.0) as u32
}
