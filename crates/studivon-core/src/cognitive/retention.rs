//! Retention forecaster.
//!
//! Exponential forgetting curve `R = e^(-t / S)` with the subject's most
//! recent stability as the decay constant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

use crate::config::RetentionConfig;
use crate::types::Task;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RetentionStatus {
    Critical,
    Fading,
    Stable,
}

/// Per-subject retention estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSnapshot {
    pub subject: String,
    pub retention_percentage: u32,
    pub status: RetentionStatus,
    pub days_since_review: i64,
}

/// Recall probability after `days` with the given stability (days).
pub fn retention_probability(days: f64, stability: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    (-days.max(0.0) / stability).exp()
}

fn classify(probability: f64, config: &RetentionConfig) -> RetentionStatus {
    if probability * 100.0 < config.critical_below as f64 {
        RetentionStatus::Critical
    } else if probability * 100.0 < config.fading_below as f64 {
        RetentionStatus::Fading
    } else {
        RetentionStatus::Stable
    }
}

/// Retention per subject, most at-risk first.
///
/// Each subject is scored from its latest completion. Tasks without a
/// completion time are skipped.
pub fn retention_heatmap(
    completed: &[Task],
    now: DateTime<Utc>,
    config: &RetentionConfig,
) -> Vec<RetentionSnapshot> {
    let mut latest: BTreeMap<&str, (DateTime<Utc>, u32)> = BTreeMap::new();
    for task in completed {
        let Some(at) = task.completed_at else { continue };
        let stability = task.stability_level.unwrap_or(1).max(1);
        latest
            .entry(task.subject.as_str())
            .and_modify(|entry| {
                if at > entry.0 {
                    *entry = (at, stability);
                }
            })
            .or_insert((at, stability));
    }

    let mut heatmap: Vec<RetentionSnapshot> = latest
        .into_iter()
        .map(|(subject, (last_seen, stability))| {
            let days = (now - last_seen).num_milliseconds() as f64 / MILLIS_PER_DAY;
            let probability = retention_probability(days, stability as f64);
            RetentionSnapshot {
                subject: subject.to_string(),
                retention_percentage: (probability * 100.0).round() as u32,
                status: classify(probability, config),
                days_since_review: days.round() as i64,
            }
        })
        .collect();

    heatmap.sort_by_key(|s| s.retention_percentage);
    heatmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognitive::testing::{completed, now};

    #[test]
    fn test_one_stability_period_is_critical() {
        let mut task = completed("History", 1.0, 7.0);
        task.stability_level = Some(7);
        let heatmap = retention_heatmap(&[task], now(), &RetentionConfig::default());

        assert!((retention_probability(7.0, 7.0) - 0.3679).abs() < 1e-4);
        assert_eq!(heatmap[0].retention_percentage, 37);
        assert_eq!(heatmap[0].status, RetentionStatus::Critical);
        assert_eq!(heatmap[0].days_since_review, 7);
    }

    #[test]
    fn test_latest_completion_wins_and_sorted_ascending() {
        let mut old = completed("Math", 1.0, 9.0);
        old.stability_level = Some(1);
        let mut recent = completed("Math", 1.0, 1.0);
        recent.stability_level = Some(10);
        let mut art = completed("Art", 1.0, 2.0);
        art.stability_level = Some(4);

        let heatmap = retention_heatmap(&[old, recent, art], now(), &RetentionConfig::default());
        let subjects: Vec<_> = heatmap.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Art", "Math"]);
        // e^-0.5 = 61%, e^-0.1 = 90%
        assert_eq!(heatmap[0].retention_percentage, 61);
        assert_eq!(heatmap[0].status, RetentionStatus::Fading);
        assert_eq!(heatmap[1].retention_percentage, 90);
        assert_eq!(heatmap[1].status, RetentionStatus::Stable);
    }

    #[test]
    fn test_missing_stability_defaults_to_one_day() {
        let task = completed("Bio", 1.0, 1.0);
        let heatmap = retention_heatmap(&[task], now(), &RetentionConfig::default());
        assert_eq!(heatmap[0].retention_percentage, 37);
    }
}
