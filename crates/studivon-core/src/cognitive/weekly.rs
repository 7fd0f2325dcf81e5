//! Weekly intelligence report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dominant_window;
use super::load::{weekly_load, RiskLevel};
use super::retention::{retention_heatmap, RetentionSnapshot};
use crate::config::EngineConfig;
use crate::types::{FocusWindow, Task};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRange {
    pub strongest: String,
    pub weakest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Productivity {
    pub focus_window: FocusWindow,
    pub burnout_risk: RiskLevel,
    pub mental_load_index: u32,
    pub tasks_completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub timeframe: String,
    pub mastery: MasteryRange,
    /// Most at-risk subject first.
    pub retention_heatmap: Vec<RetentionSnapshot>,
    pub productivity: Productivity,
    /// Ordered safety, then memory, then strategy.
    pub suggestions: Vec<String>,
}

/// Weekly report, or an explicit marker when the week has no completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeeklyReport {
    NotEnoughData { message: String },
    Ready(WeeklySummary),
}

/// Subjects by mean efficiency, strongest first; ties keep first appearance.
fn rank_subjects(tasks: &[Task]) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|(s, _, _)| *s == task.subject) {
            Some((_, total, n)) => {
                *total += task.efficiency_or_zero();
                *n += 1;
            }
            None => groups.push((task.subject.clone(), task.efficiency_or_zero(), 1)),
        }
    }
    let mut ranked: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(s, total, n)| (s, total / n as f64))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Compose the report from the trailing week's completions.
pub fn compose_weekly_report(recent: &[Task], now: DateTime<Utc>, config: &EngineConfig) -> WeeklyReport {
    let ranked = rank_subjects(recent);
    let (Some(strongest), Some(weakest)) = (ranked.first(), ranked.last()) else {
        return WeeklyReport::NotEnoughData {
            message: "Not enough data for a weekly report yet.".to_string(),
        };
    };

    let heatmap = retention_heatmap(recent, now, &config.retention);
    let heavy = recent
        .iter()
        .filter(|t| t.difficulty >= config.load.high_intensity_difficulty)
        .count();
    let top_window = dominant_window(recent).unwrap_or(FocusWindow::MidDaySteady);

    let avg_efficiency = ranked.iter().map(|(_, avg)| avg).sum::<f64>() / ranked.len() as f64;
    let load = weekly_load(recent.len(), avg_efficiency, &config.load);
    let overworked = heavy > config.insight.weekly_heavy_task_threshold;

    let mut suggestions = Vec::with_capacity(3);
    suggestions.push(if overworked {
        format!(
            "High Burnout detected ({} heavy tasks). Prioritize sleep over extra study tomorrow.",
            heavy
        )
    } else {
        format!(
            "Double down on {} during your peak {} window.",
            strongest.0, top_window
        )
    });
    suggestions.push(match heatmap.first() {
        Some(worst) if worst.retention_percentage < config.retention.critical_below => format!(
            "Memory Alert: Your {} retention is critical ({}%). Review now.",
            worst.subject, worst.retention_percentage
        ),
        _ => "Long-term memory retention is currently stable.".to_string(),
    });
    suggestions.push(if load > config.insight.weekly_load_threshold {
        "Heavy context switching detected. Try 'Subject Batching' (2 hours per subject) to save energy."
            .to_string()
    } else {
        "Cognitive load is well-managed.".to_string()
    });

    WeeklyReport::Ready(WeeklySummary {
        timeframe: format!("Last {} Days", config.trend.window_days),
        mastery: MasteryRange {
            strongest: strongest.0.clone(),
            weakest: weakest.0.clone(),
        },
        retention_heatmap: heatmap,
        productivity: Productivity {
            focus_window: top_window,
            burnout_risk: RiskLevel::from_flag(overworked),
            mental_load_index: load,
            tasks_completed: recent.len(),
        },
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognitive::testing::{completed, now};

    #[test]
    fn test_empty_week_is_not_enough_data() {
        let report = compose_weekly_report(&[], now(), &EngineConfig::default());
        assert!(matches!(report, WeeklyReport::NotEnoughData { .. }));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["message"], "Not enough data for a weekly report yet.");
    }

    #[test]
    fn test_ready_report() {
        let mut math = completed("Math", 0.6, 3.0);
        math.stability_level = Some(2);
        let tasks = vec![math, completed("Art", 1.2, 0.1), completed("Art", 1.0, 0.2)];

        let WeeklyReport::Ready(summary) = compose_weekly_report(&tasks, now(), &EngineConfig::default()) else {
            panic!("expected a ready report");
        };
        assert_eq!(summary.mastery.strongest, "Art");
        assert_eq!(summary.mastery.weakest, "Math");
        assert_eq!(summary.retention_heatmap[0].subject, "Math");
        assert_eq!(summary.productivity.tasks_completed, 3);
        assert_eq!(summary.productivity.burnout_risk, RiskLevel::Low);
        assert_eq!(summary.productivity.focus_window, FocusWindow::MidDaySteady);
        // 3 * 2 * (1.1 - 0.85 / 2) = 4.05
        assert_eq!(summary.productivity.mental_load_index, 4);
        assert_eq!(
            summary.suggestions,
            vec![
                "Double down on Art during your peak Mid-Day Steady window.".to_string(),
                "Memory Alert: Your Math retention is critical (22%). Review now.".to_string(),
                "Cognitive load is well-managed.".to_string(),
            ]
        );
    }

    #[test]
    fn test_heavy_week_puts_safety_first() {
        let tasks: Vec<Task> = (0..6)
            .map(|i| {
                let mut t = completed("Math", 1.0, i as f64 * 0.01);
                t.difficulty = 5;
                t
            })
            .collect();
        let WeeklyReport::Ready(summary) = compose_weekly_report(&tasks, now(), &EngineConfig::default()) else {
            panic!("expected a ready report");
        };
        assert_eq!(summary.productivity.burnout_risk, RiskLevel::High);
        assert!(summary.suggestions[0].starts_with("High Burnout detected (6 heavy tasks)"));
        assert_eq!(summary.suggestions[1], "Long-term memory retention is currently stable.");
    }
}
