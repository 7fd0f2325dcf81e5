//! Trend analyzer and fatigue forecast.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::load::{mental_load, MentalLoadReport, RiskLevel, NEUTRAL_EFFICIENCY};
use super::{dominant_window, mean_efficiency};
use crate::config::{EngineConfig, TrendConfig};
use crate::types::Task;

/// Direction of the week-over-week efficiency change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TrendStatus {
    Improving,
    Declining,
}

/// Week-over-week efficiency comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyTrend {
    /// Mean efficiency in the current window, 0 when empty.
    pub current_efficiency: f64,
    /// Mean efficiency in the previous window, 0 when empty.
    pub previous_efficiency: f64,
    /// Percent change; 0 when there is no previous baseline.
    pub slope: f64,
    pub status: TrendStatus,
    /// Share of current-window completions in that window's dominant focus window.
    pub consistency_score: Option<u32>,
}

/// Compare the trailing window with the one before it.
///
/// Tasks outside both windows, or without a completion time, are ignored.
pub fn efficiency_trend(completed: &[Task], now: DateTime<Utc>, config: &TrendConfig) -> EfficiencyTrend {
    let window = Duration::days(config.window_days);
    let current_start = now - window;
    let previous_start = current_start - window;

    let (mut current, mut previous) = (Vec::new(), Vec::new());
    for task in completed {
        match task.completed_at {
            Some(at) if at >= current_start => current.push(task),
            Some(at) if at >= previous_start => previous.push(task),
            _ => {}
        }
    }

    let current_efficiency = mean_efficiency(current.iter().copied()).unwrap_or(0.0);
    let previous_efficiency = mean_efficiency(previous.iter().copied()).unwrap_or(0.0);
    let slope = if previous_efficiency == 0.0 {
        0.0
    } else {
        (current_efficiency - previous_efficiency) / previous_efficiency * 100.0
    };

    EfficiencyTrend {
        current_efficiency,
        previous_efficiency,
        slope,
        status: if slope >= 0.0 {
            TrendStatus::Improving
        } else {
            TrendStatus::Declining
        },
        consistency_score: consistency_score(&current),
    }
}

/// Percentage of tasks completed in their dominant focus window.
pub fn consistency_score(tasks: &[&Task]) -> Option<u32> {
    let window = dominant_window(tasks.iter().copied())?;
    let hits = tasks.iter().filter(|t| t.focus_window == Some(window)).count();
    Some((hits as f64 / tasks.len() as f64 * 100.0).round() as u32)
}

/// Linear days-to-critical projection from an ordered efficiency history.
///
/// `None` unless the total drop (first minus last) exceeds the decline threshold.
pub fn days_to_critical(history: &[f64], config: &TrendConfig) -> Option<i64> {
    let (first, last) = (history.first()?, history.last()?);
    let total_drop = first - last;
    if total_drop > config.decline_threshold {
        let projected = (config.critical_horizon_days / total_drop).round() as i64;
        Some(projected.max(config.min_days_to_critical))
    } else {
        None
    }
}

/// 48-hour fatigue forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueForecast {
    pub risk_level: RiskLevel,
    pub upcoming_load_score: u32,
    pub recommendation: String,
    pub tasks_in_window: usize,
}

/// Forecast fatigue from pending tasks due within the window, overdue ones included.
pub fn fatigue_forecast(
    pending: &[Task],
    slope: f64,
    now: DateTime<Utc>,
    config: &TrendConfig,
) -> FatigueForecast {
    let horizon = now + Duration::hours(config.fatigue_window_hours);
    let upcoming: Vec<&Task> = pending.iter().filter(|t| t.deadline <= horizon).collect();
    let upcoming_load: u32 = upcoming.iter().map(|t| t.difficulty as u32).sum();

    let high = upcoming_load > config.fatigue_high_load
        || (upcoming_load > config.fatigue_declining_load && slope < 0.0);

    FatigueForecast {
        risk_level: RiskLevel::from_flag(high),
        upcoming_load_score: upcoming_load,
        recommendation: if high {
            "CRITICAL: High fatigue risk in 48h. Reschedule one Difficulty 4+ task.".to_string()
        } else {
            "Workload balanced.".to_string()
        },
        tasks_in_window: upcoming.len(),
    }
}

/// Trend analysis response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    /// Percent change, one decimal place.
    pub efficiency_slope: f64,
    pub trend_status: TrendStatus,
    /// Absent while the current window has no completions.
    pub consistency_score: Option<u32>,
    pub mental_load: MentalLoadReport,
    pub fatigue_forecast: FatigueForecast,
}

impl TrendReport {
    /// Compose the report from the trailing completions and every pending task.
    pub fn compose(
        completed: &[Task],
        pending: &[Task],
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Self {
        let trend = efficiency_trend(completed, now, &config.trend);
        let load_efficiency = if trend.current_efficiency > 0.0 {
            trend.current_efficiency
        } else {
            NEUTRAL_EFFICIENCY
        };
        let load = mental_load(pending, load_efficiency, &config.load);
        let fatigue = fatigue_forecast(pending, trend.slope, now, &config.trend);

        tracing::debug!(
            slope = trend.slope,
            load_index = load.index,
            upcoming_load = fatigue.upcoming_load_score,
            "Computed trend signals"
        );

        Self {
            efficiency_slope: (trend.slope * 10.0).round() / 10.0,
            trend_status: trend.status,
            consistency_score: trend.consistency_score,
            mental_load: MentalLoadReport::new(&load, &config.load),
            fatigue_forecast: fatigue,
        }
    }
}
