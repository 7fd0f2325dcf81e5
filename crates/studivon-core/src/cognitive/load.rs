//! Burnout and mental-load model.
//!
//! `index = round((sum(difficulty) * wd + subjects * ws) * (base - eff / div))`,
//! clamped to `[0, 100]`, and exactly 0 when there is no pending difficulty.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::Display;

use crate::config::LoadConfig;
use crate::types::Task;

/// Fallback efficiency when there is no completed history to average.
pub const NEUTRAL_EFFICIENCY: f64 = 1.0;

/// Two-level risk flag used across reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn from_flag(high: bool) -> Self {
        if high {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }
}

/// Load classification. The trend and dossier reports label overload differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum LoadStatus {
    Optimal,
    Heavy,
    Overloaded,
}

/// Load over a population of pending tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentalLoad {
    /// Always within `[0, 100]`.
    pub index: u32,
    pub total_difficulty: u32,
    pub unique_subjects: usize,
}

impl MentalLoad {
    /// Strictly above the overload threshold.
    pub fn is_overloaded(&self, config: &LoadConfig) -> bool {
        self.index > config.overload_threshold
    }

    /// Above the rest threshold; calls for a mandatory recovery block.
    pub fn needs_rest(&self, config: &LoadConfig) -> bool {
        self.index > config.rest_threshold
    }

    pub fn context_switching_risk(&self, config: &LoadConfig) -> RiskLevel {
        RiskLevel::from_flag(self.unique_subjects > config.context_switch_threshold)
    }
}

/// Mental-load section of the trend report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalLoadReport {
    pub index: u32,
    pub status: LoadStatus,
    pub context_switching_risk: RiskLevel,
}

impl MentalLoadReport {
    pub fn new(load: &MentalLoad, config: &LoadConfig) -> Self {
        Self {
            index: load.index,
            status: if load.is_overloaded(config) {
                LoadStatus::Heavy
            } else {
                LoadStatus::Optimal
            },
            context_switching_risk: load.context_switching_risk(config),
        }
    }
}

fn discounted(raw: f64, avg_efficiency: f64, config: &LoadConfig) -> u32 {
    let factor = config.base - avg_efficiency / config.efficiency_divisor;
    (raw * factor).round().clamp(0.0, 100.0) as u32
}

/// Compute the load index over `pending`, discounted by `avg_efficiency`.
pub fn mental_load<'a>(
    pending: impl IntoIterator<Item = &'a Task>,
    avg_efficiency: f64,
    config: &LoadConfig,
) -> MentalLoad {
    let mut total_difficulty = 0u32;
    let mut subjects = HashSet::new();
    for task in pending {
        total_difficulty += task.difficulty as u32;
        subjects.insert(task.subject.as_str());
    }
    let unique_subjects = subjects.len();

    let index = if total_difficulty == 0 {
        0
    } else {
        let raw = total_difficulty as f64 * config.difficulty_weight
            + unique_subjects as f64 * config.subject_weight;
        discounted(raw, avg_efficiency, config)
    };

    MentalLoad {
        index,
        total_difficulty,
        unique_subjects,
    }
}

/// Acute burnout flag: overloaded, or too many heavy completions recently.
pub fn burnout_risk(load: &MentalLoad, acute_count: usize, config: &LoadConfig) -> bool {
    load.is_overloaded(config) || acute_count >= config.acute_task_threshold
}

/// Weekly load over completed work: `round(count * wd * (base - eff / div))`, clamped.
pub fn weekly_load(completed_count: usize, avg_efficiency: f64, config: &LoadConfig) -> u32 {
    discounted(
        completed_count as f64 * config.difficulty_weight,
        avg_efficiency,
        config,
    )
}
