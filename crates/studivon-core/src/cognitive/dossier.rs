//! Dossier aggregator: one composite view of identity, load and plan.

use serde::{Deserialize, Serialize};

use super::load::{burnout_risk, mental_load, LoadStatus, RiskLevel, NEUTRAL_EFFICIENCY};
use super::{dominant_window, mean_efficiency};
use crate::config::EngineConfig;
use crate::types::{FocusWindow, Task};

const FALLBACK_SUBJECT: &str = "General Study";

/// The three reads the dossier is built from.
#[derive(Debug, Clone, Default)]
pub struct DossierInputs {
    /// Latest completions, most recent first.
    pub recent: Vec<Task>,
    /// Pending tasks, highest priority first.
    pub pending: Vec<Task>,
    /// High-intensity completions in the acute window.
    pub acute_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub discipline_level: String,
    pub efficiency_level: String,
    pub context: String,
    /// Dominant focus window.
    pub persona: FocusWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveState {
    pub mental_load_index: u32,
    /// `round(avg_efficiency * 100)`; may exceed 100.
    pub academic_readiness: u32,
    pub mental_readiness: u32,
    pub status: LoadStatus,
    pub burnout_risk: RiskLevel,
    pub reason_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicSummary {
    pub pending_tasks_count: usize,
    pub active_subjects_count: usize,
    pub weakest_subject: String,
    pub acute_intensity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextDayPlan {
    pub window: FocusWindow,
    pub schedule: String,
    pub rest_recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStrategy {
    pub objective: String,
    pub pacing: String,
    pub focus_subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub next_24_hours: NextDayPlan,
    pub weekly_strategy: WeeklyStrategy,
}

/// Consolidated learner report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dossier {
    pub identity: Identity,
    pub cognitive_state: CognitiveState,
    pub academic_summary: AcademicSummary,
    pub action_plan: ActionPlan,
}

/// Lowest mean efficiency among recent tasks; ties keep first appearance.
fn weakest_subject(recent: &[Task]) -> Option<String> {
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();
    for task in recent {
        match groups.iter_mut().find(|(s, _, _)| *s == task.subject) {
            Some((_, total, n)) => {
                *total += task.efficiency_or_zero();
                *n += 1;
            }
            None => groups.push((task.subject.as_str(), task.efficiency_or_zero(), 1)),
        }
    }
    groups
        .into_iter()
        .map(|(s, total, n)| (s, total / n as f64))
        .reduce(|weakest, next| if next.1 < weakest.1 { next } else { weakest })
        .map(|(s, _)| s.to_string())
}

/// Compose the dossier. Pure; never partially computed.
pub fn compose_dossier(inputs: &DossierInputs, config: &EngineConfig) -> Dossier {
    let DossierInputs {
        recent,
        pending,
        acute_count,
    } = inputs;
    let acute_count = *acute_count;

    let weakest = weakest_subject(recent)
        .or_else(|| pending.first().map(|t| t.subject.clone()))
        .unwrap_or_else(|| FALLBACK_SUBJECT.to_string());

    let peak_window = dominant_window(recent).unwrap_or(FocusWindow::MidDaySteady);
    let discipline = if recent.is_empty() {
        0.0
    } else {
        recent.iter().filter(|t| t.focus_window == Some(peak_window)).count() as f64
            / recent.len() as f64
    };
    let disciplined = discipline > config.insight.discipline_threshold;

    let avg_efficiency = mean_efficiency(recent).unwrap_or(NEUTRAL_EFFICIENCY);
    let academic_readiness = (avg_efficiency * 100.0).round().max(0.0) as u32;
    let load = mental_load(pending, avg_efficiency, &config.load);
    let mental_readiness = 100 - load.index;
    let burned_out = burnout_risk(&load, acute_count, &config.load);

    tracing::debug!(
        load_index = load.index,
        acute_count,
        discipline,
        burned_out,
        "Computed dossier signals"
    );

    let context = match (burned_out, disciplined) {
        (true, true) => "Your habit consistency is excellent, but your recent intense activity exceeds your recovery limits.",
        (true, false) => "Your system needs some downtime to recover and re-establish a steady study rhythm.",
        (false, true) => "You have a highly disciplined routine. You're in a great position for a mastery sprint.",
        (false, false) => "You're getting the work done, but we can improve your routine by narrowing your focus windows.",
    };

    let reason_summary = if burned_out {
        format!(
            "Time for a strategic pause. You've completed {} high-intensity tasks in 48 hours. Even with {}% mastery, your mental capacity is low ({}%).",
            acute_count, academic_readiness, mental_readiness
        )
    } else {
        format!(
            "Prime conditions detected. Your mental energy is at {}% and your routine is stable.",
            mental_readiness
        )
    };

    let pacing = if burned_out {
        "Recovery Pace (Low-Intensity)"
    } else if avg_efficiency < config.insight.steady_efficiency {
        "Deliberate & Slow"
    } else {
        "High-Velocity"
    };

    let schedule = if burned_out {
        format!("Rest focus: Tomorrow is for light {} revision only.", weakest)
    } else {
        format!(
            "Peak Focus at {}: 30m targeted review of {}, then primary work sessions.",
            peak_window, weakest
        )
    };

    Dossier {
        identity: Identity {
            discipline_level: if disciplined { "High (Consistent)" } else { "Developing (Varied)" }
                .to_string(),
            efficiency_level: if avg_efficiency > config.insight.steady_efficiency {
                "High (Fast Learner)"
            } else {
                "Normal (Deep Diver)"
            }
            .to_string(),
            context: context.to_string(),
            persona: peak_window,
        },
        cognitive_state: CognitiveState {
            mental_load_index: load.index,
            academic_readiness,
            mental_readiness,
            status: if load.is_overloaded(&config.load) {
                LoadStatus::Overloaded
            } else {
                LoadStatus::Optimal
            },
            burnout_risk: RiskLevel::from_flag(burned_out),
            reason_summary,
        },
        academic_summary: AcademicSummary {
            pending_tasks_count: pending.len(),
            active_subjects_count: load.unique_subjects,
            weakest_subject: weakest.clone(),
            acute_intensity: acute_count,
        },
        action_plan: ActionPlan {
            next_24_hours: NextDayPlan {
                window: peak_window,
                schedule,
                rest_recommendation: if load.needs_rest(&config.load) {
                    "Mandatory: 2-hour digital detox tonight."
                } else {
                    "Standard: 15min recovery breaks."
                }
                .to_string(),
            },
            weekly_strategy: WeeklyStrategy {
                objective: if burned_out {
                    "Recovery & Stabilization"
                } else {
                    "Aggressive Mastery Sprint"
                }
                .to_string(),
                pacing: pacing.to_string(),
                focus_subject: weakest,
            },
        },
    }
}
