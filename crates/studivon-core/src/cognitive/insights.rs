//! Subject mastery, predictive insight and learner strategy profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::mean_efficiency;
use super::trend::days_to_critical;
use crate::config::{InsightConfig, TrendConfig};
use crate::types::{FocusWindow, SubjectAggregate, Task, TaskType};

/// Per-subject mastery record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMastery {
    pub subject: String,
    pub average_efficiency: f64,
    pub total_tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
}

/// Mastery per subject, weakest first.
pub fn mastery_report(aggregates: Vec<SubjectAggregate>) -> Vec<SubjectMastery> {
    let mut report: Vec<SubjectMastery> = aggregates
        .into_iter()
        .map(|a| SubjectMastery {
            subject: a.subject,
            average_efficiency: a.avg_efficiency,
            total_tasks: a.count,
            last_studied: a.last_date,
        })
        .collect();
    report.sort_by(|a, b| a.average_efficiency.total_cmp(&b.average_efficiency));
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum PredictionStatus {
    InsufficientData,
    Stable,
    HighRisk,
    Excellence,
}

/// Forecast for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveInsight {
    pub status: PredictionStatus,
    /// Human-readable headline.
    pub prediction: String,
    pub forecast: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_critical: Option<i64>,
    /// Efficiency history, oldest first. Empty while data is insufficient.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trend_data: Vec<f64>,
}

/// Forecast a subject from its completions sorted oldest first.
pub fn predict_subject(
    subject: &str,
    history: &[Task],
    insight: &InsightConfig,
    trend: &TrendConfig,
) -> PredictiveInsight {
    if history.len() < insight.prediction_min_history {
        let missing = insight.prediction_min_history - history.len();
        let sessions = if missing == 1 { "session" } else { "sessions" };
        return PredictiveInsight {
            status: PredictionStatus::InsufficientData,
            prediction: "Initializing...".to_string(),
            forecast: format!(
                "Insufficient data. Complete {} more {} to unlock AI forecasting.",
                missing, sessions
            ),
            recommendation: "Maintain your current pace to establish a baseline.".to_string(),
            days_to_critical: None,
            trend_data: Vec::new(),
        };
    }

    let trend_data: Vec<f64> = history.iter().map(Task::efficiency_or_zero).collect();
    let last = trend_data.last().copied().unwrap_or_default();

    if let Some(days) = days_to_critical(&trend_data, trend) {
        PredictiveInsight {
            status: PredictionStatus::HighRisk,
            prediction: "High Risk: Performance drop detected.".to_string(),
            forecast: format!(
                "Predicted academic failure in {} days if pace doesn't improve.",
                days
            ),
            recommendation: format!(
                "URGENT: Increase {} study frequency by 30% and review fundamentals.",
                subject
            ),
            days_to_critical: Some(days),
            trend_data,
        }
    } else if last > trend.excellence_threshold {
        PredictiveInsight {
            status: PredictionStatus::Excellence,
            prediction: "Excellence Detected".to_string(),
            forecast: "Mastery achieved. You are ahead of schedule.".to_string(),
            recommendation: "Consider spending more time on your weaker subjects.".to_string(),
            days_to_critical: None,
            trend_data,
        }
    } else {
        PredictiveInsight {
            status: PredictionStatus::Stable,
            prediction: "Stable".to_string(),
            forecast: "On track for success.".to_string(),
            recommendation: "Keep up the consistent work!".to_string(),
            days_to_critical: None,
            trend_data,
        }
    }
}

/// Time-of-day persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Persona {
    #[serde(rename = "Night Owl Specialist")]
    #[strum(serialize = "Night Owl Specialist")]
    NightOwlSpecialist,
    #[serde(rename = "Early Bird Achiever")]
    #[strum(serialize = "Early Bird Achiever")]
    EarlyBirdAchiever,
}

/// Theory versus application strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CognitiveStyle {
    #[serde(rename = "Concept-Heavy (Stronger at Theory than Application)")]
    #[strum(serialize = "Concept-Heavy (Stronger at Theory than Application)")]
    ConceptHeavy,
    #[serde(rename = "Kinetic Learner (Stronger at Practice than Theory)")]
    #[strum(serialize = "Kinetic Learner (Stronger at Practice than Theory)")]
    Kinetic,
    #[serde(rename = "Balanced Learner")]
    #[strum(serialize = "Balanced Learner")]
    Balanced,
}

/// Learner strategy profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyProfile {
    /// Not enough completions yet.
    Learning { persona: String, strategy: String },
    Ready {
        #[serde(rename = "userDNA")]
        user_dna: Persona,
        #[serde(rename = "cognitiveStyle")]
        cognitive_style: CognitiveStyle,
        optimization: String,
        recommendation: String,
    },
}

fn mean_where(tasks: &[Task], keep: impl Fn(&Task) -> bool) -> f64 {
    mean_efficiency(tasks.iter().filter(|t| keep(t))).unwrap_or(0.0)
}

/// Build the strategy profile from every completed task.
pub fn strategy_profile(completed: &[Task], config: &InsightConfig) -> StrategyProfile {
    if completed.len() < config.strategy_min_history {
        return StrategyProfile::Learning {
            persona: "Learning...".to_string(),
            strategy: format!(
                "Complete at least {} tasks to unlock your personalized learning DNA.",
                config.strategy_min_history
            ),
        };
    }

    let night = mean_where(completed, |t| t.focus_window == Some(FocusWindow::NightOwl));
    let day = mean_where(completed, |t| t.focus_window == Some(FocusWindow::EarlyBird));
    let practice = mean_where(completed, |t| t.task_type == TaskType::Practice);
    let revision = mean_where(completed, |t| t.task_type == TaskType::Revision);

    let night_leads = night > day;
    let cognitive_style = if revision > practice * config.style_ratio {
        CognitiveStyle::ConceptHeavy
    } else if practice > revision * config.style_ratio {
        CognitiveStyle::Kinetic
    } else {
        CognitiveStyle::Balanced
    };

    StrategyProfile::Ready {
        user_dna: if night_leads {
            Persona::NightOwlSpecialist
        } else {
            Persona::EarlyBirdAchiever
        },
        cognitive_style,
        optimization: format!(
            "Your focus is {}% sharper in the {}.",
            ((night - day).abs() * 100.0).round() as i64,
            if night_leads { "Late Evening" } else { "Morning" }
        ),
        recommendation: if practice < config.practice_alert_threshold {
            "ALERT: Your practice efficiency is low. Convert 20% of study time into mock-testing to bridge the gap."
                .to_string()
        } else {
            "Your learning patterns are optimal. Maintain current distribution.".to_string()
        },
    }
}
