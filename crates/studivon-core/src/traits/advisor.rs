//! Coaching-text collaborator trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::StudivonResult;

/// Which coaching prompt to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    /// Short goal-aligned daily nudge.
    #[default]
    Daily,
    /// Three-day recovery and re-alignment plan.
    StrategySession,
}

/// Learner profile signals, as reported by the strategy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategySignals {
    #[serde(rename = "userDNA", skip_serializing_if = "Option::is_none")]
    pub user_dna: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognitive_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<String>,
    /// Goal carried inside the strategy payload by older clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Subject forecast signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredictionSignals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
}

/// Efficiency trend signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendSignals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_slope: Option<String>,
    #[serde(alias = "status", skip_serializing_if = "Option::is_none")]
    pub trend_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_risk: Option<String>,
}

/// Structured input for a coaching request.
///
/// Every signal is optional; advisors render missing values as "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoachingContext {
    pub kind: AdviceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub strategy: StrategySignals,
    pub prediction: PredictionSignals,
    #[serde(alias = "trends")]
    pub trend: TrendSignals,
}

impl CoachingContext {
    pub fn new(kind: AdviceKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Set the learner's goal.
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// The explicit goal, falling back to one carried in the strategy signals.
    pub fn effective_goal(&self) -> Option<&str> {
        [&self.goal, &self.strategy.goal]
            .into_iter()
            .filter_map(|g| g.as_deref())
            .map(str::trim)
            .find(|g| !g.is_empty())
    }
}

/// Coaching-text collaborator.
///
/// Implementations report upstream throttling as `StudivonError::RateLimit`
/// so callers can tell it apart from permanent failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    /// Produce coaching text for the given context.
    async fn generate_advice(&self, context: &CoachingContext) -> StudivonResult<String>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// Advisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Model name/identifier.
    pub model: String,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}
