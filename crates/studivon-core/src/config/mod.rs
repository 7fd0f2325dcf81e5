//! Configuration system for studivon.
//!
//! The analytics formulas are driven by fixed tuning constants. Each one is a
//! named field here so deployments can override it without touching code; the
//! defaults reproduce the reference behaviour exactly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{StudivonError, StudivonResult};
use crate::traits::AdvisorConfig;

/// Priority engine weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    /// Points per difficulty level.
    pub difficulty_weight: f64,
    /// Numerator of the urgency term `numerator / days_to_deadline`.
    pub urgency_numerator: f64,
    /// Multiplier applied to the priority of a missed task.
    pub missed_boost: f64,
    /// Estimate used when a task is created without a positive one.
    pub default_estimated_minutes: u32,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            difficulty_weight: 25.0,
            urgency_numerator: 100.0,
            missed_boost: 1.3,
            default_estimated_minutes: 60,
        }
    }
}

/// Spaced-repetition scheduler constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Stability multiplier when the learner met or beat the estimate.
    pub efficient_multiplier: f64,
    /// Stability multiplier otherwise. Never below 1, so intervals never shrink.
    pub inefficient_multiplier: f64,
    /// Fraction of the original estimate a review is expected to take.
    pub time_factor: f64,
    /// Fixed priority of spawned reviews.
    pub review_priority: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            efficient_multiplier: 2.0,
            inefficient_multiplier: 1.5,
            time_factor: 0.6,
            review_priority: 40,
        }
    }
}

/// Mental-load and burnout model constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub difficulty_weight: f64,
    pub subject_weight: f64,
    /// `base - avg_efficiency / efficiency_divisor` discounts the raw load.
    pub base: f64,
    pub efficiency_divisor: f64,
    /// Index strictly above this is overloaded and counts as burnout.
    pub overload_threshold: u32,
    /// Index strictly above this triggers a mandatory rest recommendation.
    pub rest_threshold: u32,
    /// Difficulty at or above which a completion is high-intensity.
    pub high_intensity_difficulty: u8,
    /// Trailing window for the acute burnout count.
    pub acute_window_hours: i64,
    /// High-intensity completions in the acute window that flag burnout.
    pub acute_task_threshold: usize,
    /// Trailing window checked right after a completion.
    pub completion_window_hours: i64,
    /// Distinct pending subjects above which context switching is risky.
    pub context_switch_threshold: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            difficulty_weight: 2.0,
            subject_weight: 5.0,
            base: 1.1,
            efficiency_divisor: 2.0,
            overload_threshold: 75,
            rest_threshold: 60,
            high_intensity_difficulty: 4,
            acute_window_hours: 48,
            acute_task_threshold: 3,
            completion_window_hours: 24,
            context_switch_threshold: 3,
        }
    }
}

/// Trend analyzer and fatigue forecast constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Length of each comparison window; the lookback is twice this.
    pub window_days: i64,
    /// Forward horizon for the fatigue forecast.
    pub fatigue_window_hours: i64,
    /// Upcoming load above this is high risk regardless of trend.
    pub fatigue_high_load: u32,
    /// Upcoming load above this is high risk when efficiency is declining.
    pub fatigue_declining_load: u32,
    /// Efficiency drop (first minus last) that flags a subject as at risk.
    pub decline_threshold: f64,
    /// Numerator of the days-to-critical projection.
    pub critical_horizon_days: f64,
    /// Floor of the days-to-critical projection.
    pub min_days_to_critical: i64,
    /// Latest efficiency above this is reported as excellence.
    pub excellence_threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            fatigue_window_hours: 48,
            fatigue_high_load: 15,
            fatigue_declining_load: 10,
            decline_threshold: 0.1,
            critical_horizon_days: 14.0,
            min_days_to_critical: 3,
            excellence_threshold: 1.2,
        }
    }
}

/// Retention forecaster thresholds (percent).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Below this is critical.
    pub critical_below: u32,
    /// Below this (and not critical) is fading.
    pub fading_below: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            critical_below: 60,
            fading_below: 80,
        }
    }
}

/// Thresholds for the profile, dossier and weekly report read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Completions required before a subject forecast is produced.
    pub prediction_min_history: usize,
    /// Completions required before the strategy profile is produced.
    pub strategy_min_history: usize,
    /// Revision/practice efficiency ratio that marks a learning style.
    pub style_ratio: f64,
    /// Practice efficiency below this raises an alert.
    pub practice_alert_threshold: f64,
    /// Average efficiency above this reads as a fast learner.
    pub steady_efficiency: f64,
    /// Discipline score above this reads as a consistent routine.
    pub discipline_threshold: f64,
    /// Recent completions sampled by the dossier.
    pub dossier_sample_size: usize,
    /// Heavy completions in a week above this flag weekly burnout.
    pub weekly_heavy_task_threshold: usize,
    /// Weekly load above this suggests subject batching.
    pub weekly_load_threshold: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            prediction_min_history: 2,
            strategy_min_history: 3,
            style_ratio: 1.2,
            practice_alert_threshold: 0.8,
            steady_efficiency: 0.8,
            discipline_threshold: 0.7,
            dossier_sample_size: 20,
            weekly_heavy_task_threshold: 5,
            weekly_load_threshold: 60,
        }
    }
}

/// All analytics tuning in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub priority: PriorityConfig,
    pub review: ReviewConfig,
    pub load: LoadConfig,
    pub trend: TrendConfig,
    pub retention: RetentionConfig,
    pub insight: InsightConfig,
    /// Offset from UTC, in minutes, used to derive the completion hour of day.
    pub utc_offset_minutes: i32,
}

/// Retry policy for the coaching collaborator.
///
/// Delay before attempt `n + 1` is `n * step_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachRetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub step_delay_ms: u64,
}

impl Default for CoachRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            step_delay_ms: 2000,
        }
    }
}

/// Advisor provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorProvider {
    #[default]
    Gemini,
    /// Deterministic text assembled locally; no network.
    Offline,
}

/// Provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorProviderConfig {
    pub provider: AdvisorProvider,
    #[serde(flatten)]
    pub config: AdvisorConfig,
}

impl Default for AdvisorProviderConfig {
    fn default() -> Self {
        Self {
            provider: AdvisorProvider::Gemini,
            config: AdvisorConfig {
                model: "gemini-2.0-flash".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Main studivon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudivonConfig {
    pub engine: EngineConfig,
    pub coach: CoachRetryPolicy,
    pub advisor: AdvisorProviderConfig,
    /// SQLite task database. `None` keeps tasks in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl Default for StudivonConfig {
    fn default() -> Self {
        let studivon_dir = dirs::home_dir()
            .map(|h| h.join(".studivon"))
            .unwrap_or_else(|| PathBuf::from(".studivon"));

        Self {
            engine: EngineConfig::default(),
            coach: CoachRetryPolicy::default(),
            advisor: AdvisorProviderConfig::default(),
            database_path: Some(studivon_dir.join("tasks.db")),
        }
    }
}

impl StudivonConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StudivonResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| StudivonError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| StudivonError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| StudivonError::Configuration(e.to_string())),
            _ => Err(StudivonError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("STUDIVON_DB_PATH") {
            config.database_path = match path.as_str() {
                "" | ":memory:" => None,
                _ => Some(PathBuf::from(path)),
            };
        }

        if let Ok(api_key) = std::env::var("GOOGLE_API_KEY") {
            config.advisor.config.api_key = Some(api_key);
        } else {
            config.advisor.provider = AdvisorProvider::Offline;
        }
        if let Ok(model) = std::env::var("STUDIVON_LLM_MODEL") {
            config.advisor.config.model = model;
        }

        if let Ok(offset) = std::env::var("STUDIVON_UTC_OFFSET_MINUTES") {
            match offset.parse() {
                Ok(minutes) => config.engine.utc_offset_minutes = minutes,
                Err(_) => tracing::warn!("Ignoring invalid STUDIVON_UTC_OFFSET_MINUTES: {}", offset),
            }
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> StudivonConfigBuilder {
        StudivonConfigBuilder::default()
    }
}

/// Builder for StudivonConfig.
#[derive(Default)]
pub struct StudivonConfigBuilder {
    config: StudivonConfig,
}

impl StudivonConfigBuilder {
    /// Set analytics tuning.
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    /// Set coaching retry policy.
    pub fn coach(mut self, policy: CoachRetryPolicy) -> Self {
        self.config.coach = policy;
        self
    }

    /// Set advisor configuration.
    pub fn advisor(mut self, advisor: AdvisorProviderConfig) -> Self {
        self.config.advisor = advisor;
        self
    }

    /// Set the SQLite database path.
    pub fn database_path(mut self, path: PathBuf) -> Self {
        self.config.database_path = Some(path);
        self
    }

    /// Keep tasks in memory only.
    pub fn in_memory(mut self) -> Self {
        self.config.database_path = None;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StudivonConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_constants() {
        let engine = EngineConfig::default();
        assert_eq!(engine.priority.difficulty_weight, 25.0);
        assert_eq!(engine.priority.missed_boost, 1.3);
        assert_eq!(engine.review.time_factor, 0.6);
        assert_eq!(engine.review.review_priority, 40);
        assert_eq!(engine.load.base, 1.1);
        assert_eq!(engine.load.overload_threshold, 75);
        assert_eq!(engine.trend.window_days, 7);
        assert_eq!(engine.insight.dossier_sample_size, 20);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[engine.priority]\nmissed_boost = 1.5\n\n[coach]\nmax_attempts = 5\n"
        )
        .unwrap();

        let config = StudivonConfig::from_file(file.path()).unwrap();
        assert_eq!(config.engine.priority.missed_boost, 1.5);
        assert_eq!(config.engine.priority.difficulty_weight, 25.0);
        assert_eq!(config.coach.max_attempts, 5);
        assert_eq!(config.coach.step_delay_ms, 2000);
    }

    #[test]
    fn test_unsupported_extension_is_configuration_error() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = StudivonConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, StudivonError::Configuration(_)));
    }

    #[test]
    fn test_builder_in_memory() {
        let config = StudivonConfig::builder().in_memory().build();
        assert!(config.database_path.is_none());
    }
}
