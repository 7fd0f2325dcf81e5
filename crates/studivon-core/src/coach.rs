//! Retry and fallback around the coaching collaborator.
//!
//! Upstream throttling is retried with a linear delay (`attempt * step`).
//! When every attempt is throttled the learner still gets a canned,
//! goal-aligned message instead of an error.

use backon::{BackoffBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;

use crate::cognitive::{PredictiveInsight, StrategyProfile, TrendReport};
use crate::config::CoachRetryPolicy;
use crate::error::{StudivonError, StudivonResult};
use crate::traits::{
    AdviceGenerator, CoachingContext, PredictionSignals, StrategySignals, TrendSignals,
};

/// Goal placeholder used when the learner has not stated one.
pub const DEFAULT_GOAL_LABEL: &str = "your goal";

/// Message returned when the advisor stays throttled.
pub fn fallback_advice(goal: Option<&str>) -> String {
    format!(
        "I'm currently optimizing your path toward {}. Let's keep moving forward!",
        goal.unwrap_or(DEFAULT_GOAL_LABEL)
    )
}

/// Backoff yielding `step, 2 * step, 3 * step, ...`.
#[derive(Debug, Clone, Copy)]
pub struct LinearBuilder {
    step: Duration,
    max_times: usize,
}

impl LinearBuilder {
    pub fn new(step: Duration, max_times: usize) -> Self {
        Self { step, max_times }
    }
}

impl From<&CoachRetryPolicy> for LinearBuilder {
    fn from(policy: &CoachRetryPolicy) -> Self {
        Self::new(
            Duration::from_millis(policy.step_delay_ms),
            policy.max_attempts.saturating_sub(1) as usize,
        )
    }
}

impl BackoffBuilder for LinearBuilder {
    type Backoff = LinearBackoff;

    fn build(self) -> Self::Backoff {
        LinearBackoff {
            step: self.step,
            attempt: 0,
            max_times: self.max_times,
        }
    }
}

/// Iterator produced by [`LinearBuilder`].
#[derive(Debug)]
pub struct LinearBackoff {
    step: Duration,
    attempt: usize,
    max_times: usize,
}

impl Iterator for LinearBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_times {
            return None;
        }
        self.attempt += 1;
        Some(self.step * self.attempt as u32)
    }
}

/// Coaching facade over any [`AdviceGenerator`].
pub struct Coach<A: AdviceGenerator + ?Sized> {
    advisor: Arc<A>,
    policy: CoachRetryPolicy,
}

impl<A: AdviceGenerator + ?Sized> Coach<A> {
    pub fn new(advisor: Arc<A>, policy: CoachRetryPolicy) -> Self {
        Self { advisor, policy }
    }

    pub fn model_name(&self) -> &str {
        self.advisor.model_name()
    }

    /// Ask the advisor for coaching text.
    ///
    /// Only `RateLimit` errors are retried. If the last attempt is still
    /// throttled, the canned fallback is returned. Any other error propagates.
    pub async fn advise(&self, context: &CoachingContext) -> StudivonResult<String> {
        let advisor = self.advisor.clone();
        let attempt = || {
            let advisor = advisor.clone();
            async move { advisor.generate_advice(context).await }
        };

        let result = attempt
            .retry(LinearBuilder::from(&self.policy))
            .when(|e| matches!(e, StudivonError::RateLimit { .. }))
            .notify(|err, dur| {
                tracing::warn!(
                    "Advisor {} throttled, retrying in {:?}: {}",
                    self.advisor.model_name(),
                    dur,
                    err
                );
            })
            .await;

        match result {
            Ok(advice) => Ok(advice),
            Err(StudivonError::RateLimit { .. }) => {
                tracing::warn!(
                    "Advisor still throttled after {} attempts, using fallback",
                    self.policy.max_attempts
                );
                Ok(fallback_advice(context.effective_goal()))
            }
            Err(e) => Err(e),
        }
    }
}

impl From<&StrategyProfile> for StrategySignals {
    fn from(profile: &StrategyProfile) -> Self {
        match profile {
            StrategyProfile::Learning { persona, .. } => StrategySignals {
                user_dna: Some(persona.clone()),
                ..Default::default()
            },
            StrategyProfile::Ready {
                user_dna,
                cognitive_style,
                optimization,
                ..
            } => StrategySignals {
                user_dna: Some(user_dna.to_string()),
                cognitive_style: Some(cognitive_style.to_string()),
                optimization: Some(optimization.clone()),
                goal: None,
            },
        }
    }
}

impl From<&PredictiveInsight> for PredictionSignals {
    fn from(insight: &PredictiveInsight) -> Self {
        PredictionSignals {
            prediction: Some(insight.prediction.clone()),
            forecast: Some(insight.forecast.clone()),
        }
    }
}

impl From<&TrendReport> for TrendSignals {
    fn from(report: &TrendReport) -> Self {
        TrendSignals {
            efficiency_slope: Some(format!("{:.1}%", report.efficiency_slope)),
            trend_status: Some(report.trend_status.to_string()),
            consistency_score: report.consistency_score.map(|s| format!("{}%", s)),
            fatigue_risk: Some(report.fatigue_forecast.risk_level.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{AdviceKind, MockAdviceGenerator};
    use mockall::Sequence;

    fn fast_policy() -> CoachRetryPolicy {
        CoachRetryPolicy {
            max_attempts: 3,
            step_delay_ms: 1,
        }
    }

    fn throttled() -> StudivonError {
        StudivonError::rate_limit("quota exhausted")
    }

    #[test]
    fn test_linear_backoff_delays() {
        let delays: Vec<_> = LinearBuilder::new(Duration::from_millis(2000), 2)
            .build()
            .collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(2000), Duration::from_millis(4000)]
        );
    }

    #[test]
    fn test_policy_counts_first_attempt() {
        let delays: Vec<_> = LinearBuilder::from(&CoachRetryPolicy::default())
            .build()
            .collect();
        assert_eq!(delays.len(), 2);

        let none = CoachRetryPolicy {
            max_attempts: 0,
            step_delay_ms: 10,
        };
        assert_eq!(LinearBuilder::from(&none).build().count(), 0);
    }

    #[test]
    fn test_fallback_text() {
        assert_eq!(
            fallback_advice(Some("MCAT")),
            "I'm currently optimizing your path toward MCAT. Let's keep moving forward!"
        );
        assert!(fallback_advice(None).contains("toward your goal."));
    }

    #[tokio::test]
    async fn test_advise_passes_through_success() {
        let mut advisor = MockAdviceGenerator::new();
        advisor
            .expect_generate_advice()
            .times(1)
            .returning(|_| Ok("Keep going".to_string()));
        advisor.expect_model_name().return_const("mock".to_string());

        let coach = Coach::new(Arc::new(advisor), fast_policy());
        let advice = coach
            .advise(&CoachingContext::new(AdviceKind::Daily))
            .await
            .unwrap();
        assert_eq!(advice, "Keep going");
    }

    #[tokio::test]
    async fn test_advise_retries_rate_limit_then_succeeds() {
        let mut seq = Sequence::new();
        let mut advisor = MockAdviceGenerator::new();
        advisor
            .expect_generate_advice()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(throttled()));
        advisor
            .expect_generate_advice()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("Second try".to_string()));
        advisor.expect_model_name().return_const("mock".to_string());

        let coach = Coach::new(Arc::new(advisor), fast_policy());
        let advice = coach
            .advise(&CoachingContext::new(AdviceKind::Daily))
            .await
            .unwrap();
        assert_eq!(advice, "Second try");
    }

    #[tokio::test]
    async fn test_advise_falls_back_after_exhaustion() {
        let mut advisor = MockAdviceGenerator::new();
        advisor
            .expect_generate_advice()
            .times(3)
            .returning(|_| Err(throttled()));
        advisor.expect_model_name().return_const("mock".to_string());

        let coach = Coach::new(Arc::new(advisor), fast_policy());
        let ctx = CoachingContext::new(AdviceKind::StrategySession).with_goal("Pass the bar exam");
        let advice = coach.advise(&ctx).await.unwrap();
        assert_eq!(
            advice,
            "I'm currently optimizing your path toward Pass the bar exam. Let's keep moving forward!"
        );
    }

    #[tokio::test]
    async fn test_advise_propagates_other_errors_without_retry() {
        let mut advisor = MockAdviceGenerator::new();
        advisor
            .expect_generate_advice()
            .times(1)
            .returning(|_| Err(StudivonError::advisor("bad request")));
        advisor.expect_model_name().return_const("mock".to_string());

        let coach = Coach::new(Arc::new(advisor), fast_policy());
        let err = coach
            .advise(&CoachingContext::new(AdviceKind::Daily))
            .await
            .unwrap_err();
        assert!(matches!(err, StudivonError::Advisor { .. }));
    }
}
