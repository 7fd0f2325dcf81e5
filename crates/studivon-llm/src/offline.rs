//! Deterministic advisor that never leaves the process.

use async_trait::async_trait;

use studivon_core::error::StudivonResult;
use studivon_core::traits::{AdviceGenerator, AdviceKind, CoachingContext};

/// Assembles coaching text locally from the context signals.
///
/// Used when no API key is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct OfflineAdvisor;

impl OfflineAdvisor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AdviceGenerator for OfflineAdvisor {
    async fn generate_advice(&self, context: &CoachingContext) -> StudivonResult<String> {
        let goal = context.effective_goal().unwrap_or("your goal");
        let declining = context
            .trend
            .trend_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("declining"));
        let window = context
            .strategy
            .user_dna
            .as_deref()
            .unwrap_or("strongest");

        let advice = match context.kind {
            AdviceKind::Daily if declining => format!(
                "Your rhythm has shifted a little, so let's bridge the gap toward {}. \
                 Pick one short task you can finish today. Your {} window is where it will land best.",
                goal, window
            ),
            AdviceKind::Daily => format!(
                "You're moving steadily toward {}. Keep today's plan light and finish one \
                 focused task in your {} window.",
                goal, window
            ),
            AdviceKind::StrategySession => {
                let style = context
                    .strategy
                    .cognitive_style
                    .as_deref()
                    .unwrap_or("preferred style");
                format!(
                    "Day 1: Start with a low-friction task that suits your {}. \
                     Day 2: Schedule one high-impact task for {} during your {} window. \
                     Day 3: Return to a standard workload and keep sessions in the same time slot.",
                    style, goal, window
                )
            }
        };
        Ok(advice)
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}
