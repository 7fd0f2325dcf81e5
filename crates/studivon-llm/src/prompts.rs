//! Prompt construction for the two coaching sessions.

use studivon_core::{AdviceKind, CoachingContext};

const UNKNOWN: &str = "unknown";
const DEFAULT_GOAL: &str = "Academic Excellence";

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNKNOWN)
}

/// Render the prompt for the requested session kind.
pub fn build_prompt(context: &CoachingContext) -> String {
    match context.kind {
        AdviceKind::Daily => daily_prompt(context),
        AdviceKind::StrategySession => strategy_prompt(context),
    }
}

/// Short, goal-aligned daily nudge.
pub fn daily_prompt(context: &CoachingContext) -> String {
    let goal = context.effective_goal().unwrap_or(DEFAULT_GOAL);
    let trend = &context.trend;
    format!(
        r#"You are the Studivon AI Coach. Your tone is warm, professional, and supportive.
Your mission is to align the user's daily actions with their ultimate goal: "{goal}".

Follow this structure:
1. VISION: Briefly link their current trend to their goal (e.g., "To stay on track for your {goal}...").
2. CONTEXT: Gently mention the rhythm change ({status}) as a helpful observation.
3. GUIDANCE: Suggest one 'small win' task that specifically serves their "{goal}" objective.
4. ASSURE: Remind them how their {dna} DNA helps them reach this specific goal.

DATA:
- Goal: {goal}
- Trend: {slope} {status}
- Stability: {stability}
- Forecast: {forecast}

STRICT RULES: Max 3 sentences. No "failure/danger" words. Use supportive language like "realigning" or "bridge the gap."
"#,
        goal = goal,
        status = or_unknown(&trend.trend_status),
        dna = or_unknown(&context.strategy.user_dna),
        slope = or_unknown(&trend.efficiency_slope),
        stability = or_unknown(&trend.consistency_score),
        forecast = or_unknown(&context.prediction.forecast),
    )
}

/// Three-day recovery and re-alignment plan.
pub fn strategy_prompt(context: &CoachingContext) -> String {
    let goal = context.effective_goal().unwrap_or(DEFAULT_GOAL);
    let strategy = &context.strategy;
    let trend = &context.trend;
    format!(
        r#"You are the Studivon Strategy Mentor.
Act as a high-level academic advisor for a student aiming for: "{goal}".

USER PROFILE DATA:
- Biological DNA: {dna} (Peak efficiency in {optimization}).
- Cognitive Style: {style}.
- Current Trend: {status} ({slope} slope).
- Burnout Risk: {fatigue} (Stability: {stability}).
- Forecast: {forecast}.

YOUR MISSION:
Generate a "3-Day Recovery & Re-alignment Strategy" to protect their goal.

STRICT STRUCTURE:
1. THE DIAGNOSIS: 1 sentence explaining why their current rhythm is/isn't working for their "{goal}".
2. THE 3-DAY PLAN:
   - Day 1: A low-friction task type matching their {style}.
   - Day 2: One high-impact goal task during their {dna} window.
   - Day 3: A standard workload with a specific tip to improve their {stability} stability.
3. THE MENTOR NUDGE: 1 supportive sentence using "Micro-Mentor" tone.

RULES: No generic advice. Reference the specific data provided. Max 150 words.
"#,
        goal = goal,
        dna = or_unknown(&strategy.user_dna),
        optimization = or_unknown(&strategy.optimization),
        style = or_unknown(&strategy.cognitive_style),
        status = or_unknown(&trend.trend_status),
        slope = or_unknown(&trend.efficiency_slope),
        fatigue = or_unknown(&trend.fatigue_risk),
        stability = or_unknown(&trend.consistency_score),
        forecast = or_unknown(&context.prediction.forecast),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_prompt_uses_goal_and_trend() {
        let mut ctx = CoachingContext::new(AdviceKind::Daily).with_goal("MCAT");
        ctx.trend.trend_status = Some("Declining".to_string());
        ctx.trend.efficiency_slope = Some("-12.5%".to_string());

        let prompt = daily_prompt(&ctx);
        assert!(prompt.contains(r#"ultimate goal: "MCAT""#));
        assert!(prompt.contains("- Trend: -12.5% Declining"));
        assert!(prompt.contains("- Forecast: unknown"));
        assert!(prompt.contains("Max 3 sentences"));
    }

    #[test]
    fn test_strategy_prompt_defaults_goal() {
        let mut ctx = CoachingContext::new(AdviceKind::StrategySession);
        ctx.strategy.cognitive_style = Some("Balanced Learner".to_string());

        let prompt = build_prompt(&ctx);
        assert!(prompt.contains(r#"aiming for: "Academic Excellence""#));
        assert!(prompt.contains("Day 1: A low-friction task type matching their Balanced Learner."));
        assert!(prompt.contains("Max 150 words"));
    }

    #[test]
    fn test_build_prompt_dispatches_on_kind() {
        let daily = build_prompt(&CoachingContext::new(AdviceKind::Daily));
        assert!(daily.starts_with("You are the Studivon AI Coach."));
        let strategy = build_prompt(&CoachingContext::new(AdviceKind::StrategySession));
        assert!(strategy.starts_with("You are the Studivon Strategy Mentor."));
    }
}
