//! Cognitive analytics over study tasks.
//!
//! Every function here is pure: callers fetch tasks from the repository,
//! read the clock once and pass `now` in.

mod completion;
mod dossier;
mod insights;
mod load;
mod priority;
mod retention;
mod review;
mod trend;
mod weekly;

pub use completion::{efficiency_ratio, round2, CompletionFacts};
pub use dossier::{
    compose_dossier, AcademicSummary, ActionPlan, CognitiveState, Dossier, DossierInputs,
    Identity, NextDayPlan, WeeklyStrategy,
};
pub use insights::{
    mastery_report, predict_subject, strategy_profile, CognitiveStyle, Persona,
    PredictionStatus, PredictiveInsight, StrategyProfile, SubjectMastery,
};
pub use load::{
    burnout_risk, mental_load, weekly_load, LoadStatus, MentalLoad, MentalLoadReport, RiskLevel,
    NEUTRAL_EFFICIENCY,
};
pub use priority::{boosted_priority, days_until, priority_score};
pub use retention::{retention_heatmap, retention_probability, RetentionSnapshot, RetentionStatus};
pub use review::{next_stability, plan_review, ReviewPlan};
pub use trend::{
    consistency_score, days_to_critical, efficiency_trend, fatigue_forecast, EfficiencyTrend,
    FatigueForecast, TrendReport, TrendStatus,
};
pub use weekly::{compose_weekly_report, MasteryRange, Productivity, WeeklyReport, WeeklySummary};

use crate::types::{FocusWindow, Task};

/// Arithmetic mean of efficiency scores, missing scores counting as zero.
/// `None` for an empty slice.
pub fn mean_efficiency<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Option<f64> {
    let (total, count) = tasks
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), t| (sum + t.efficiency_or_zero(), n + 1));
    (count > 0).then(|| total / count as f64)
}

/// Most frequent focus window. Ties go to the window seen first.
pub fn dominant_window<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Option<FocusWindow> {
    let mut counts: Vec<(FocusWindow, usize)> = Vec::new();
    for window in tasks.into_iter().filter_map(|t| t.focus_window) {
        match counts.iter_mut().find(|(w, _)| *w == window) {
            Some((_, n)) => *n += 1,
            None => counts.push((window, 1)),
        }
    }
    // max_by_key keeps the last maximum, so scan in reverse
    counts.into_iter().rev().max_by_key(|(_, n)| *n).map(|(w, _)| w)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_mean_efficiency() {
        assert_eq!(mean_efficiency(&[]), None);
        let tasks = vec![completed("Math", 0.5, 1.0), completed("Math", 1.0, 2.0)];
        assert_eq!(mean_efficiency(&tasks), Some(0.75));
    }

    #[test]
    fn test_dominant_window_prefers_first_on_tie() {
        let mut a = completed("Math", 1.0, 1.0);
        a.focus_window = Some(FocusWindow::NightOwl);
        let mut b = completed("Math", 1.0, 2.0);
        b.focus_window = Some(FocusWindow::EarlyBird);
        assert_eq!(dominant_window(&[a.clone(), b.clone()]), Some(FocusWindow::NightOwl));

        let mut c = b.clone();
        c.focus_window = Some(FocusWindow::EarlyBird);
        assert_eq!(dominant_window(&[a, b, c]), Some(FocusWindow::EarlyBird));
        assert_eq!(dominant_window(&[]), None);
    }
}
