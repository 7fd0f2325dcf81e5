//! Completion analyzer.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use crate::error::{StudivonError, StudivonResult};
use crate::types::{FocusWindow, Task, TaskPatch, TaskStatus};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `estimated / actual`. Unclamped above; fails unless `actual` is a positive finite
/// number and the ratio itself stays finite.
pub fn efficiency_ratio(estimated_minutes: u32, actual_minutes: f64) -> StudivonResult<f64> {
    if !actual_minutes.is_finite() || actual_minutes <= 0.0 {
        return Err(StudivonError::validation(format!(
            "actualMinutes must be a positive number, got {}",
            actual_minutes
        )));
    }
    let ratio = estimated_minutes as f64 / actual_minutes;
    if !ratio.is_finite() {
        return Err(StudivonError::validation(format!(
            "actualMinutes {} is too small to score",
            actual_minutes
        )));
    }
    Ok(ratio)
}

/// Facts recorded when a task is completed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionFacts {
    pub actual_minutes: f64,
    pub completed_at: DateTime<Utc>,
    /// Local hour of day, 0-23.
    pub completion_hour: u32,
    pub focus_window: FocusWindow,
    /// Unrounded ratio; drives the review interval.
    pub efficiency_ratio: f64,
    /// Ratio rounded to two decimals; the stored score.
    pub efficiency_score: f64,
}

impl CompletionFacts {
    /// Analyze a completion of `task` at `now`.
    ///
    /// `utc_offset_minutes` places `now` on the learner's local clock before
    /// the hour of day is taken. Offsets outside +/-24h fall back to UTC.
    pub fn analyze(
        task: &Task,
        actual_minutes: f64,
        now: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> StudivonResult<Self> {
        let ratio = efficiency_ratio(task.estimated_minutes, actual_minutes)?;
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        let hour = now.with_timezone(&offset).hour();

        Ok(Self {
            actual_minutes,
            completed_at: now,
            completion_hour: hour,
            focus_window: FocusWindow::from_hour(hour),
            efficiency_ratio: ratio,
            efficiency_score: round2(ratio),
        })
    }

    /// The write-of-record for this completion.
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            status: Some(TaskStatus::Completed),
            actual_minutes: Some(self.actual_minutes),
            completed_at: Some(self.completed_at),
            completion_hour: Some(self.completion_hour),
            focus_window: Some(self.focus_window),
            efficiency_score: Some(self.efficiency_score),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskType;
    use chrono::TimeZone;

    fn task(estimated: u32) -> Task {
        let now = Utc::now();
        Task::pending("Limits", "Calculus", TaskType::Practice, 3, estimated, now, 80, now)
    }

    #[test]
    fn test_ratio_half() {
        assert_eq!(efficiency_ratio(30, 60.0).unwrap(), 0.5);
    }

    #[test]
    fn test_ratio_rejects_non_positive_and_non_finite() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = efficiency_ratio(30, bad).unwrap_err();
            assert!(matches!(err, StudivonError::Validation { .. }));
        }
    }

    #[test]
    fn test_ratio_rejects_subnormal_actual() {
        let tiny = f64::MIN_POSITIVE / 1e10;
        assert!(tiny > 0.0);
        let err = efficiency_ratio(30, tiny).unwrap_err();
        assert!(matches!(err, StudivonError::Validation { .. }));
        assert!(CompletionFacts::analyze(&task(60), tiny, Utc::now(), 0).is_err());
    }

    #[test]
    fn test_focus_window_from_completion_hour() {
        let cases = [(23, FocusWindow::NightOwl), (9, FocusWindow::EarlyBird), (14, FocusWindow::MidDaySteady)];
        for (hour, expected) in cases {
            let at = Utc.with_ymd_and_hms(2025, 3, 1, hour, 30, 0).unwrap();
            let facts = CompletionFacts::analyze(&task(60), 60.0, at, 0).unwrap();
            assert_eq!(facts.completion_hour, hour);
            assert_eq!(facts.focus_window, expected);
        }
    }

    #[test]
    fn test_offset_shifts_completion_hour() {
        // 20:00 UTC is 01:00 the next day at UTC+5
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();
        let facts = CompletionFacts::analyze(&task(60), 60.0, at, 300).unwrap();
        assert_eq!(facts.completion_hour, 1);
        assert_eq!(facts.focus_window, FocusWindow::NightOwl);
    }

    #[test]
    fn test_score_rounded_ratio_kept() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let facts = CompletionFacts::analyze(&task(50), 30.0, at, 0).unwrap();
        assert!((facts.efficiency_ratio - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(facts.efficiency_score, 1.67);

        let patch = facts.to_patch();
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert_eq!(patch.efficiency_score, Some(1.67));
        assert_eq!(patch.completed_at, Some(at));
        assert!(patch.priority_score.is_none());
    }
}
