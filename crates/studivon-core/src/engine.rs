//! Study engine: wires the analytics to a task repository and a clock.
//!
//! Each public method is one request. It reads the clock once, fetches what
//! it needs (independent reads run concurrently), then hands plain data to the
//! pure functions in [`crate::cognitive`].

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::Clock;
use crate::cognitive::{
    boosted_priority, compose_dossier, compose_weekly_report, mastery_report, plan_review,
    predict_subject, priority_score, strategy_profile, CompletionFacts, Dossier, DossierInputs,
    PredictiveInsight, StrategyProfile, SubjectMastery, TrendReport, WeeklyReport,
};
use crate::config::EngineConfig;
use crate::error::{StudivonError, StudivonResult};
use crate::traits::{
    AdviceKind, CoachingContext, PredictionSignals, StrategySignals, TaskRepository, TrendSignals,
};
use crate::types::{
    clamp_difficulty, FocusWindow, NewTask, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus,
};

/// Parse a deadline given as RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_deadline(raw: &str) -> StudivonResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| StudivonError::invalid_date(raw))
}

/// Result of creating a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    pub task_id: String,
    pub priority_score: u32,
}

/// The review spawned by a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchedule {
    pub review_task_id: String,
    pub interval_days: u32,
    pub next_review_date: DateTime<Utc>,
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub task_id: String,
    pub efficiency_score: f64,
    pub focus_detected: FocusWindow,
    pub burnout_warning: bool,
    pub burnout_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spaced_repetition: Option<ReviewSchedule>,
    pub spaced_repetition_message: String,
}

/// Result of marking a task missed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissOutcome {
    pub task_id: String,
    pub new_priority: u32,
}

/// The analytics engine over a task repository.
pub struct StudyEngine<R: ?Sized, C> {
    repo: Arc<R>,
    clock: C,
    config: EngineConfig,
}

impl<R, C> StudyEngine<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock,
{
    pub fn new(repo: Arc<R>, clock: C, config: EngineConfig) -> Self {
        Self { repo, clock, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Create a pending task with its initial priority.
    pub async fn create_task(&self, input: NewTask) -> StudivonResult<CreatedTask> {
        let now = self.clock.now();
        let title = input.title.trim();
        let subject = input.subject.trim();
        if title.is_empty() {
            return Err(StudivonError::missing_field("title"));
        }
        if subject.is_empty() {
            return Err(StudivonError::missing_field("subject"));
        }

        let priority = &self.config.priority;
        let estimated = input
            .estimated_minutes
            .filter(|m| *m > 0)
            .map(|m| m.min(u32::MAX as i64) as u32)
            .unwrap_or(priority.default_estimated_minutes);
        let score = priority_score(input.difficulty, input.deadline, now, priority);

        let task = Task::pending(
            title,
            subject,
            input.task_type.unwrap_or_default(),
            clamp_difficulty(input.difficulty),
            estimated,
            input.deadline,
            score,
            now,
        );
        let task_id = self.repo.insert_task(task).await?;

        tracing::info!(task_id = %task_id, priority = score, "Created task");
        Ok(CreatedTask {
            task_id,
            priority_score: score,
        })
    }

    /// Complete a task and, for Practice and Revision, schedule its review.
    ///
    /// The parent is written first through a conditional transition from
    /// pending or missed. A repeated completion therefore fails with a
    /// conflict before any review is spawned. The burnout check counts heavy
    /// completions from the trailing window that precede this one.
    pub async fn complete_task(&self, id: &str, actual_minutes: f64) -> StudivonResult<CompletionOutcome> {
        let now = self.clock.now();
        let task = self.fetch(id).await?;
        if task.is_completed() {
            return Err(StudivonError::already_completed(id));
        }

        let facts = CompletionFacts::analyze(&task, actual_minutes, now, self.config.utc_offset_minutes)?;
        // Earlier heavy completions only; this task is still open here.
        let load = &self.config.load;
        let recent_heavy = self
            .repo
            .count_tasks(
                &TaskFilter::completed()
                    .with_min_difficulty(load.high_intensity_difficulty)
                    .completed_since(now - Duration::hours(load.completion_window_hours)),
            )
            .await?;

        let transitioned = self
            .repo
            .transition_task(id, &[TaskStatus::Pending, TaskStatus::Missed], facts.to_patch())
            .await?;
        if !transitioned {
            return Err(StudivonError::already_completed(id));
        }
        let burnout_warning = recent_heavy >= load.acute_task_threshold;
        if burnout_warning {
            tracing::warn!(task_id = %id, recent_heavy, "Burnout threshold reached");
        }
        tracing::info!(
            task_id = %id,
            efficiency = facts.efficiency_score,
            focus_window = %facts.focus_window,
            "Completed task"
        );

        let spaced_repetition = match plan_review(&task, facts.efficiency_ratio, now, &self.config.review) {
            Some(plan) => {
                let review = plan.review_task(&task, now, &self.config.review);
                let review_task_id = self.repo.insert_task(review).await?;
                tracing::info!(
                    task_id = %id,
                    review_task_id = %review_task_id,
                    interval_days = plan.interval_days,
                    "Scheduled review"
                );
                Some(ReviewSchedule {
                    review_task_id,
                    interval_days: plan.interval_days,
                    next_review_date: plan.next_review_date,
                })
            }
            None => None,
        };

        Ok(CompletionOutcome {
            task_id: id.to_string(),
            efficiency_score: facts.efficiency_score,
            focus_detected: facts.focus_window,
            burnout_warning,
            burnout_message: if burnout_warning {
                "High burnout risk! Take a break."
            } else {
                "Safe workload."
            }
            .to_string(),
            spaced_repetition_message: match &spaced_repetition {
                Some(review) => format!(
                    "Memory anchored. Next review scheduled in {} days.",
                    review.interval_days
                ),
                None => "Task completed without auto-review.".to_string(),
            },
            spaced_repetition,
        })
    }

    /// Mark a pending task missed, boosting its priority.
    pub async fn miss_task(&self, id: &str) -> StudivonResult<MissOutcome> {
        let task = self.fetch(id).await?;
        if task.status != TaskStatus::Pending {
            return Err(StudivonError::invalid_transition(
                id,
                format!("Only pending tasks can be marked missed; task is {}", task.status),
            ));
        }

        let new_priority = boosted_priority(task.priority_score, &self.config.priority);
        let patch = TaskPatch {
            status: Some(TaskStatus::Missed),
            priority_score: Some(new_priority),
            needs_reschedule: Some(true),
            ..Default::default()
        };
        if !self.repo.transition_task(id, &[TaskStatus::Pending], patch).await? {
            return Err(StudivonError::invalid_transition(
                id,
                "Task changed status while being marked missed",
            ));
        }

        tracing::info!(task_id = %id, new_priority, "Marked task missed");
        Ok(MissOutcome {
            task_id: id.to_string(),
            new_priority,
        })
    }

    /// Fetch one task.
    pub async fn get_task(&self, id: &str) -> StudivonResult<Task> {
        self.fetch(id).await
    }

    /// Pending tasks, highest priority first.
    pub async fn pending_tasks(&self) -> StudivonResult<Vec<Task>> {
        self.repo
            .find_tasks(&TaskFilter::pending(), Some(TaskSort::PriorityDesc), None)
            .await
    }

    /// Mastery per subject over all completions, weakest first.
    pub async fn mastery_report(&self) -> StudivonResult<Vec<SubjectMastery>> {
        let aggregates = self.repo.aggregate_by_subject(&TaskFilter::completed()).await?;
        Ok(mastery_report(aggregates))
    }

    /// Forecast for one subject.
    pub async fn predictive_insight(&self, subject: &str) -> StudivonResult<PredictiveInsight> {
        let history = self
            .repo
            .find_tasks(
                &TaskFilter::completed().with_subject(subject),
                Some(TaskSort::CompletedAtAsc),
                None,
            )
            .await?;
        Ok(predict_subject(subject, &history, &self.config.insight, &self.config.trend))
    }

    /// Learner strategy profile over all completions.
    pub async fn user_strategy(&self) -> StudivonResult<StrategyProfile> {
        let history = self.repo.find_tasks(&TaskFilter::completed(), None, None).await?;
        Ok(strategy_profile(&history, &self.config.insight))
    }

    /// Week-over-week trend, mental load and 48-hour fatigue forecast.
    pub async fn trend_analysis(&self) -> StudivonResult<TrendReport> {
        let now = self.clock.now();
        let lookback = now - Duration::days(self.config.trend.window_days * 2);
        let completed_filter = TaskFilter::completed().completed_since(lookback);
        let pending_filter = TaskFilter::pending();

        let (completed, pending) = tokio::try_join!(
            self.repo.find_tasks(&completed_filter, None, None),
            self.repo.find_tasks(&pending_filter, None, None),
        )?;
        Ok(TrendReport::compose(&completed, &pending, now, &self.config))
    }

    /// The consolidated dossier. Its three reads run concurrently and any
    /// failure fails the whole report.
    pub async fn dossier(&self) -> StudivonResult<Dossier> {
        let now = self.clock.now();
        let load = &self.config.load;
        let recent_filter = TaskFilter::completed();
        let pending_filter = TaskFilter::pending();
        let acute_filter = TaskFilter::completed()
            .with_min_difficulty(load.high_intensity_difficulty)
            .completed_since(now - Duration::hours(load.acute_window_hours));

        let (recent, pending, acute_count) = tokio::try_join!(
            self.repo.find_tasks(
                &recent_filter,
                Some(TaskSort::CompletedAtDesc),
                Some(self.config.insight.dossier_sample_size),
            ),
            self.repo.find_tasks(&pending_filter, Some(TaskSort::PriorityDesc), None),
            self.repo.count_tasks(&acute_filter),
        )?;

        let inputs = DossierInputs {
            recent,
            pending,
            acute_count,
        };
        Ok(compose_dossier(&inputs, &self.config))
    }

    /// Weekly intelligence report over the trailing window.
    pub async fn weekly_report(&self) -> StudivonResult<WeeklyReport> {
        let now = self.clock.now();
        let since = now - Duration::days(self.config.trend.window_days);
        let recent = self
            .repo
            .find_tasks(&TaskFilter::completed().completed_since(since), None, None)
            .await?;
        Ok(compose_weekly_report(&recent, now, &self.config))
    }

    /// Assemble coaching signals from the learner's own history.
    ///
    /// Prediction signals are only filled when a subject is given.
    pub async fn coaching_context(
        &self,
        kind: AdviceKind,
        goal: Option<String>,
        subject: Option<&str>,
    ) -> StudivonResult<CoachingContext> {
        let prediction = async {
            match subject {
                Some(subject) => self.predictive_insight(subject).await.map(Some),
                None => Ok(None),
            }
        };
        let (strategy, trend, prediction) =
            tokio::try_join!(self.user_strategy(), self.trend_analysis(), prediction)?;

        Ok(CoachingContext {
            kind,
            goal,
            strategy: StrategySignals::from(&strategy),
            prediction: prediction
                .as_ref()
                .map(PredictionSignals::from)
                .unwrap_or_default(),
            trend: TrendSignals::from(&trend),
        })
    }

    async fn fetch(&self, id: &str) -> StudivonResult<Task> {
        self.repo
            .get_task(id)
            .await?
            .ok_or_else(|| StudivonError::not_found(id))
    }
}
