//! studivon-core - Core library for studivon.
//!
//! This crate provides the task model, the cognitive analytics (priority,
//! completion efficiency, spaced repetition, mental load, trends, retention
//! and the dossier), the repository and advisor traits, and the
//! [`StudyEngine`] that wires them together.
//!
//! # Example
//!
//! ```ignore
//! use studivon_core::{EngineConfig, InMemoryTaskRepository, NewTask, StudyEngine, SystemClock};
//!
//! let engine = StudyEngine::new(
//!     Arc::new(InMemoryTaskRepository::new()),
//!     SystemClock,
//!     EngineConfig::default(),
//! );
//!
//! // Add a task
//! let created = engine.create_task(NewTask::new("Limits", "Calculus", 4, deadline)).await?;
//!
//! // Complete it in 45 minutes
//! let outcome = engine.complete_task(&created.task_id, 45.0).await?;
//! ```

pub mod clock;
pub mod coach;
pub mod cognitive;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use coach::{fallback_advice, Coach};
pub use config::{
    AdvisorProvider, AdvisorProviderConfig, CoachRetryPolicy, EngineConfig, StudivonConfig,
};
pub use engine::{
    parse_deadline, CompletionOutcome, CreatedTask, MissOutcome, ReviewSchedule, StudyEngine,
};
pub use error::{ErrorCode, StudivonError, StudivonResult};
pub use store::{InMemoryTaskRepository, SqliteTaskRepository};
pub use traits::{
    AdviceGenerator, AdviceKind, AdvisorConfig, CoachingContext, PredictionSignals,
    StrategySignals, TaskRepository, TrendSignals,
};
pub use types::{
    FocusWindow, NewTask, SubjectAggregate, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus,
    TaskType,
};
