//! Server state management.

use std::sync::Arc;

use studivon_core::clock::Clock;
use studivon_core::coach::Coach;
use studivon_core::config::{CoachRetryPolicy, EngineConfig};
use studivon_core::engine::StudyEngine;
use studivon_core::traits::{AdviceGenerator, TaskRepository};

/// Engine type served over HTTP.
pub type SharedEngine = StudyEngine<dyn TaskRepository, Arc<dyn Clock>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SharedEngine>,
    pub coach: Arc<Coach<dyn AdviceGenerator>>,
    /// Storage backend label reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
        advisor: Arc<dyn AdviceGenerator>,
        engine: EngineConfig,
        retry: CoachRetryPolicy,
    ) -> Self {
        Self {
            engine: Arc::new(StudyEngine::new(repository, clock, engine)),
            coach: Arc::new(Coach::new(advisor, retry)),
            storage: "memory",
        }
    }

    /// Label the storage backend.
    pub fn with_storage(mut self, storage: &'static str) -> Self {
        self.storage = storage;
        self
    }
}
