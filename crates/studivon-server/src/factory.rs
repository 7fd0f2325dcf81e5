//! Build the application state from configuration.

use std::sync::Arc;

use studivon_core::clock::SystemClock;
use studivon_core::config::StudivonConfig;
use studivon_core::error::StudivonResult;
use studivon_core::store::{InMemoryTaskRepository, SqliteTaskRepository};
use studivon_core::traits::TaskRepository;
use studivon_llm::AdvisorFactory;

use crate::state::AppState;

/// Open the configured task repository.
pub fn create_repository(config: &StudivonConfig) -> StudivonResult<(Arc<dyn TaskRepository>, &'static str)> {
    match &config.database_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Opening SQLite task store");
            Ok((Arc::new(SqliteTaskRepository::new(path)?), "sqlite"))
        }
        None => {
            tracing::warn!("No database path configured; tasks are kept in memory");
            Ok((Arc::new(InMemoryTaskRepository::new()), "memory"))
        }
    }
}

/// Create the full application state: repository, engine and coach.
pub fn create_state(config: &StudivonConfig) -> StudivonResult<AppState> {
    let (repository, storage) = create_repository(config)?;
    let advisor = AdvisorFactory::create(&config.advisor)?;

    Ok(AppState::new(
        repository,
        Arc::new(SystemClock),
        advisor,
        config.engine.clone(),
        config.coach.clone(),
    )
    .with_storage(storage))
}
