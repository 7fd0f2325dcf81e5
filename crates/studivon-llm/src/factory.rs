//! Factory for creating advisors.

use std::sync::Arc;

use studivon_core::config::{AdvisorProvider, AdvisorProviderConfig};
use studivon_core::error::StudivonResult;
use studivon_core::traits::{AdviceGenerator, AdvisorConfig};

use crate::gemini::GeminiAdvisor;
use crate::offline::OfflineAdvisor;

/// Factory for creating advisors.
pub struct AdvisorFactory;

impl AdvisorFactory {
    /// Create an advisor from the given provider configuration.
    pub fn create(config: &AdvisorProviderConfig) -> StudivonResult<Arc<dyn AdviceGenerator>> {
        match config.provider {
            AdvisorProvider::Gemini => {
                let advisor = GeminiAdvisor::new(config.config.clone())?;
                tracing::info!(model = %advisor.model_name(), "Using Gemini advisor");
                Ok(Arc::new(advisor))
            }
            AdvisorProvider::Offline => {
                tracing::info!("Using offline advisor");
                Ok(Arc::new(OfflineAdvisor::new()))
            }
        }
    }

    /// Create a Gemini advisor with a specific model.
    pub fn gemini_with_model(model: impl Into<String>) -> StudivonResult<Arc<dyn AdviceGenerator>> {
        let config = AdvisorConfig {
            model: model.into(),
            ..Default::default()
        };
        Ok(Arc::new(GeminiAdvisor::new(config)?))
    }

    /// Create the offline advisor.
    pub fn offline() -> Arc<dyn AdviceGenerator> {
        Arc::new(OfflineAdvisor::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_provider() {
        let config = AdvisorProviderConfig {
            provider: AdvisorProvider::Offline,
            config: AdvisorConfig::default(),
        };
        let advisor = AdvisorFactory::create(&config).unwrap();
        assert_eq!(advisor.model_name(), "offline");
    }

    #[test]
    fn test_gemini_with_explicit_key() {
        let config = AdvisorProviderConfig {
            provider: AdvisorProvider::Gemini,
            config: AdvisorConfig {
                model: "gemini-1.5-pro".to_string(),
                api_key: Some("k".to_string()),
                ..Default::default()
            },
        };
        let advisor = AdvisorFactory::create(&config).unwrap();
        assert_eq!(advisor.model_name(), "gemini-1.5-pro");
    }
}
