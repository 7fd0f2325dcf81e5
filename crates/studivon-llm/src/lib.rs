//! studivon-llm - Coaching advisor implementations for studivon.
//!
//! # Supported Providers
//!
//! - **Gemini** - Google `generateContent` API, keyed by `GOOGLE_API_KEY`
//! - **Offline** - Deterministic text assembled from the coaching signals
//!
//! # Example
//!
//! ```ignore
//! use studivon_core::{Coach, CoachRetryPolicy, CoachingContext, AdviceKind};
//! use studivon_llm::AdvisorFactory;
//!
//! let advisor = AdvisorFactory::gemini_with_model("gemini-2.0-flash")?;
//! let coach = Coach::new(advisor, CoachRetryPolicy::default());
//!
//! let advice = coach
//!     .advise(&CoachingContext::new(AdviceKind::Daily).with_goal("MCAT"))
//!     .await?;
//! ```

mod factory;
mod gemini;
mod offline;
pub mod prompts;

pub use factory::AdvisorFactory;
pub use gemini::GeminiAdvisor;
pub use offline::OfflineAdvisor;

// Re-export core types for convenience
pub use studivon_core::config::AdvisorProvider;
pub use studivon_core::traits::{AdviceGenerator, AdviceKind, AdvisorConfig, CoachingContext};
