//! External trust assessment
//!
//! The [`Assessor`] trait is the seam between the analysis executor and the
//! LLM provider; [`DeepSeekClient`] is the production implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod deepseek;
mod error;
pub mod prompt;
mod verdict;

pub use client::Assessor;
pub use deepseek::DeepSeekClient;
pub use error::AssessError;
pub use verdict::parse_assessment;

use crate::config::AssessConfig;

/// Create an assessor for the provider named in the configuration
pub fn create_assessor(config: &AssessConfig) -> Result<Arc<dyn Assessor>, AssessError> {
    debug!(provider = %config.provider, model = %config.model, "create_assessor: called");
    match config.provider.as_str() {
        "deepseek" => Ok(Arc::new(DeepSeekClient::from_config(config)?)),
        other => Err(AssessError::Config(format!(
            "Unsupported assessment provider: '{}'. Supported: deepseek",
            other
        ))),
    }
}
