//! Prompt provider trait.

use crate::assets::ReferenceImages;
use crate::config::PromptConfig;
use crate::error::Result;
use async_trait::async_trait;

/// A snapshot of everything the text model gets to see.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    /// Ad parameters.
    pub config: PromptConfig,
    /// Reference images, copied at call time.
    pub images: ReferenceImages,
}

impl PromptRequest {
    /// Creates a request from a config and image snapshot.
    pub fn new(config: PromptConfig, images: ReferenceImages) -> Self {
        Self { config, images }
    }
}

/// Trait for services that write video prompts.
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Generates a video prompt. Fails on remote errors or empty output.
    async fn generate(&self, request: &PromptRequest) -> Result<String>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
