//! Video provider trait.

use crate::error::Result;
use crate::video::types::{GeneratedVideo, VideoRequest};
use async_trait::async_trait;

/// Trait for video generation providers.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Generates a video, waiting for the remote job to finish.
    async fn generate(&self, request: &VideoRequest) -> Result<GeneratedVideo>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
