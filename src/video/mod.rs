//! Video synthesis: Veo submission, operation polling and download.

mod provider;
mod types;
mod veo;
pub mod wire;

pub use provider::VideoProvider;
pub use types::{GeneratedVideo, VeoModel, VideoMetadata, VideoRequest};
pub use veo::{HttpVeoApi, VeoApi, VeoProvider, VeoProviderBuilder, DEFAULT_POLL_INTERVAL};
