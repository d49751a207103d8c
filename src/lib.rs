#![warn(missing_docs)]
//! AdGenius - advertising video studio.
//!
//! Turns a product brief and optional reference images into a cinematic
//! video prompt (Gemini), then into a short video (Veo), keeping a rolling
//! history of the last generations.
//!
//! # Quick Start
//!
//! ```no_run
//! use adgenius::{PromptConfig, Settings, Studio};
//!
//! #[tokio::main]
//! async fn main() -> adgenius::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let mut studio = Studio::from_settings(&settings).await?;
//!
//!     studio.set_config(PromptConfig::new("Kopi Senja").with_duration_secs(10));
//!     println!("{}", studio.generate_prompt().await?);
//!
//!     let entry = studio
//!         .create_video(|state| eprintln!("{}% {}", state.progress, state.message))
//!         .await?;
//!     println!("saved to {}", entry.video_url.unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `adgenius` binary and its logging setup

pub mod assets;
pub mod config;
pub mod credential;
mod error;
mod google;
pub mod history;
pub mod progress;
pub mod prompt;
pub mod settings;
pub mod studio;
pub mod video;

#[cfg(feature = "cli")]
#[doc(hidden)]
pub mod logging;

pub use error::{AdGeniusError, ErrorKind, Result};
pub use google::DEFAULT_BASE_URL;

pub use assets::{ImageAsset, ImageFormat, ImageRole, ReferenceImages};
pub use config::{AspectRatio, PromptConfig, DURATION_PRESETS, STYLES, TONES};
pub use credential::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use history::{
    FileStorage, GenerationStatus, HistoryEntry, HistoryStore, MemoryStorage, Storage,
};
pub use progress::{ProgressTicker, VideoState};
pub use prompt::{
    GeminiPromptProvider, GeminiPromptProviderBuilder, GeminiTextModel, PromptProvider,
    PromptRequest,
};
pub use settings::Settings;
pub use studio::{Studio, StudioBuilder};
pub use video::{
    GeneratedVideo, VeoModel, VeoProvider, VeoProviderBuilder, VideoMetadata, VideoProvider,
    VideoRequest,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{AdGeniusError, Result};
    pub use crate::{
        AspectRatio, ImageAsset, ImageRole, PromptConfig, PromptProvider, Studio, VideoProvider,
        VideoState,
    };
}
