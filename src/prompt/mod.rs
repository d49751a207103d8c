//! Prompt synthesis: turns the ad configuration into a video prompt.

mod gemini;
mod provider;
pub mod template;

pub use gemini::{GeminiPromptProvider, GeminiPromptProviderBuilder, GeminiTextModel};
pub use provider::{PromptProvider, PromptRequest};
