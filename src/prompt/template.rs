//! Fixed instruction texts sent to the text model.

use crate::config::PromptConfig;

/// System instruction framing the model as an ad videographer.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert in advertising videography and prompt engineering.
Your task is to write an in-depth, descriptive video prompt for an AI video model (such as Veo).

The prompt must cover:
1. Camera movement (e.g., dynamic pan, slow zoom, cinematic tracking).
2. Lighting (e.g., volumetric lighting, golden hour, neon cinematic).
3. Subject detail (texture, color, action).
4. Atmosphere/mood (energetic, luxurious, minimalist).
5. Story flow: if a storyboard is provided, make the prompt describe its scene order and transitions.
6. Voice sync: if a voice script is provided, instruct the video model to have the subject/talent lip-sync or move in step with the script's length and tone of delivery.

Output ONLY the video prompt text, in English, highly technical and descriptive, for the best visual result.";

/// Storyboard used when the user left it blank.
pub const DEFAULT_STORYBOARD: &str =
    "Show the product cinematically with a focus on detail.";

/// Voice script placeholder used when the user left it blank.
pub const DEFAULT_VOICE_SCRIPT: &str = "No specific dialogue.";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Builds the user message from the ad configuration.
pub fn user_prompt(config: &PromptConfig) -> String {
    format!(
        "Write a promotional video prompt for the following product:
Product Name: {product}
Target Audience: {audience}
Visual Style: {style}
Tone: {tone}
Target Duration: {duration}

Storyboard / Scene Flow:
{storyboard}

Voice Script (Dialogue/Narration):
{voice}

Use every attached image as visual reference:
- Mood/Reference images: set the color tone and visual composition.
- Talent images: photos of the cast who must appear naturally.
- Product images: details of the item being promoted.",
        product = config.product_name,
        audience = config.target_audience,
        style = config.style,
        tone = config.tone,
        duration = config.normalized_duration(),
        storyboard = or_default(&config.storyboard, DEFAULT_STORYBOARD),
        voice = or_default(&config.voice_script, DEFAULT_VOICE_SCRIPT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_fields() {
        let config = PromptConfig::new("Kopi Senja")
            .with_target_audience("Gen Z")
            .with_duration("10 detik")
            .with_storyboard("pour shot then sip")
            .with_voice_script("Senja in every sip.");
        let text = user_prompt(&config);

        assert!(text.contains("Product Name: Kopi Senja"));
        assert!(text.contains("Target Audience: Gen Z"));
        assert!(text.contains("Visual Style: Cinematic High-End"));
        assert!(text.contains("Tone: Professional"));
        assert!(text.contains("Target Duration: 10 seconds"));
        assert!(text.contains("pour shot then sip"));
        assert!(text.contains("Senja in every sip."));
        assert!(!text.contains(DEFAULT_STORYBOARD));
    }

    #[test]
    fn test_user_prompt_defaults_for_blank_fields() {
        let text = user_prompt(&PromptConfig::new("Kopi Senja"));
        assert!(text.contains(DEFAULT_STORYBOARD));
        assert!(text.contains(DEFAULT_VOICE_SCRIPT));
    }
}
