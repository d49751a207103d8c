//! User-entered generation parameters.

use serde::{Deserialize, Serialize};

/// Visual styles offered to the user.
pub const STYLES: [&str; 8] = [
    "Cinematic High-End",
    "Minimalist Modern",
    "Cyberpunk Neon",
    "Vintage Film 35mm",
    "Hyper-Realistic 8K",
    "Abstract Motion Graphics",
    "Fast-Paced Action",
    "Soft Aesthetic",
];

/// Tones offered to the user.
pub const TONES: [&str; 7] = [
    "Professional",
    "Energetic",
    "Calm/Zen",
    "Luxury",
    "Friendly",
    "Urgent/Salesy",
    "Inspiring",
];

/// Preset durations in seconds. Anything else is a custom duration.
pub const DURATION_PRESETS: [u32; 4] = [5, 10, 15, 30];

/// Default target duration in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 10;

/// Normalizes a free-form duration to `"<n> seconds"`.
///
/// The first run of digits is the number (`"10 detik"` becomes
/// `"10 seconds"`, `"1"` becomes `"1 second"`). Input without digits, or
/// whose number is followed by a minute or hour unit, is returned trimmed.
pub fn normalize_duration(input: &str) -> String {
    let Some(start) = input.find(|c: char| c.is_ascii_digit()) else {
        return input.trim().to_string();
    };
    let tail = &input[start..];
    let end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    let (digits, rest) = tail.split_at(end);

    let unit: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if names_other_unit(&unit) {
        return input.trim().to_string();
    }

    match digits.trim_start_matches('0') {
        "" => "0 seconds".to_string(),
        "1" => "1 second".to_string(),
        n => format!("{n} seconds"),
    }
}

/// Minute and hour spellings (English and Indonesian).
fn names_other_unit(unit: &str) -> bool {
    matches!(unit, "m" | "h")
        || ["min", "menit", "hour", "hr", "jam"]
            .iter()
            .any(|prefix| unit.starts_with(prefix))
}

/// Advertising parameters for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    /// Product or brand name. Required for prompt generation.
    pub product_name: String,
    /// Who the ad is for.
    pub target_audience: String,
    /// Visual style, usually one of [`STYLES`].
    pub style: String,
    /// Tone, usually one of [`TONES`].
    pub tone: String,
    /// Target duration, free-form.
    pub duration: String,
    /// Scene sequence description.
    pub storyboard: String,
    /// Dialogue or narration.
    pub voice_script: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            target_audience: String::new(),
            style: STYLES[0].to_string(),
            tone: TONES[0].to_string(),
            duration: format!("{DEFAULT_DURATION_SECS} seconds"),
            storyboard: String::new(),
            voice_script: String::new(),
        }
    }
}

impl PromptConfig {
    /// Creates a config for the given product with default settings.
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    /// Sets the target audience.
    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    /// Sets the visual style.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Sets the tone.
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    /// Sets the duration (free-form).
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    /// Sets the duration from a number of seconds.
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration = normalize_duration(&secs.to_string());
        self
    }

    /// Sets the storyboard.
    pub fn with_storyboard(mut self, storyboard: impl Into<String>) -> Self {
        self.storyboard = storyboard.into();
        self
    }

    /// Sets the voice script.
    pub fn with_voice_script(mut self, script: impl Into<String>) -> Self {
        self.voice_script = script.into();
        self
    }

    /// Returns the duration normalized to `"<n> seconds"`.
    pub fn normalized_duration(&self) -> String {
        normalize_duration(&self.duration)
    }

    /// Returns true if a product name has been entered.
    pub fn has_product_name(&self) -> bool {
        !self.product_name.trim().is_empty()
    }
}

/// Output aspect ratio for generated videos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Returns the aspect ratio as the API string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_duration() {
        assert_eq!(normalize_duration("10 detik"), "10 seconds");
        assert_eq!(normalize_duration("about 45s"), "45 seconds");
        assert_eq!(normalize_duration("15"), "15 seconds");
        assert_eq!(normalize_duration("007 seconds"), "7 seconds");
        assert_eq!(normalize_duration("0"), "0 seconds");
        assert_eq!(normalize_duration("  short  "), "short");
        assert_eq!(normalize_duration(""), "");
    }

    #[test]
    fn test_normalize_duration_keeps_other_units() {
        assert_eq!(normalize_duration("2 minutes"), "2 minutes");
        assert_eq!(normalize_duration(" 1 menit "), "1 menit");
        assert_eq!(normalize_duration("1h"), "1h");
        assert_eq!(normalize_duration("1"), "1 second");
        assert_eq!(normalize_duration("30 sec"), "30 seconds");
        assert_eq!(normalize_duration("15 detik"), "15 seconds");
    }

    #[test]
    fn test_default_config() {
        let config = PromptConfig::default();
        assert_eq!(config.style, "Cinematic High-End");
        assert_eq!(config.tone, "Professional");
        assert_eq!(config.duration, "10 seconds");
        assert!(!config.has_product_name());
    }

    #[test]
    fn test_builder_methods() {
        let config = PromptConfig::new("Kopi Senja")
            .with_duration("10 detik")
            .with_storyboard("pour shot then sip")
            .with_tone("Luxury");
        assert!(config.has_product_name());
        assert_eq!(config.normalized_duration(), "10 seconds");
        assert_eq!(config.storyboard, "pour shot then sip");
        assert_eq!(config.tone, "Luxury");

        let config = config.with_duration_secs(30);
        assert_eq!(config.duration, "30 seconds");
    }

    #[test]
    fn test_blank_product_name_is_missing() {
        assert!(!PromptConfig::new("   ").has_product_name());
    }

    #[test]
    fn test_aspect_ratio_serde() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Portrait).unwrap(),
            "\"9:16\""
        );
        let ratio: AspectRatio = serde_json::from_str("\"16:9\"").unwrap();
        assert_eq!(ratio, AspectRatio::Landscape);
        assert_eq!(AspectRatio::default().to_string(), "16:9");
    }
}
