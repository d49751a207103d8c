//! Core types for video generation.

use crate::assets::{ImageAsset, ReferenceImages};
use crate::config::AspectRatio;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Veo model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VeoModel {
    /// Veo 3.1 Fast Preview - text-to-video and single-image start frame.
    #[default]
    #[serde(rename = "veo-3.1-fast-generate-preview")]
    Veo31FastPreview,
    /// Veo 3.1 Preview - supports up to 3 asset reference images.
    #[serde(rename = "veo-3.1-generate-preview")]
    Veo31Preview,
}

impl VeoModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo31FastPreview => "veo-3.1-fast-generate-preview",
            Self::Veo31Preview => "veo-3.1-generate-preview",
        }
    }

    /// Picks the variant for a total number of reference images.
    pub fn for_image_count(count: usize) -> Self {
        if count > 1 {
            Self::Veo31Preview
        } else {
            Self::Veo31FastPreview
        }
    }
}

impl std::fmt::Display for VeoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about the video generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Video resolution.
    pub resolution: Option<String>,
    /// Aspect ratio actually requested.
    pub aspect_ratio: Option<String>,
    /// Number of operation status checks made.
    pub status_checks: u32,
}

/// A request to generate a video.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Reference images in mood, talent, product order.
    pub images: Vec<ImageAsset>,
    /// Caller-selected aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl VideoRequest {
    /// Creates a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Copies every image from the reference lists.
    pub fn with_images(mut self, images: &ReferenceImages) -> Self {
        self.images = images.all().into_iter().cloned().collect();
        self
    }

    /// Adds a single image.
    pub fn with_image(mut self, image: ImageAsset) -> Self {
        self.images.push(image);
        self
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }
}

/// A generated video with its data and metadata.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    /// Raw video bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g., "video/mp4").
    pub mime_type: String,
    /// Generation metadata.
    pub metadata: VideoMetadata,
}

impl GeneratedVideo {
    /// Creates a new generated video.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, metadata: VideoMetadata) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            metadata,
        }
    }

    /// Returns the size of the video data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the video to the specified path, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageRole;

    #[test]
    fn test_model_selection_by_count() {
        assert_eq!(VeoModel::for_image_count(0), VeoModel::Veo31FastPreview);
        assert_eq!(VeoModel::for_image_count(1), VeoModel::Veo31FastPreview);
        assert_eq!(VeoModel::for_image_count(2), VeoModel::Veo31Preview);
        assert_eq!(VeoModel::Veo31Preview.as_str(), "veo-3.1-generate-preview");
    }

    #[test]
    fn test_request_snapshots_images() {
        let mut images = ReferenceImages::new();
        images.add(ImageAsset::from_data_uri(ImageRole::Talent, "t"));
        images.add(ImageAsset::from_data_uri(ImageRole::Mood, "m"));

        let request = VideoRequest::new("prompt")
            .with_images(&images)
            .with_aspect_ratio(AspectRatio::Portrait);
        images.remove(ImageRole::Mood, 0);

        assert_eq!(request.images.len(), 2);
        assert_eq!(request.images[0].data_uri(), "m");
        assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos").join("1.mp4");
        let video = GeneratedVideo::new(vec![1, 2, 3], "video/mp4", VideoMetadata::default());
        video.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(video.size(), 3);
    }
}
