//! Reference images supplied by the user.

use crate::error::{AdGeniusError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fallback MIME type when neither the data URI nor the bytes tell us.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Image formats recognized by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// WebP.
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// What a reference image depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    /// Color tone and composition reference.
    Mood,
    /// The person who should appear in the video.
    Talent,
    /// The product being advertised.
    Product,
}

impl ImageRole {
    /// All roles in request order.
    pub const ALL: [ImageRole; 3] = [Self::Mood, Self::Talent, Self::Product];
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mood => write!(f, "mood"),
            Self::Talent => write!(f, "talent"),
            Self::Product => write!(f, "product"),
        }
    }
}

/// A data-URI encoded image tagged with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    role: ImageRole,
    data_uri: String,
}

impl ImageAsset {
    /// Wraps an existing data URI (or bare base64 string).
    pub fn from_data_uri(role: ImageRole, data_uri: impl Into<String>) -> Self {
        Self {
            role,
            data_uri: data_uri.into(),
        }
    }

    /// Encodes raw image bytes as a data URI.
    pub fn from_bytes(role: ImageRole, bytes: &[u8]) -> Self {
        let mime = ImageFormat::from_magic_bytes(bytes)
            .map(|f| f.mime_type())
            .unwrap_or(DEFAULT_IMAGE_MIME);
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::from_data_uri(role, format!("data:{mime};base64,{b64}"))
    }

    /// Reads an image file.
    pub fn from_path(role: ImageRole, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(AdGeniusError::InvalidRequest(format!(
                "image file is empty: {}",
                path.display()
            )));
        }
        Ok(Self::from_bytes(role, &bytes))
    }

    /// Returns the role of this image.
    pub fn role(&self) -> ImageRole {
        self.role
    }

    /// Returns the full data URI.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Returns the base64 payload (everything after the first comma).
    pub fn base64_payload(&self) -> &str {
        match self.data_uri.split_once(',') {
            Some((_, payload)) => payload,
            None => &self.data_uri,
        }
    }

    /// Returns the MIME type: data-URI header, then magic bytes, then PNG.
    pub fn mime_type(&self) -> String {
        if let Some(mime) = self
            .data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .map(|(header, _)| header.split(';').next().unwrap_or_default())
            .filter(|m| !m.is_empty())
        {
            return mime.to_string();
        }

        // Only the first few bytes are needed for detection.
        let head: String = self.base64_payload().chars().take(24).collect();
        base64::engine::general_purpose::STANDARD
            .decode(&head)
            .ok()
            .and_then(|bytes| ImageFormat::from_magic_bytes(&bytes))
            .map(|f| f.mime_type().to_string())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
    }
}

/// Three independent ordered image lists, one per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceImages {
    mood: Vec<ImageAsset>,
    talent: Vec<ImageAsset>,
    product: Vec<ImageAsset>,
}

impl ReferenceImages {
    /// Creates empty lists.
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, role: ImageRole) -> &mut Vec<ImageAsset> {
        match role {
            ImageRole::Mood => &mut self.mood,
            ImageRole::Talent => &mut self.talent,
            ImageRole::Product => &mut self.product,
        }
    }

    /// Returns the images for one role, in upload order.
    pub fn get(&self, role: ImageRole) -> &[ImageAsset] {
        match role {
            ImageRole::Mood => &self.mood,
            ImageRole::Talent => &self.talent,
            ImageRole::Product => &self.product,
        }
    }

    /// Appends an image to the list for its role.
    pub fn add(&mut self, asset: ImageAsset) {
        self.list_mut(asset.role()).push(asset);
    }

    /// Removes the image at `index` from a role's list.
    pub fn remove(&mut self, role: ImageRole, index: usize) -> Option<ImageAsset> {
        let list = self.list_mut(role);
        (index < list.len()).then(|| list.remove(index))
    }

    /// Returns every image: mood, then talent, then product.
    pub fn all(&self) -> Vec<&ImageAsset> {
        ImageRole::ALL
            .iter()
            .flat_map(|role| self.get(*role))
            .collect()
    }

    /// Total number of images across roles.
    pub fn len(&self) -> usize {
        self.mood.len() + self.talent.len() + self.product.len()
    }

    /// Returns true when no image has been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Data URIs for one role, for history snapshots.
    pub fn data_uris(&self, role: ImageRole) -> Vec<String> {
        self.get(role)
            .iter()
            .map(|a| a.data_uri().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn test_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&JPEG), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0, 1, 2]), None);
    }

    #[test]
    fn test_from_bytes_builds_data_uri() {
        let asset = ImageAsset::from_bytes(ImageRole::Product, &JPEG);
        assert!(asset.data_uri().starts_with("data:image/jpeg;base64,"));
        assert_eq!(asset.mime_type(), "image/jpeg");
        assert_eq!(asset.role(), ImageRole::Product);

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(asset.base64_payload())
            .unwrap();
        assert_eq!(decoded, JPEG);
    }

    #[test]
    fn test_bare_base64_payload_and_mime() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(PNG);
        let asset = ImageAsset::from_data_uri(ImageRole::Mood, b64.clone());
        assert_eq!(asset.base64_payload(), b64);
        assert_eq!(asset.mime_type(), "image/png");

        let unknown = ImageAsset::from_data_uri(ImageRole::Mood, "AAECAw==");
        assert_eq!(unknown.mime_type(), DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn test_data_uri_header_wins() {
        let asset = ImageAsset::from_data_uri(ImageRole::Talent, "data:image/webp;base64,AAAA");
        assert_eq!(asset.mime_type(), "image/webp");
        assert_eq!(asset.base64_payload(), "AAAA");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, PNG).unwrap();
        let asset = ImageAsset::from_path(ImageRole::Mood, &path).unwrap();
        assert_eq!(asset.mime_type(), "image/png");

        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();
        assert!(ImageAsset::from_path(ImageRole::Mood, &empty).is_err());
    }

    #[test]
    fn test_reference_images_order_and_removal() {
        let mut images = ReferenceImages::new();
        images.add(ImageAsset::from_data_uri(ImageRole::Product, "p1"));
        images.add(ImageAsset::from_data_uri(ImageRole::Mood, "m1"));
        images.add(ImageAsset::from_data_uri(ImageRole::Talent, "t1"));
        images.add(ImageAsset::from_data_uri(ImageRole::Mood, "m2"));

        let order: Vec<&str> = images.all().iter().map(|a| a.data_uri()).collect();
        assert_eq!(order, vec!["m1", "m2", "t1", "p1"]);
        assert_eq!(images.len(), 4);

        let removed = images.remove(ImageRole::Mood, 0).unwrap();
        assert_eq!(removed.data_uri(), "m1");
        assert!(images.remove(ImageRole::Mood, 5).is_none());
        assert_eq!(images.data_uris(ImageRole::Mood), vec!["m2".to_string()]);
        assert!(!images.is_empty());
    }
}
