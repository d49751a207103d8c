//! Veo REST wire format (Gemini Developer API).

use crate::assets::ImageAsset;
use crate::config::AspectRatio;
use crate::error::AdGeniusError;
use crate::google;
use crate::video::types::{VeoModel, VideoRequest};
use serde::{Deserialize, Serialize};

/// Resolution requested for every video.
pub const RESOLUTION: &str = "720p";

/// Maximum number of asset reference images Veo accepts.
pub const MAX_REFERENCE_IMAGES: usize = 3;

/// Reference type tag for asset references.
pub const REFERENCE_TYPE_ASSET: &str = "asset";

/// Body of a `predictLongRunning` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoRequest {
    /// Exactly one instance.
    pub instances: Vec<VeoInstance>,
    /// Generation parameters.
    pub parameters: VeoParameters,
}

/// Inline data wrapper (`{"inlineData": {"mimeType": "...", "data": "..."}}`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoInlineData {
    /// MIME type of the payload.
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

/// Media payload wrapping `inlineData`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoMediaData {
    /// The inline payload.
    pub inline_data: VeoInlineData,
}

impl VeoMediaData {
    fn from_asset(asset: &ImageAsset) -> Self {
        Self {
            inline_data: VeoInlineData {
                mime_type: asset.mime_type(),
                data: asset.base64_payload().to_string(),
            },
        }
    }
}

/// A reference image entry for `parameters.referenceImages[]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoReferenceImage {
    /// The image.
    pub image: VeoMediaData,
    /// Always `"asset"`.
    pub reference_type: String,
}

/// The prompt and optional start image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoInstance {
    /// Video prompt.
    pub prompt: String,
    /// Single embedded image, used when exactly one image was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<VeoMediaData>,
}

/// Generation parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoParameters {
    /// "16:9" or "9:16".
    pub aspect_ratio: String,
    /// Always [`RESOLUTION`].
    pub resolution: String,
    /// Always 1.
    pub number_of_videos: u32,
    /// Asset references, used when more than one image was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<VeoReferenceImage>>,
}

impl VeoRequest {
    /// Builds the wire request and picks the model variant.
    ///
    /// One image becomes the instance image. Several images become up to
    /// [`MAX_REFERENCE_IMAGES`] asset references on the multi-reference
    /// model, which only accepts 16:9.
    pub fn from_request(req: &VideoRequest) -> (VeoModel, Self) {
        let model = VeoModel::for_image_count(req.images.len());
        let multi_reference = model == VeoModel::Veo31Preview;

        let image = match req.images.as_slice() {
            [only] => Some(VeoMediaData::from_asset(only)),
            _ => None,
        };

        let reference_images = multi_reference.then(|| {
            req.images
                .iter()
                .take(MAX_REFERENCE_IMAGES)
                .map(|asset| VeoReferenceImage {
                    image: VeoMediaData::from_asset(asset),
                    reference_type: REFERENCE_TYPE_ASSET.to_string(),
                })
                .collect()
        });

        let aspect_ratio = if multi_reference {
            AspectRatio::Landscape
        } else {
            req.aspect_ratio
        };

        let body = Self {
            instances: vec![VeoInstance {
                prompt: req.prompt.clone(),
                image,
            }],
            parameters: VeoParameters {
                aspect_ratio: aspect_ratio.as_str().to_string(),
                resolution: RESOLUTION.to_string(),
                number_of_videos: 1,
                reference_images,
            },
        };
        (model, body)
    }
}

/// A long-running operation as returned by submit and status calls.
#[derive(Debug, Clone, Deserialize)]
pub struct VeoOperation {
    /// Operation handle, e.g. `models/veo.../operations/abc`.
    pub name: String,
    /// True once the job finished, successfully or not.
    #[serde(default)]
    pub done: Option<bool>,
    /// Result payload on success.
    #[serde(default)]
    pub response: Option<VeoVideoResponse>,
    /// Failure payload.
    #[serde(default)]
    pub error: Option<VeoOperationError>,
}

/// Operation result payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoVideoResponse {
    /// Generated samples wrapper.
    #[serde(default)]
    pub generate_video_response: Option<VeoGenerateVideoResponse>,
}

/// Generated samples and safety filtering info.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoGenerateVideoResponse {
    /// Generated videos.
    #[serde(default)]
    pub generated_samples: Option<Vec<VeoGeneratedSample>>,
    /// Number of outputs removed by safety filters.
    #[serde(default)]
    pub rai_media_filtered_count: Option<u32>,
}

/// One generated video.
#[derive(Debug, Clone, Deserialize)]
pub struct VeoGeneratedSample {
    /// Video location.
    #[serde(default)]
    pub video: Option<VeoVideo>,
}

/// Video location.
#[derive(Debug, Clone, Deserialize)]
pub struct VeoVideo {
    /// Download URI.
    #[serde(default)]
    pub uri: Option<String>,
}

/// `google.rpc.Status` of a failed operation.
#[derive(Debug, Clone, Deserialize)]
pub struct VeoOperationError {
    /// `google.rpc.Code` value.
    #[serde(default)]
    pub code: Option<i32>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Where an operation stands after a status check.
#[derive(Debug)]
pub enum OperationState {
    /// Still running.
    Pending,
    /// Finished with a download URI.
    Done(String),
    /// Finished (or aborted) with an error.
    Failed(AdGeniusError),
}

impl VeoOperation {
    /// Returns true if the operation has finished.
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// Classifies this operation, consuming it.
    pub fn into_state(self) -> OperationState {
        if let Some(err) = self.error {
            return OperationState::Failed(google::operation_error(err.code, err.message));
        }
        if !self.done.unwrap_or(false) {
            return OperationState::Pending;
        }

        let gen_resp = self.response.and_then(|r| r.generate_video_response);
        let Some(gen_resp) = gen_resp else {
            return OperationState::Failed(AdGeniusError::VideoNotFound);
        };

        if gen_resp.rai_media_filtered_count.unwrap_or(0) > 0
            && gen_resp
                .generated_samples
                .as_ref()
                .is_none_or(|s| s.is_empty())
        {
            return OperationState::Failed(AdGeniusError::ContentBlocked(
                "Video was filtered by Veo safety filters".into(),
            ));
        }

        gen_resp
            .generated_samples
            .and_then(|samples| samples.into_iter().next())
            .and_then(|sample| sample.video)
            .and_then(|video| video.uri)
            .map(OperationState::Done)
            .unwrap_or(OperationState::Failed(AdGeniusError::VideoNotFound))
    }
}
