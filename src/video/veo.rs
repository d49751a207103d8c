//! Veo (Google) video generation provider.

use crate::error::{AdGeniusError, Result};
use crate::google::{self, API_KEY_HEADER, DEFAULT_BASE_URL};
use crate::video::provider::VideoProvider;
use crate::video::types::{GeneratedVideo, VeoModel, VideoMetadata, VideoRequest};
use crate::video::wire::{OperationState, VeoOperation, VeoRequest, RESOLUTION};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Delay between operation status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

/// Remote calls the Veo provider makes.
#[async_trait]
pub trait VeoApi: Send + Sync {
    /// Starts a generation job and returns its operation.
    async fn submit(&self, model: VeoModel, request: &VeoRequest) -> Result<VeoOperation>;

    /// Re-reads an operation by name.
    async fn fetch_operation(&self, name: &str) -> Result<VeoOperation>;

    /// Downloads a finished video.
    async fn download(&self, uri: &str) -> Result<Vec<u8>>;

    /// Checks that the model endpoint accepts our credential.
    async fn health_check(&self, model: VeoModel) -> Result<()>;
}

/// `VeoApi` over HTTPS with an API key.
pub struct HttpVeoApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpVeoApi {
    /// Creates a transport for the given key and base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Appends the key as a query parameter; the download link requires it.
    fn authenticated_url(&self, uri: &str) -> String {
        if uri.contains('?') {
            format!("{}&key={}", uri, self.api_key)
        } else {
            format!("{}?key={}", uri, self.api_key)
        }
    }

    async fn error_from(response: reqwest::Response) -> AdGeniusError {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        google::parse_error(status, &text, &headers)
    }
}

#[async_trait]
impl VeoApi for HttpVeoApi {
    async fn submit(&self, model: VeoModel, request: &VeoRequest) -> Result<VeoOperation> {
        let url = format!("{}/models/{}:predictLongRunning", self.base_url, model.as_str());

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn fetch_operation(&self, name: &str) -> Result<VeoOperation> {
        let url = format!("{}/{}", self.base_url, name);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn download(&self, uri: &str) -> Result<Vec<u8>> {
        if uri.starts_with("gs://") {
            return Err(AdGeniusError::VideoGeneration(format!(
                "Veo returned a Google Cloud Storage URI ({}) which cannot be downloaded with an API key",
                uri
            )));
        }

        // The URL carries the key, so it is stripped from transport errors.
        let response = self
            .client
            .get(self.authenticated_url(uri))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let bytes = response.bytes().await.map_err(reqwest::Error::without_url)?;
        Ok(bytes.to_vec())
    }

    async fn health_check(&self, model: VeoModel) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, model.as_str());

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}

/// Builder for VeoProvider.
#[derive(Clone)]
pub struct VeoProviderBuilder {
    api_key: Option<String>,
    poll_interval: Duration,
    timeout: Option<Duration>,
    base_url: String,
    api: Option<Arc<dyn VeoApi>>,
}

impl Default for VeoProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api: None,
        }
    }
}

impl VeoProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the delay between status checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds the total polling time. Unbounded by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Uses a custom transport instead of HTTPS.
    pub fn api(mut self, api: Arc<dyn VeoApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Builds the provider, resolving the API key unless a transport was given.
    pub fn build(self) -> Result<VeoProvider> {
        let api = match self.api {
            Some(api) => api,
            None => {
                let key = google::resolve_api_key(self.api_key).ok_or_else(|| {
                    AdGeniusError::Auth(
                        "GOOGLE_API_KEY not set and no API key provided".into(),
                    )
                })?;
                Arc::new(HttpVeoApi::new(key, self.base_url))
            }
        };

        Ok(VeoProvider {
            api,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
        })
    }
}

/// Veo video generation provider.
pub struct VeoProvider {
    api: Arc<dyn VeoApi>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl VeoProvider {
    /// Creates a new `VeoProviderBuilder`.
    pub fn builder() -> VeoProviderBuilder {
        VeoProviderBuilder::new()
    }

    /// Returns the delay between status checks.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Waits for an operation to finish.
    ///
    /// Returns the download URI and the number of status checks made.
    async fn wait_for_video(&self, mut operation: VeoOperation) -> Result<(String, u32)> {
        let name = operation.name.clone();
        let start = Instant::now();
        let mut checks = 0u32;

        loop {
            match operation.into_state() {
                OperationState::Done(uri) => return Ok((uri, checks)),
                OperationState::Failed(err) => return Err(err),
                OperationState::Pending => {}
            }

            if let Some(timeout) = self.timeout {
                if start.elapsed() >= timeout {
                    return Err(AdGeniusError::Timeout(timeout));
                }
            }

            tracing::debug!(
                operation = %name,
                checks,
                elapsed_secs = start.elapsed().as_secs(),
                "polling Veo video generation"
            );
            tokio::time::sleep(self.poll_interval).await;

            operation = self.api.fetch_operation(&name).await?;
            checks += 1;
        }
    }
}

#[async_trait]
impl VideoProvider for VeoProvider {
    async fn generate(&self, request: &VideoRequest) -> Result<GeneratedVideo> {
        let start = Instant::now();
        let (model, body) = VeoRequest::from_request(request);
        let aspect_ratio = body.parameters.aspect_ratio.clone();

        let operation = self.api.submit(model, &body).await?;
        tracing::debug!(
            operation = %operation.name,
            model = model.as_str(),
            images = request.images.len(),
            "submitted video generation request"
        );

        let (uri, status_checks) = self.wait_for_video(operation).await?;
        tracing::debug!(status_checks, "video generation complete");

        let data = self.api.download(&uri).await?;

        Ok(GeneratedVideo::new(
            data,
            "video/mp4",
            VideoMetadata {
                model: Some(model.as_str().to_string()),
                duration_ms: Some(start.elapsed().as_millis() as u64),
                resolution: Some(RESOLUTION.to_string()),
                aspect_ratio: Some(aspect_ratio),
                status_checks,
            },
        ))
    }

    fn name(&self) -> &str {
        "Veo (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        self.api.health_check(VeoModel::default()).await
    }
}
