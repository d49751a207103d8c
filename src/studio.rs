//! The studio session: form state plus the prompt and video flows.

use crate::assets::{ImageAsset, ImageRole, ReferenceImages};
use crate::config::{AspectRatio, PromptConfig};
use crate::credential::{CredentialProvider, EnvCredentials};
use crate::error::{AdGeniusError, Result};
use crate::history::{FileStorage, HistoryEntry, HistoryStore, MemoryStorage, Storage};
use crate::progress::{ProgressTicker, VideoState, COMPLETION_HOLD};
use crate::prompt::{GeminiPromptProvider, PromptProvider, PromptRequest};
use crate::settings::Settings;
use crate::video::{VeoProvider, VideoProvider, VideoRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`Studio`].
#[derive(Default)]
pub struct StudioBuilder {
    prompt_provider: Option<Arc<dyn PromptProvider>>,
    video_provider: Option<Arc<dyn VideoProvider>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    storage: Option<Arc<dyn Storage>>,
    video_dir: Option<PathBuf>,
    completion_hold: Option<Duration>,
}

impl StudioBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prompt writer.
    pub fn prompt_provider(mut self, provider: Arc<dyn PromptProvider>) -> Self {
        self.prompt_provider = Some(provider);
        self
    }

    /// Sets the video generator.
    pub fn video_provider(mut self, provider: Arc<dyn VideoProvider>) -> Self {
        self.video_provider = Some(provider);
        self
    }

    /// Sets the credential capability. Defaults to [`EnvCredentials`].
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets history storage. Defaults to in-memory.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets where videos are written. Defaults to `./videos`.
    pub fn video_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.video_dir = Some(dir.into());
        self
    }

    /// Sets how long the completed progress state is held.
    pub fn completion_hold(mut self, hold: Duration) -> Self {
        self.completion_hold = Some(hold);
        self
    }

    /// Loads history, checks the credential and returns the session.
    pub async fn build(self) -> Result<Studio> {
        let prompt_provider = self
            .prompt_provider
            .ok_or_else(|| AdGeniusError::InvalidRequest("prompt provider is required".into()))?;
        let video_provider = self
            .video_provider
            .ok_or_else(|| AdGeniusError::InvalidRequest("video provider is required".into()))?;
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(EnvCredentials));
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        let has_credential = match credentials.has_credential().await {
            Ok(selected) => selected,
            Err(e) => {
                tracing::warn!(error = %e, "credential check failed");
                false
            }
        };

        Ok(Studio {
            prompt_provider,
            video_provider,
            credentials,
            history: HistoryStore::load(storage),
            video_dir: self.video_dir.unwrap_or_else(|| PathBuf::from("videos")),
            completion_hold: self.completion_hold.unwrap_or(COMPLETION_HOLD),
            config: PromptConfig::default(),
            images: ReferenceImages::new(),
            prompt: None,
            aspect_ratio: AspectRatio::default(),
            has_credential,
            video_state: VideoState::default(),
        })
    }
}

/// One user session.
///
/// Generation methods take `&mut self`, so a session never runs two
/// generations at once.
pub struct Studio {
    prompt_provider: Arc<dyn PromptProvider>,
    video_provider: Arc<dyn VideoProvider>,
    credentials: Arc<dyn CredentialProvider>,
    history: HistoryStore,
    video_dir: PathBuf,
    completion_hold: Duration,
    config: PromptConfig,
    images: ReferenceImages,
    prompt: Option<String>,
    aspect_ratio: AspectRatio,
    has_credential: bool,
    video_state: VideoState,
}

impl Studio {
    /// Creates a new `StudioBuilder`.
    pub fn builder() -> StudioBuilder {
        StudioBuilder::new()
    }

    /// Wires Gemini, Veo, env credentials and file history from settings.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let mut prompt = GeminiPromptProvider::builder();
        let mut video = VeoProvider::builder().poll_interval(settings.poll_interval);
        if let Some(key) = &settings.api_key {
            prompt = prompt.api_key(key.clone());
            video = video.api_key(key.clone());
        }

        Self::builder()
            .prompt_provider(Arc::new(prompt.build()?))
            .video_provider(Arc::new(video.build()?))
            .storage(Arc::new(FileStorage::new(&settings.data_dir)))
            .video_dir(settings.video_dir())
            .build()
            .await
    }

    /// Current configuration.
    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    /// Mutable configuration.
    pub fn config_mut(&mut self) -> &mut PromptConfig {
        &mut self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: PromptConfig) {
        self.config = config;
    }

    /// Current reference images.
    pub fn images(&self) -> &ReferenceImages {
        &self.images
    }

    /// Adds a reference image.
    pub fn add_image(&mut self, image: ImageAsset) {
        self.images.add(image);
    }

    /// Removes a reference image.
    pub fn remove_image(&mut self, role: ImageRole, index: usize) -> Option<ImageAsset> {
        self.images.remove(role, index)
    }

    /// The generated (or user-supplied) prompt.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Uses a prompt without calling the text model.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = Some(prompt.into());
    }

    /// Selected aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Selects the aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// Whether a credential is selected.
    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Progress of the current (or last) video generation.
    pub fn video_state(&self) -> &VideoState {
        &self.video_state
    }

    /// Past generations, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    /// Directory videos are written to.
    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    /// Asks the host to select a credential.
    pub async fn select_credential(&mut self) -> Result<()> {
        self.credentials.select_credential().await?;
        self.has_credential = true;
        Ok(())
    }

    /// Writes a video prompt from the current configuration and images.
    pub async fn generate_prompt(&mut self) -> Result<&str> {
        if !self.config.has_product_name() {
            return Err(AdGeniusError::Validation(
                "Please enter a product name".into(),
            ));
        }

        let request = PromptRequest::new(self.config.clone(), self.images.clone());
        let prompt = self.prompt_provider.generate(&request).await?;
        tracing::info!(
            product = %self.config.product_name,
            provider = self.prompt_provider.name(),
            "video prompt ready"
        );
        Ok(self.prompt.insert(prompt).as_str())
    }

    /// Generates a video from the current prompt and records it.
    ///
    /// `on_progress` receives cosmetic progress updates until the attempt
    /// ends. Failed attempts are not recorded.
    pub async fn create_video(
        &mut self,
        mut on_progress: impl FnMut(&VideoState),
    ) -> Result<HistoryEntry> {
        if !self.has_credential {
            self.select_credential().await?;
        }

        let prompt = self
            .prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AdGeniusError::Validation("Generate a prompt first".into()))?;

        let images = self.images.clone();
        let request = VideoRequest::new(prompt.clone())
            .with_images(&images)
            .with_aspect_ratio(self.aspect_ratio);
        let provider = Arc::clone(&self.video_provider);

        let state = &mut self.video_state;
        let mut report = |s: &VideoState| {
            state.clone_from(s);
            on_progress(s);
        };

        let mut ticker = ProgressTicker::new();
        let result = ticker
            .run(async move { provider.generate(&request).await }, &mut report)
            .await;

        let result = result.and_then(|video| {
            let mut entry = HistoryEntry::completed(&self.config.product_name, prompt);
            let path = self.video_dir.join(format!("{}.mp4", entry.id));
            video.save(&path)?;

            entry.storyboard = non_empty(&self.config.storyboard);
            entry.voice_script = non_empty(&self.config.voice_script);
            entry.reference_images = images.data_uris(ImageRole::Mood);
            entry.talent_images = images.data_uris(ImageRole::Talent);
            entry.product_images = images.data_uris(ImageRole::Product);
            entry.video_url = Some(path.display().to_string());
            if let Err(e) = self.history.record(entry.clone()) {
                if let Err(rm) = std::fs::remove_file(&path) {
                    tracing::warn!(path = %path.display(), error = %rm, "failed to remove video");
                }
                return Err(e);
            }

            tracing::info!(
                id = %entry.id,
                path = %path.display(),
                size_bytes = video.size(),
                model = video.metadata.model.as_deref().unwrap_or_default(),
                "video generated"
            );
            Ok(entry)
        });

        match result {
            Ok(entry) => {
                report(ticker.complete());
                tokio::time::sleep(self.completion_hold).await;
                report(ticker.finish());
                Ok(entry)
            }
            Err(e) => {
                report(ticker.finish());
                if e.is_auth_expired() {
                    tracing::warn!(error = %e, "credential expired, selection required");
                    self.has_credential = false;
                }
                Err(e)
            }
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredentials;
    use crate::history::{GenerationStatus, HISTORY_CAPACITY};
    use crate::video::{GeneratedVideo, VideoMetadata};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePrompt {
        calls: AtomicUsize,
        last: Mutex<Option<PromptRequest>>,
    }

    #[async_trait]
    impl PromptProvider for FakePrompt {
        async fn generate(&self, request: &PromptRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(format!("Cinematic ad for {}", request.config.product_name))
        }

        fn name(&self) -> &str {
            "fake"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeVideo {
        calls: AtomicUsize,
        fail_expired: bool,
        last: Mutex<Option<VideoRequest>>,
    }

    #[async_trait]
    impl VideoProvider for FakeVideo {
        async fn generate(&self, request: &VideoRequest) -> Result<GeneratedVideo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            tokio::time::sleep(Duration::from_secs(30)).await;
            if self.fail_expired {
                return Err(AdGeniusError::AuthExpired(
                    "Requested entity was not found.".into(),
                ));
            }
            Ok(GeneratedVideo::new(
                vec![1, 2, 3, 4],
                "video/mp4",
                VideoMetadata::default(),
            ))
        }

        fn name(&self) -> &str {
            "fake"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct ToggleCredentials {
        selects: AtomicUsize,
    }

    #[async_trait]
    impl CredentialProvider for ToggleCredentials {
        async fn has_credential(&self) -> Result<bool> {
            Ok(false)
        }

        async fn select_credential(&self) -> Result<()> {
            self.selects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn studio(
        prompt: Arc<FakePrompt>,
        video: Arc<FakeVideo>,
        credentials: Arc<dyn CredentialProvider>,
        dir: &Path,
    ) -> Studio {
        Studio::builder()
            .prompt_provider(prompt)
            .video_provider(video)
            .credentials(credentials)
            .video_dir(dir.join("videos"))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_product_name_skips_remote_call() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = Arc::new(FakePrompt::default());
        let mut s = studio(
            prompt.clone(),
            Arc::new(FakeVideo::default()),
            Arc::new(StaticCredentials::selected()),
            dir.path(),
        )
        .await;

        let err = s.generate_prompt().await.unwrap_err();
        assert!(matches!(err, AdGeniusError::Validation(_)));
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 0);
        assert!(s.prompt().is_none());
    }

    #[tokio::test]
    async fn test_generate_prompt_stores_text() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = Arc::new(FakePrompt::default());
        let mut s = studio(
            prompt.clone(),
            Arc::new(FakeVideo::default()),
            Arc::new(StaticCredentials::selected()),
            dir.path(),
        )
        .await;
        s.set_config(
            PromptConfig::new("Kopi Senja")
                .with_duration("10 detik")
                .with_storyboard("pour shot then sip"),
        );

        let text = s.generate_prompt().await.unwrap().to_string();
        assert_eq!(text, "Cinematic ad for Kopi Senja");
        assert_eq!(s.prompt(), Some("Cinematic ad for Kopi Senja"));

        let sent = prompt.last.lock().unwrap().clone().unwrap();
        assert!(sent.images.is_empty());
        assert_eq!(sent.config.storyboard, "pour shot then sip");
    }

    #[tokio::test]
    async fn test_create_video_requires_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let video = Arc::new(FakeVideo::default());
        let mut s = studio(
            Arc::new(FakePrompt::default()),
            video.clone(),
            Arc::new(StaticCredentials::selected()),
            dir.path(),
        )
        .await;

        let err = s.create_video(|_| {}).await.unwrap_err();
        assert!(matches!(err, AdGeniusError::Validation(_)));
        assert_eq!(video.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_selection_blocks_video() {
        let dir = tempfile::tempdir().unwrap();
        let video = Arc::new(FakeVideo::default());
        let mut s = studio(
            Arc::new(FakePrompt::default()),
            video.clone(),
            Arc::new(StaticCredentials::missing()),
            dir.path(),
        )
        .await;
        s.set_prompt("A prompt");
        assert!(!s.has_credential());

        let err = s.create_video(|_| {}).await.unwrap_err();
        assert!(matches!(err, AdGeniusError::Auth(_)));
        assert_eq!(video.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_video_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let video = Arc::new(FakeVideo::default());
        let credentials = Arc::new(ToggleCredentials::default());
        let mut s = studio(
            Arc::new(FakePrompt::default()),
            video.clone(),
            credentials.clone(),
            dir.path(),
        )
        .await;
        s.set_config(PromptConfig::new("Kopi Senja").with_storyboard("pour shot then sip"));
        s.add_image(ImageAsset::from_data_uri(ImageRole::Talent, "data:image/png;base64,VA=="));
        s.add_image(ImageAsset::from_data_uri(ImageRole::Mood, "data:image/png;base64,TQ=="));
        s.set_aspect_ratio(AspectRatio::Portrait);
        s.set_prompt("Slow pan over a coffee cup");

        let mut updates: Vec<VideoState> = Vec::new();
        let entry = s
            .create_video(|state| updates.push(state.clone()))
            .await
            .unwrap();

        assert_eq!(credentials.selects.load(Ordering::SeqCst), 1);
        assert!(s.has_credential());

        let sent = video.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.aspect_ratio, AspectRatio::Portrait);
        assert_eq!(sent.images[0].data_uri(), "data:image/png;base64,TQ==");

        assert_eq!(entry.status, GenerationStatus::Completed);
        assert_eq!(entry.prompt, "Slow pan over a coffee cup");
        assert_eq!(entry.storyboard.as_deref(), Some("pour shot then sip"));
        assert!(entry.voice_script.is_none());
        assert_eq!(entry.reference_images, vec!["data:image/png;base64,TQ==".to_string()]);
        assert_eq!(entry.talent_images, vec!["data:image/png;base64,VA==".to_string()]);
        let path = PathBuf::from(entry.video_url.clone().unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(s.history(), std::slice::from_ref(&entry));

        let first_complete = updates.iter().position(|u| u.progress == 100).unwrap();
        assert!(updates[..first_complete].iter().all(|u| u.progress <= 95));
        assert!(updates[..first_complete].len() > 1);
        let last = updates.last().unwrap();
        assert!(!last.is_generating);
        assert_eq!(last.progress, 100);
        assert_eq!(s.video_state(), last);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_expired_resets_credential_and_skips_history() {
        let dir = tempfile::tempdir().unwrap();
        let video = Arc::new(FakeVideo {
            fail_expired: true,
            ..Default::default()
        });
        let mut s = studio(
            Arc::new(FakePrompt::default()),
            video,
            Arc::new(StaticCredentials::selected()),
            dir.path(),
        )
        .await;
        s.set_config(PromptConfig::new("Kopi Senja"));
        s.set_prompt("prompt");
        assert!(s.has_credential());

        let mut last = VideoState::default();
        let err = s.create_video(|state| last = state.clone()).await.unwrap_err();

        assert!(err.is_auth_expired());
        assert!(!s.has_credential());
        assert!(s.history().is_empty());
        assert!(!last.is_generating);
        assert!(last.progress < 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_stays_bounded_across_generations() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = studio(
            Arc::new(FakePrompt::default()),
            Arc::new(FakeVideo::default()),
            Arc::new(StaticCredentials::selected()),
            dir.path(),
        )
        .await;
        s.set_config(PromptConfig::new("Kopi Senja"));

        for n in 0..(HISTORY_CAPACITY + 2) {
            s.set_prompt(format!("prompt {n}"));
            s.create_video(|_| {}).await.unwrap();
        }

        assert_eq!(s.history().len(), HISTORY_CAPACITY);
        assert_eq!(s.history()[0].prompt, format!("prompt {}", HISTORY_CAPACITY + 1));
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_write_failure_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let video_dir = dir.path().join("videos");
        let mut s = Studio::builder()
            .prompt_provider(Arc::new(FakePrompt::default()))
            .video_provider(Arc::new(FakeVideo::default()))
            .credentials(Arc::new(StaticCredentials::selected()))
            .storage(Arc::new(FailingStorage))
            .video_dir(&video_dir)
            .build()
            .await
            .unwrap();
        s.set_config(PromptConfig::new("Kopi Senja"));
        s.set_prompt("prompt");

        let mut last = VideoState::default();
        let err = s.create_video(|state| last = state.clone()).await.unwrap_err();

        assert!(matches!(err, AdGeniusError::Io(_)));
        assert!(s.history().is_empty());
        let files = std::fs::read_dir(&video_dir).map(|d| d.count()).unwrap_or(0);
        assert_eq!(files, 0);
        assert!(!last.is_generating);
        assert!(last.progress < 100);
    }
}
