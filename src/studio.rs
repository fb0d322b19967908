//! The form's actions as plain functions over an explicit view state.
//!
//! Each handler takes the current [`ViewState`] by value and returns the next
//! one. A failed remote call only sets `error`; whatever was generated before
//! stays in place.

use std::sync::Arc;

use crate::{
    client::{ImageFetcher, ImageGenerator, OpenAIClient, TextGenerator},
    composer::PromptComposer,
    config::{DownloadPolicy, FlowConfig, ImageMode},
    error::{ArtboxError, Result},
    logger,
    models::{DownloadPayload, GeneratedImageRef, GeneratedPrompt, SelectionParams, Suggestion},
    suggestion::Suggester,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Last parameters the form was submitted with (after any suggestion).
    pub params: Option<SelectionParams>,
    pub suggestion: Option<Suggestion>,
    pub prompt: Option<GeneratedPrompt>,
    pub image: Option<GeneratedImageRef>,
    /// Image bytes kept next to `image` under [`DownloadPolicy::Cache`].
    pub download: Option<DownloadPayload>,
    pub error: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    fn cleared_error(self) -> Self {
        Self { error: None, ..self }
    }

    fn with_error(self, error: &ArtboxError) -> Self {
        Self {
            error: Some(error_message(error)),
            ..self
        }
    }

    fn with_prompt(self, prompt: String) -> Self {
        Self {
            prompt: Some(GeneratedPrompt::new(prompt)),
            image: None,
            download: None,
            ..self
        }
    }

    fn with_image(self, url: String) -> Self {
        Self {
            image: Some(GeneratedImageRef::new(url)),
            download: None,
            ..self
        }
    }
}

/// What one render pass shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedResult {
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub download: Option<DownloadPayload>,
    pub download_error: Option<String>,
    pub error: Option<String>,
}

pub fn error_message(error: &ArtboxError) -> String {
    format!("에러: {}", error)
}

#[derive(Clone)]
pub struct Studio {
    suggester: Suggester,
    composer: PromptComposer,
    images: Arc<dyn ImageGenerator>,
    fetcher: Arc<dyn ImageFetcher>,
    flow: FlowConfig,
}

impl Studio {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        fetcher: Arc<dyn ImageFetcher>,
        flow: FlowConfig,
    ) -> Self {
        Self {
            suggester: Suggester::new(text.clone(), flow.structured_suggestions),
            composer: PromptComposer::new(text, flow.translation),
            images,
            fetcher,
            flow,
        }
    }

    pub fn from_client(client: OpenAIClient, flow: FlowConfig) -> Self {
        let (text, images, fetcher) = client.into_services();
        Self::new(text, images, fetcher, flow)
    }

    pub fn flow(&self) -> &FlowConfig {
        &self.flow
    }

    /// Standalone "recommend" action: fills style, tone, moods and viewpoint
    /// of the submitted form from its theme. A failed call leaves the state
    /// as it was.
    pub async fn suggest(&self, state: ViewState, params: SelectionParams) -> ViewState {
        let state = state.cleared_error();
        if !self.flow.suggestions {
            let err = ArtboxError::InvalidState("suggestions are disabled".into());
            return state.with_error(&err);
        }

        match self.run_suggestion(&params.theme).await {
            Ok(suggestion) => ViewState {
                params: Some(suggestion.apply(params)),
                suggestion: Some(suggestion),
                ..state
            },
            Err(e) => {
                log::error!("Suggestion failed: {}", e);
                state.with_error(&e)
            }
        }
    }

    /// Form submission: optional suggestion, then the prompt, then the image
    /// when the flow generates it automatically. Params and suggestion are
    /// committed together with the prompt; any failure before that leaves
    /// the state untouched apart from the error.
    pub async fn submit(
        &self,
        state: ViewState,
        params: SelectionParams,
        auto_suggest: bool,
    ) -> ViewState {
        let state = state.cleared_error();

        let (params, suggestion) = if auto_suggest && self.flow.suggestions {
            match self.run_suggestion(&params.theme).await {
                Ok(suggestion) => (suggestion.apply(params), Some(suggestion)),
                Err(e) => {
                    log::error!("Suggestion failed: {}", e);
                    return state.with_error(&e);
                }
            }
        } else {
            (params, None)
        };

        let prompt = {
            let _timer = logger::timer("prompt composition");
            self.composer.compose(&params).await
        };
        let state = match prompt {
            Ok(prompt) => {
                log::info!("Generated prompt ({} chars)", prompt.chars().count());
                ViewState {
                    params: Some(params),
                    suggestion: suggestion.or(state.suggestion.clone()),
                    ..state
                }
                .with_prompt(prompt)
            }
            Err(e) => {
                log::error!("Prompt composition failed: {}", e);
                return state.with_error(&e);
            }
        };

        match self.flow.image_mode {
            ImageMode::Automatic => self.generate_image(state).await,
            ImageMode::OnDemand => state,
        }
    }

    /// Requests the image for the current prompt.
    pub async fn generate_image(&self, state: ViewState) -> ViewState {
        let state = state.cleared_error();
        let Some(prompt) = state.prompt.as_ref().map(|p| p.text.clone()) else {
            let err = ArtboxError::InvalidState("generate a prompt before requesting an image".into());
            return state.with_error(&err);
        };

        let result = {
            let _timer = logger::timer("image generation");
            self.images.generate(&prompt).await
        };
        match result {
            Ok(url) => {
                log::info!("Image ready");
                state.with_image(url)
            }
            Err(e) => {
                log::error!("Image generation failed: {}", e);
                state.with_error(&e)
            }
        }
    }

    /// The result presenter. Shows the prompt and image and prepares the
    /// download bytes, fetching them unless a cached copy may be reused.
    pub async fn render(&self, state: ViewState) -> (ViewState, RenderedResult) {
        let mut rendered = RenderedResult {
            prompt: state.prompt.as_ref().map(|p| p.text.clone()),
            image_url: state.image.as_ref().map(|i| i.url.clone()),
            error: state.error.clone(),
            ..Default::default()
        };

        let Some(url) = rendered.image_url.clone() else {
            return (state, rendered);
        };

        if self.flow.download_policy == DownloadPolicy::Cache {
            if let Some(cached) = &state.download {
                rendered.download = Some(cached.clone());
                return (state, rendered);
            }
        }

        match self.fetch_download(&url).await {
            Ok(payload) => {
                rendered.download = Some(payload.clone());
                let state = match self.flow.download_policy {
                    DownloadPolicy::Cache => ViewState {
                        download: Some(payload),
                        ..state
                    },
                    DownloadPolicy::Refetch => state,
                };
                (state, rendered)
            }
            Err(e) => {
                log::error!("Image download failed: {}", e);
                rendered.download_error = Some(error_message(&e));
                (state, rendered)
            }
        }
    }

    async fn run_suggestion(&self, theme: &str) -> Result<Suggestion> {
        let _timer = logger::timer("style suggestion");
        self.suggester.suggest(theme).await
    }

    async fn fetch_download(&self, url: &str) -> Result<DownloadPayload> {
        let bytes = self.fetcher.fetch(url).await?;
        Ok(DownloadPayload::png(bytes))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::TranslationMode;
    use crate::models::CompletionOptions;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted completions in order.
    pub(crate) struct ScriptedText {
        replies: Mutex<VecDeque<Result<String>>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedText {
        pub(crate) fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedText {
        async fn complete(&self, _instruction: &str, _options: CompletionOptions) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ArtboxError::Response("no scripted reply".into())))
        }
    }

    pub(crate) struct ScriptedImages {
        replies: Mutex<VecDeque<Result<String>>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedImages {
        pub(crate) fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ImageGenerator for ScriptedImages {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ArtboxError::Response("no scripted image".into())))
        }
    }

    pub(crate) struct CountingFetcher {
        pub bytes: Vec<u8>,
        pub gets: AtomicUsize,
    }

    impl CountingFetcher {
        pub(crate) fn new(bytes: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                bytes: bytes.to_vec(),
                gets: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ImageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.bytes.clone())
        }
    }

    fn params() -> SelectionParams {
        SelectionParams::new("꿈속을 걷는 느낌")
            .with_style("수채화")
            .with_elements("고양이, 별")
            .with_color_tone("따뜻한 파스텔톤")
            .with_moods(["몽환적"])
            .with_viewpoint("정면")
    }

    const PROMPT: &str = "A cat under a starry sky, watercolor, pastel tones";
    const URL: &str = "https://example/img.png";

    #[tokio::test]
    async fn test_automatic_flow_produces_prompt_and_image() {
        let text = ScriptedText::new(vec![Ok(format!("  {PROMPT}\n"))]);
        let images = ScriptedImages::new(vec![Ok(URL.to_string())]);
        let fetcher = CountingFetcher::new(b"png-bytes");
        let studio = Studio::new(text.clone(), images.clone(), fetcher, FlowConfig::new());

        let state = studio.submit(ViewState::new(), params(), false).await;
        assert_eq!(state.error, None);
        assert_eq!(state.prompt.as_ref().unwrap().text, PROMPT);
        assert_eq!(state.image.as_ref().unwrap().url, URL);
        assert_eq!(state.params, Some(params()));
        assert_eq!(text.calls.load(Ordering::SeqCst), 1);
        assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_on_demand_flow_waits_for_image_action() {
        let text = ScriptedText::new(vec![Ok(PROMPT.to_string())]);
        let images = ScriptedImages::new(vec![Ok(URL.to_string())]);
        let fetcher = CountingFetcher::new(b"png");
        let flow = FlowConfig::new().with_image_mode(ImageMode::OnDemand);
        let studio = Studio::new(text, images.clone(), fetcher, flow);

        let state = studio.submit(ViewState::new(), params(), false).await;
        assert_eq!(state.prompt.as_ref().unwrap().text, PROMPT);
        assert!(state.image.is_none());
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);

        let state = studio.generate_image(state).await;
        assert_eq!(state.image.as_ref().unwrap().url, URL);
        assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_image_failure_keeps_prompt() {
        let text = ScriptedText::new(vec![Ok(PROMPT.to_string())]);
        let images = ScriptedImages::new(vec![Err(ArtboxError::Api {
            status: 400,
            message: "content policy".into(),
        })]);
        let fetcher = CountingFetcher::new(b"png");
        let studio = Studio::new(text, images, fetcher, FlowConfig::new());

        let state = studio.submit(ViewState::new(), params(), false).await;
        assert_eq!(state.prompt.as_ref().unwrap().text, PROMPT);
        assert!(state.image.is_none());
        assert_eq!(
            state.error.as_deref(),
            Some("에러: API error (400): content policy")
        );

        let (_, rendered) = studio.render(state).await;
        assert_eq!(rendered.prompt.as_deref(), Some(PROMPT));
        assert!(rendered.image_url.is_none());
    }

    #[tokio::test]
    async fn test_prompt_failure_keeps_previous_results() {
        let text = ScriptedText::new(vec![
            Ok(PROMPT.to_string()),
            Err(ArtboxError::Transport("connection refused".into())),
        ]);
        let images = ScriptedImages::new(vec![Ok(URL.to_string())]);
        let fetcher = CountingFetcher::new(b"png");
        let studio = Studio::new(text, images.clone(), fetcher, FlowConfig::new());

        let first = studio.submit(ViewState::new(), params(), false).await;
        let second = studio.submit(first.clone(), params(), false).await;

        assert_eq!(second.prompt, first.prompt);
        assert_eq!(second.image, first.image);
        assert!(second.error.unwrap().contains("connection refused"));
        assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resubmission_overwrites_state() {
        let text = ScriptedText::new(vec![Ok("first prompt".into()), Ok("second prompt".into())]);
        let images = ScriptedImages::new(vec![
            Ok("https://example/1.png".into()),
            Ok("https://example/2.png".into()),
        ]);
        let fetcher = CountingFetcher::new(b"png");
        let studio = Studio::new(text.clone(), images.clone(), fetcher, FlowConfig::new());

        let first = studio.submit(ViewState::new(), params(), false).await;
        let (first, _) = studio.render(first).await;
        assert!(first.download.is_some());

        let second = studio.submit(first, params(), false).await;
        assert_eq!(second.prompt.as_ref().unwrap().text, "second prompt");
        assert_eq!(second.image.as_ref().unwrap().url, "https://example/2.png");
        assert!(second.download.is_none());
        assert_eq!(text.calls.load(Ordering::SeqCst), 2);
        assert_eq!(images.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refetch_policy_gets_once_per_render() {
        let text = ScriptedText::new(vec![Ok(PROMPT.to_string())]);
        let images = ScriptedImages::new(vec![Ok(URL.to_string())]);
        let fetcher = CountingFetcher::new(b"\x89PNG raw bytes");
        let flow = FlowConfig::new().with_download_policy(DownloadPolicy::Refetch);
        let studio = Studio::new(text, images, fetcher.clone(), flow);

        let state = studio.submit(ViewState::new(), params(), false).await;
        let (state, rendered) = studio.render(state).await;
        assert_eq!(fetcher.gets.load(Ordering::SeqCst), 1);
        let download = rendered.download.unwrap();
        assert_eq!(download.bytes, b"\x89PNG raw bytes");
        assert_eq!(download.file_name, "my_art_box_result.png");
        assert_eq!(download.mime, "image/png");

        let (_, _) = studio.render(state).await;
        assert_eq!(fetcher.gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_policy_fetches_once() {
        let text = ScriptedText::new(vec![Ok(PROMPT.to_string())]);
        let images = ScriptedImages::new(vec![Ok(URL.to_string())]);
        let fetcher = CountingFetcher::new(b"bytes");
        let studio = Studio::new(text, images, fetcher.clone(), FlowConfig::new());

        let state = studio.submit(ViewState::new(), params(), false).await;
        let (state, first) = studio.render(state).await;
        let (_, second) = studio.render(state).await;
        assert_eq!(fetcher.gets.load(Ordering::SeqCst), 1);
        assert_eq!(first.download, second.download);
    }

    #[tokio::test]
    async fn test_render_without_image_does_not_fetch() {
        let fetcher = CountingFetcher::new(b"bytes");
        let studio = Studio::new(
            ScriptedText::new(vec![]),
            ScriptedImages::new(vec![]),
            fetcher.clone(),
            FlowConfig::new(),
        );
        let (_, rendered) = studio.render(ViewState::new()).await;
        assert_eq!(rendered, RenderedResult::default());
        assert_eq!(fetcher.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_suggest_overrides_choices() {
        let text = ScriptedText::new(vec![
            Ok("스타일: 유화\n색상 톤: 차가운 블루\n분위기: 고요함".into()),
            Ok(PROMPT.to_string()),
        ]);
        let flow = FlowConfig::new()
            .with_suggestions(true, false)
            .with_image_mode(ImageMode::OnDemand)
            .with_translation(TranslationMode::Model);
        let studio = Studio::new(
            text.clone(),
            ScriptedImages::new(vec![]),
            CountingFetcher::new(b""),
            flow,
        );

        let state = studio.submit(ViewState::new(), params(), true).await;
        let applied = state.params.unwrap();
        assert_eq!(applied.style, "유화");
        assert_eq!(applied.color_tone, "차가운 블루");
        assert_eq!(applied.moods, vec!["고요함"]);
        assert_eq!(applied.viewpoint, "");
        assert_eq!(applied.elements, "고양이, 별");
        assert_eq!(state.prompt.unwrap().text, PROMPT);
        assert_eq!(text.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_suggestion_applies_nothing() {
        let text = ScriptedText::new(vec![Err(ArtboxError::Transport("timeout".into()))]);
        let flow = FlowConfig::new().with_suggestions(true, false);
        let studio = Studio::new(
            text.clone(),
            ScriptedImages::new(vec![]),
            CountingFetcher::new(b""),
            flow,
        );

        let state = studio.submit(ViewState::new(), params(), true).await;
        assert!(state.params.is_none());
        assert!(state.suggestion.is_none());
        assert!(state.prompt.is_none());
        assert!(state.error.is_some());
        assert_eq!(text.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prompt_failure_after_suggestion_commits_nothing() {
        let text = ScriptedText::new(vec![
            Ok(PROMPT.to_string()),
            Ok("스타일: 유화\n색상 톤: 차가운 블루\n분위기: 고요함\n시점: 측면".into()),
            Err(ArtboxError::Transport("connection reset".into())),
        ]);
        let flow = FlowConfig::new()
            .with_suggestions(true, false)
            .with_image_mode(ImageMode::OnDemand);
        let studio = Studio::new(
            text.clone(),
            ScriptedImages::new(vec![]),
            CountingFetcher::new(b""),
            flow,
        );

        let first = studio.submit(ViewState::new(), params(), false).await;
        assert_eq!(first.params, Some(params()));

        let other = SelectionParams::new("비 오는 도시").with_style("유화");
        let second = studio.submit(first.clone(), other, true).await;
        assert_eq!(second.params, first.params);
        assert_eq!(second.suggestion, first.suggestion);
        assert_eq!(second.prompt, first.prompt);
        assert!(second.error.unwrap().contains("connection reset"));
        assert_eq!(text.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_standalone_suggest_and_disabled_suggest() {
        let text = ScriptedText::new(vec![Ok("Style: cartoon\nViewpoint: 광각".into())]);
        let studio = Studio::new(
            text,
            ScriptedImages::new(vec![]),
            CountingFetcher::new(b""),
            FlowConfig::new().with_suggestions(true, false),
        );
        let form = SelectionParams::new("바다").with_elements("등대");
        let state = studio.suggest(ViewState::new(), form).await;
        let params = state.params.unwrap();
        assert_eq!(params.theme, "바다");
        assert_eq!(params.elements, "등대");
        assert_eq!(params.style, "cartoon");
        assert_eq!(params.viewpoint, "광각");
        assert!(state.suggestion.is_some());

        let disabled = Studio::new(
            ScriptedText::new(vec![]),
            ScriptedImages::new(vec![]),
            CountingFetcher::new(b""),
            FlowConfig::new(),
        );
        let state = disabled
            .suggest(ViewState::new(), SelectionParams::new("바다"))
            .await;
        assert!(state.error.is_some());
        assert!(state.params.is_none());
    }

    #[tokio::test]
    async fn test_image_without_prompt_is_rejected() {
        let images = ScriptedImages::new(vec![Ok(URL.to_string())]);
        let studio = Studio::new(
            ScriptedText::new(vec![]),
            images.clone(),
            CountingFetcher::new(b""),
            FlowConfig::new(),
        );
        let state = studio.generate_image(ViewState::new()).await;
        assert!(state.error.unwrap().contains("Invalid state"));
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);
    }
}
