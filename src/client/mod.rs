pub mod download;
pub mod image_client;
pub mod text_client;
pub mod traits;

use std::sync::Arc;

use crate::{
    config::OpenAIConfig,
    error::{ArtboxError, Result},
    models::ApiErrorBody,
};

pub use download::DownloadClient;
pub use image_client::ImageClient;
pub use text_client::TextClient;
pub use traits::{ImageFetcher, ImageGenerator, TextGenerator};

/// Text, image and download clients sharing one connection pool.
#[derive(Clone)]
pub struct OpenAIClient {
    text_client: TextClient,
    image_client: ImageClient,
    download_client: DownloadClient,
}

impl OpenAIClient {
    pub fn new(config: &OpenAIConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ArtboxError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            text_client: TextClient::new(
                http.clone(),
                &config.base_url,
                api_key.clone(),
                &config.text_model,
            ),
            image_client: ImageClient::new(
                http.clone(),
                &config.base_url,
                api_key,
                &config.image_model,
                &config.image_size,
                config.image_format,
            ),
            download_client: DownloadClient::new(http),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    /// The three service boundaries as trait objects, ready for the studio.
    pub fn into_services(
        self,
    ) -> (
        Arc<dyn TextGenerator>,
        Arc<dyn ImageGenerator>,
        Arc<dyn ImageFetcher>,
    ) {
        (
            Arc::new(self.text_client),
            Arc::new(self.image_client),
            Arc::new(self.download_client),
        )
    }
}

/// Builds an `Api` error from a non-2xx response, preferring the service's
/// own error message over the raw body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> ArtboxError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => {
            if let Some(kind) = &parsed.error.kind {
                log::debug!("Remote error type: {}", kind);
            }
            parsed.error.message
        }
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().chars().take(2000).collect(),
    };
    log::error!("Remote service returned {}: {}", status, message);
    ArtboxError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            OpenAIClient::new(&OpenAIConfig::new()),
            Err(ArtboxError::Config(_))
        ));
        let client = OpenAIClient::new(&OpenAIConfig::new().with_api_key("sk-test")).unwrap();
        assert_eq!(client.text().model(), "gpt-4o");
    }
}
