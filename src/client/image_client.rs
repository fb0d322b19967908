use async_trait::async_trait;
use reqwest::Client;

use crate::{
    client::{error_from_response, ImageGenerator},
    config::ImageResponseFormat,
    error::{ArtboxError, Result},
    models::{ImageGenerationRequest, ImageGenerationResponse},
};

#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    size: String,
    format: ImageResponseFormat,
}

impl ImageClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        size: impl Into<String>,
        format: ImageResponseFormat,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            size: size.into(),
            format,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    pub fn build_request(&self, prompt: &str) -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            size: self.size.clone(),
            n: 1,
            response_format: self.format.as_str().to_string(),
        }
    }
}

/// Turns the first returned image into a retrievable URL. Inline base64
/// images become `data:` URLs.
pub fn extract_image_url(response: ImageGenerationResponse) -> Result<String> {
    let image = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ArtboxError::Response("No images generated".into()))?;

    if let Some(revised) = &image.revised_prompt {
        log::debug!("Image service revised the prompt to: {}", revised);
    }

    match (image.url, image.b64_json) {
        (Some(url), _) if !url.is_empty() => Ok(url),
        (_, Some(b64)) if !b64.is_empty() => Ok(format!("data:image/png;base64,{}", b64)),
        _ => Err(ArtboxError::Response(
            "image entry carries neither url nor b64_json".into(),
        )),
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);

        log::info!("Generating image with model: {} ({})", self.model, self.size);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Image generation transport failure: {}", e);
                ArtboxError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: ImageGenerationResponse = response.json().await?;
        extract_image_url(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageData;

    #[test]
    fn test_request_uses_fixed_size_and_count() {
        let client = ImageClient::new(
            Client::new(),
            "https://api.openai.com/v1",
            "sk-test",
            "dall-e-2",
            "1024x1024",
            ImageResponseFormat::Url,
        );
        let request = client.build_request("a cat under a starry sky");
        assert_eq!(request.model, "dall-e-2");
        assert_eq!(request.size, "1024x1024");
        assert_eq!(request.n, 1);
        assert_eq!(request.response_format, "url");
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/images/generations");
    }

    #[test]
    fn test_extract_prefers_url_then_inline() {
        let with_url = ImageGenerationResponse {
            data: vec![ImageData {
                url: Some("https://example/img.png".into()),
                b64_json: None,
                revised_prompt: None,
            }],
        };
        assert_eq!(extract_image_url(with_url).unwrap(), "https://example/img.png");

        let inline = ImageGenerationResponse {
            data: vec![ImageData {
                url: None,
                b64_json: Some("iVBORw0KGgo=".into()),
                revised_prompt: None,
            }],
        };
        assert_eq!(
            extract_image_url(inline).unwrap(),
            "data:image/png;base64,iVBORw0KGgo="
        );

        let empty = ImageGenerationResponse { data: vec![] };
        assert!(matches!(extract_image_url(empty), Err(ArtboxError::Response(_))));
    }
}
