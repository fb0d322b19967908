use async_trait::async_trait;
use reqwest::Client;

use crate::{
    client::{error_from_response, TextGenerator},
    error::{ArtboxError, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionOptions, ResponseFormat},
};

#[derive(Clone)]
pub struct TextClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl TextClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn build_request(&self, instruction: &str, options: &CompletionOptions) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(instruction)],
            response_format: options.json_object.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }
}

/// Pulls the first choice's content out of a completion.
pub fn extract_completion(response: ChatCompletionResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ArtboxError::Response("completion has no choices".into()))?;

    if let Some(reason) = &choice.finish_reason {
        log::debug!("Completion finish reason: {}", reason);
    }

    choice
        .message
        .content
        .ok_or_else(|| ArtboxError::Response("completion has no message content".into()))
}

#[async_trait]
impl TextGenerator for TextClient {
    async fn complete(&self, instruction: &str, options: CompletionOptions) -> Result<String> {
        let request = self.build_request(instruction, &options);

        log::info!("Invoking text model: {}", self.model);
        log::debug!("Text generation instruction: {}", instruction);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Text generation transport failure: {}", e);
                ArtboxError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: ChatCompletionResponse = response.json().await?;
        if let Some(model) = &body.model {
            log::debug!("Completion served by {}", model);
        }
        extract_completion(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatChoice, ChatChoiceMessage};

    fn client() -> TextClient {
        TextClient::new(Client::new(), "https://api.openai.com/v1/", "sk-test", "gpt-4o")
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(client().endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_json_mode_sets_response_format() {
        let request = client().build_request("hi", &CompletionOptions::json());
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(
            request.response_format.map(|f| f.kind),
            Some("json_object".to_string())
        );
        assert!(client()
            .build_request("hi", &CompletionOptions::default())
            .response_format
            .is_none());
    }

    #[test]
    fn test_extract_completion() {
        let response = ChatCompletionResponse {
            model: None,
            choices: vec![ChatChoice {
                message: ChatChoiceMessage {
                    content: Some("  a lighthouse at dusk ".into()),
                },
                finish_reason: Some("stop".into()),
            }],
        };
        assert_eq!(extract_completion(response).unwrap(), "  a lighthouse at dusk ");

        let empty = ChatCompletionResponse {
            model: None,
            choices: vec![],
        };
        assert!(matches!(
            extract_completion(empty),
            Err(ArtboxError::Response(_))
        ));
    }
}
