use async_trait::async_trait;

use crate::{error::Result, models::CompletionOptions};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one user instruction and returns the raw completion text.
    async fn complete(&self, instruction: &str, options: CompletionOptions) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Renders one image for `prompt` and returns where it can be retrieved.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
