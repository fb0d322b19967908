use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;

use crate::{
    client::{error_from_response, ImageFetcher},
    error::{ArtboxError, Result},
};

/// Retrieves generated image bytes with a plain GET. No auth header: the
/// returned URLs are pre-signed.
#[derive(Clone)]
pub struct DownloadClient {
    http: Client,
}

impl DownloadClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ArtboxError::Response("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ArtboxError::Response("data URL has no payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(ArtboxError::Response(format!(
            "unsupported data URL encoding: {}",
            header
        )));
    }
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ArtboxError::Response(format!("invalid base64 image: {}", e)))
}

#[async_trait]
impl ImageFetcher for DownloadClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }

        log::debug!("Fetching image bytes from {}", url);

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response.bytes().await?;
        log::info!("Fetched {} image bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        let bytes = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_non_base64_data_url() {
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("https://example/img.png").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[tokio::test]
    async fn test_fetch_inline_image_without_network() {
        let client = DownloadClient::new(Client::new());
        let bytes = client.fetch("data:image/png;base64,aGVsbG8=").await.unwrap();
        assert_eq!(bytes, b"hello");
    }
}
