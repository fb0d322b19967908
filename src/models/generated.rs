use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DOWNLOAD_FILE_NAME: &str = "my_art_box_result.png";
pub const DOWNLOAD_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Where the generated image can be retrieved. Either a remote URL or a
/// `data:` URL when the service returned the image inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImageRef {
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            created_at: Utc::now(),
        }
    }
}

/// Bytes offered by the download control. Always labeled as PNG, whatever
/// the service actually encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadPayload {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME,
            mime: DOWNLOAD_MIME,
            bytes,
        }
    }
}
