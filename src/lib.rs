pub mod catalog;
pub mod client;
pub mod composer;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;
pub mod suggestion;
pub mod translate;

pub use client::{
    DownloadClient, ImageClient, ImageFetcher, ImageGenerator, OpenAIClient, TextClient,
    TextGenerator,
};
pub use composer::PromptComposer;
pub use config::{
    Config, DownloadPolicy, FlowConfig, ImageMode, ImageResponseFormat, OpenAIConfig,
    TranslationMode,
};
pub use error::{ArtboxError, Result};
pub use models::{
    DownloadPayload, GeneratedImageRef, GeneratedPrompt, SelectionParams, Suggestion,
};
pub use studio::{RenderedResult, Studio, ViewState};
pub use suggestion::Suggester;
