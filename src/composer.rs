use std::sync::Arc;

use crate::{
    client::TextGenerator,
    config::TranslationMode,
    error::{ArtboxError, Result},
    models::{CompletionOptions, SelectionParams},
    translate::translate_params,
};

/// Renders the fixed image-prompt instruction.
pub fn compose_instruction(params: &SelectionParams) -> String {
    format!(
        r#"
You are an assistant that generates an image prompt and creates an image using DALL·E 3.
User wants to express a theme through visual art.
Generate a vivid English image prompt based on the user's choices.

Theme: {theme}
Style: {style}
Elements: {elements}
Color tone: {color_tone}
Mood: {moods}
Viewpoint: {viewpoint}

Return ONLY the image description in English that can be used for DALL·E 3.
"#,
        theme = params.theme,
        style = params.style,
        elements = params.elements,
        color_tone = params.color_tone,
        moods = params.moods_joined(),
        viewpoint = params.viewpoint,
    )
}

#[derive(Clone)]
pub struct PromptComposer {
    text: Arc<dyn TextGenerator>,
    translation: TranslationMode,
}

impl PromptComposer {
    pub fn new(text: Arc<dyn TextGenerator>, translation: TranslationMode) -> Self {
        Self { text, translation }
    }

    /// Returns the model's description with surrounding whitespace removed
    /// and nothing else changed.
    pub async fn compose(&self, params: &SelectionParams) -> Result<String> {
        let instruction = match self.translation {
            TranslationMode::Dictionary => compose_instruction(&translate_params(params)),
            TranslationMode::Model => compose_instruction(params),
        };

        let completion = self
            .text
            .complete(&instruction, CompletionOptions::default())
            .await?;
        let prompt = completion.trim();
        if prompt.is_empty() {
            return Err(ArtboxError::Response("the model returned an empty prompt".into()));
        }
        Ok(prompt.to_string())
    }
}
