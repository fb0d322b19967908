use serde::{Deserialize, Serialize};

/// The artistic choices collected by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionParams {
    pub theme: String,
    pub style: String,
    pub elements: String,
    pub color_tone: String,
    pub moods: Vec<String>,
    pub viewpoint: String,
}

impl SelectionParams {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_elements(mut self, elements: impl Into<String>) -> Self {
        self.elements = elements.into();
        self
    }

    pub fn with_color_tone(mut self, color_tone: impl Into<String>) -> Self {
        self.color_tone = color_tone.into();
        self
    }

    pub fn with_moods<I, S>(mut self, moods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moods = dedup_moods(moods);
        self
    }

    pub fn with_viewpoint(mut self, viewpoint: impl Into<String>) -> Self {
        self.viewpoint = viewpoint.into();
        self
    }

    pub fn moods_joined(&self) -> String {
        self.moods.join(", ")
    }
}

/// Keeps first-seen order, drops blanks and repeats.
pub fn dedup_moods<I, S>(moods: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for mood in moods {
        let mood = mood.into().trim().to_string();
        if !mood.is_empty() && !out.contains(&mood) {
            out.push(mood);
        }
    }
    out
}

/// Overrides proposed by the model from the theme alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub style: String,
    pub color_tone: String,
    pub moods: Vec<String>,
    pub viewpoint: String,
}

impl Suggestion {
    /// Replaces style, tone, moods and viewpoint wholesale. Theme and elements stay.
    pub fn apply(&self, params: SelectionParams) -> SelectionParams {
        SelectionParams {
            style: self.style.clone(),
            color_tone: self.color_tone.clone(),
            moods: self.moods.clone(),
            viewpoint: self.viewpoint.clone(),
            ..params
        }
    }
}
