//! Asking the text model for style, tone, mood and viewpoint from the theme alone.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    catalog::{COLOR_TONES, MOODS, STYLES, VIEWPOINTS},
    client::TextGenerator,
    error::Result,
    models::{dedup_moods, CompletionOptions, Suggestion},
};

const STYLE_LABELS: &[&str] = &["스타일", "style"];
const TONE_LABELS: &[&str] = &["색상 톤", "색상톤", "color tone", "colour tone"];
const MOOD_LABELS: &[&str] = &["분위기", "감정", "mood"];
const VIEWPOINT_LABELS: &[&str] = &["시점", "구도", "viewpoint"];

pub fn suggestion_instruction(theme: &str, structured: bool) -> String {
    let format = if structured {
        r#"다음 키를 가진 JSON 객체 하나로만 답해줘:
{"style": "...", "color_tone": "...", "mood": ["...", "..."], "viewpoint": "..."}"#
            .to_string()
    } else {
        "다음 네 줄 형식으로만 답해줘:\n스타일: ...\n색상 톤: ...\n분위기: (쉼표로 구분)\n시점: ..."
            .to_string()
    };

    format!(
        r#"너는 그림 아이디어를 추천해 주는 도우미야.
사용자가 표현하고 싶은 주제에 가장 잘 어울리는 그림 설정을 한국어로 추천해줘.

주제: {theme}

가능하면 아래 목록에서 골라줘.
스타일: {styles}
색상 톤: {tones}
분위기: {moods}
시점: {viewpoints}

{format}
"#,
        theme = theme,
        styles = STYLES.join(", "),
        tones = COLOR_TONES.join(", "),
        moods = MOODS.join(", "),
        viewpoints = VIEWPOINTS.join(", "),
        format = format,
    )
}

/// Reads the four overrides out of a completion. A JSON object is accepted
/// first; otherwise each label takes the first line starting with it. Any
/// label that is missing resolves to an empty value.
pub fn parse_suggestion(text: &str) -> Suggestion {
    if let Some(parsed) = parse_structured(text) {
        return parsed;
    }

    Suggestion {
        style: labeled_value(text, STYLE_LABELS),
        color_tone: labeled_value(text, TONE_LABELS),
        moods: split_moods(&labeled_value(text, MOOD_LABELS)),
        viewpoint: labeled_value(text, VIEWPOINT_LABELS),
    }
}

fn labeled_value(text: &str, labels: &[&str]) -> String {
    text.lines()
        .map(strip_bullet)
        .find(|line| {
            let lower = line.to_lowercase();
            labels.iter().any(|label| lower.starts_with(label))
        })
        .map(after_first_colon)
        .unwrap_or_default()
}

fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '#') || c.is_whitespace())
}

fn after_first_colon(line: &str) -> String {
    line.find(|c: char| c == ':' || c == '：')
        .map(|idx| {
            let colon_len = line[idx..].chars().next().map_or(1, char::len_utf8);
            line[idx + colon_len..]
                .trim()
                .trim_matches('*')
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

fn split_moods(value: &str) -> Vec<String> {
    dedup_moods(value.split(|c: char| c == ',' || c == '、'))
}

fn parse_structured(text: &str) -> Option<Suggestion> {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if !trimmed.starts_with('{') {
        return None;
    }

    let value: Value = serde_json::from_str(trimmed).ok()?;
    let object = value.as_object()?;
    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let moods = match object.get("mood").or_else(|| object.get("moods")) {
        Some(Value::Array(items)) => dedup_moods(items.iter().filter_map(Value::as_str)),
        Some(Value::String(joined)) => split_moods(joined),
        _ => Vec::new(),
    };

    Some(Suggestion {
        style: field("style"),
        color_tone: field("color_tone"),
        moods,
        viewpoint: field("viewpoint"),
    })
}

/// Runs the suggestion call against a text model.
#[derive(Clone)]
pub struct Suggester {
    text: Arc<dyn TextGenerator>,
    structured: bool,
}

impl Suggester {
    pub fn new(text: Arc<dyn TextGenerator>, structured: bool) -> Self {
        Self { text, structured }
    }

    pub async fn suggest(&self, theme: &str) -> Result<Suggestion> {
        let instruction = suggestion_instruction(theme, self.structured);
        let options = if self.structured {
            CompletionOptions::json()
        } else {
            CompletionOptions::default()
        };

        let completion = self.text.complete(&instruction, options).await?;
        let suggestion = parse_suggestion(&completion);
        log::info!(
            "Suggestion for theme '{}': style='{}', tone='{}', moods={:?}, viewpoint='{}'",
            theme,
            suggestion.style,
            suggestion.color_tone,
            suggestion.moods,
            suggestion.viewpoint
        );
        Ok(suggestion)
    }
}
