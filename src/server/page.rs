//! The single HTML page: the form on the left, results on the right.

use crate::{
    catalog::{COLOR_TONES, DEFAULT_MOODS, MOODS, STYLES, VIEWPOINTS},
    config::{FlowConfig, ImageMode},
    models::SelectionParams,
    studio::RenderedResult,
};

pub const TITLE: &str = "나의 그림상자 - AI와 함께 콜라주 만들기";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select(name: &str, label: &str, options: &[&str], selected: &str) -> String {
    let mut html = format!("<label>{}<select name=\"{}\">", label, name);
    for option in options {
        let marker = if *option == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option{}>{}</option>",
            marker,
            escape_html(option)
        ));
    }
    // a suggested value outside the catalog still has to round-trip
    if !selected.is_empty() && !options.contains(&selected) {
        html.push_str(&format!(
            "<option selected>{}</option>",
            escape_html(selected)
        ));
    }
    html.push_str("</select></label>");
    html
}

fn mood_checkboxes(selected: &[String]) -> String {
    let mut html = String::from("<fieldset><legend>💫 감정 / 분위기</legend>");
    let extra = selected.iter().filter(|m| !MOODS.contains(&m.as_str()));
    for mood in MOODS.iter().copied().chain(extra.map(String::as_str)) {
        let checked = if selected.iter().any(|m| m == mood) { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"mood\" value=\"{0}\"{1}>{0}</label>",
            escape_html(mood),
            checked
        ));
    }
    html.push_str("</fieldset>");
    html
}

fn form(params: &SelectionParams, flow: &FlowConfig) -> String {
    let submit_label = match flow.image_mode {
        ImageMode::Automatic => "✨ 프롬프트 및 이미지 생성",
        ImageMode::OnDemand => "✨ 프롬프트 생성",
    };
    let auto_suggest = if flow.suggestions {
        "<label><input type=\"checkbox\" name=\"auto_suggest\" value=\"on\">🤖 AI 스타일 추천 사용</label>"
    } else {
        ""
    };
    let suggest_button = if flow.suggestions {
        "<button formaction=\"/suggest\">🤖 추천 받기</button>"
    } else {
        ""
    };

    format!(
        r#"<form method="post" action="/prompt">
<label>🎯 주제<input name="theme" placeholder="예: 꿈속을 걷는 느낌" value="{theme}"></label>
{style}
<label>🌟 포함할 요소들<input name="elements" placeholder="예: 고양이, 우산, 별, 밤하늘" value="{elements}"></label>
{tone}
{moods}
{viewpoint}
{auto_suggest}
{suggest_button}
<button type="submit">{submit_label}</button>
</form>"#,
        theme = escape_html(&params.theme),
        style = select("style", "🖌️ 스타일", STYLES, &params.style),
        elements = escape_html(&params.elements),
        tone = select("color_tone", "🎨 색상 톤", COLOR_TONES, &params.color_tone),
        moods = mood_checkboxes(&params.moods),
        viewpoint = select("viewpoint", "📷 시점 / 구도", VIEWPOINTS, &params.viewpoint),
        auto_suggest = auto_suggest,
        suggest_button = suggest_button,
        submit_label = submit_label,
    )
}

fn results(rendered: &RenderedResult, flow: &FlowConfig) -> String {
    let mut html = String::new();

    if let Some(error) = &rendered.error {
        html.push_str(&format!("<p class=\"error\">{}</p>", escape_html(error)));
    }

    if let Some(prompt) = &rendered.prompt {
        html.push_str("<h3>📝 생성된 영어 프롬프트</h3>");
        html.push_str(&format!("<pre><code>{}</code></pre>", escape_html(prompt)));
        if flow.image_mode == ImageMode::OnDemand {
            html.push_str(
                "<form method=\"post\" action=\"/image\"><button type=\"submit\">🖼️ 이미지 생성</button></form>",
            );
        }
    }

    if let Some(url) = &rendered.image_url {
        html.push_str(&format!(
            "<figure><img src=\"{}\" alt=\"generated image\"><figcaption>🎉 생성된 이미지</figcaption></figure>",
            escape_html(url)
        ));
    }

    match (&rendered.download, &rendered.download_error) {
        (Some(download), _) => html.push_str(&format!(
            "<a href=\"/download\" download=\"{}\">📥 이미지 다운로드 (PNG, {} bytes)</a>",
            download.file_name,
            download.bytes.len()
        )),
        (None, Some(error)) => {
            html.push_str(&format!("<p class=\"error\">{}</p>", escape_html(error)))
        }
        (None, None) => {}
    }

    html
}

/// Builds the full page. Without earlier input the form starts from the
/// first option of every list and the default mood.
pub fn render_page(
    params: Option<&SelectionParams>,
    rendered: &RenderedResult,
    flow: &FlowConfig,
) -> String {
    let defaults = SelectionParams::default().with_moods(DEFAULT_MOODS.iter().copied());
    let params = params.unwrap_or(&defaults);

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<h1>🖼️ {title}</h1>
<section><h2>🎨 상상력 입력하기</h2>
{form}
</section>
<section>
{results}
</section>
</body>
</html>"#,
        title = TITLE,
        form = form(params, flow),
        results = results(rendered, flow),
    )
}
