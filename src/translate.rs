//! Korean form labels to English descriptors.
//!
//! Lookups never fail: a term missing from its table is returned unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::SelectionParams;

static STYLE_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("수채화", "watercolor"),
        ("유화", "oil painting"),
        ("카툰", "cartoon"),
        ("픽셀 아트", "pixel art"),
        ("3D 렌더링", "3D rendering"),
        ("사이버펑크", "cyberpunk"),
        ("스케치풍", "pencil sketch"),
        ("클림트 스타일", "in the style of Gustav Klimt"),
        ("큐비즘", "cubism"),
        ("사진 같은 리얼리즘", "photorealism"),
        ("아르누보", "art nouveau"),
        ("낙서풍 (Doodle)", "doodle"),
    ])
});

static TONE_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("따뜻한 파스텔톤", "warm pastel tones"),
        ("선명한 원색", "vivid primary colors"),
        ("몽환적 퍼플", "dreamy purple"),
        ("차가운 블루", "cool blue"),
        ("빈티지 세피아", "vintage sepia"),
        ("형광 네온", "fluorescent neon"),
        ("모노톤 (흑백)", "monochrome black and white"),
        ("대비 강한 컬러", "high-contrast colors"),
        ("브라운 계열", "brown palette"),
        ("연보라+회색", "lavender and gray"),
        ("다채로운 무지개", "colorful rainbow"),
        ("연한 베이지", "soft beige"),
        ("청록+골드", "teal and gold"),
    ])
});

static MOOD_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("몽환적", "dreamy"),
        ("고요함", "serene"),
        ("희망", "hopeful"),
        ("슬픔", "sad"),
        ("그리움", "nostalgic"),
        ("설렘", "excited"),
        ("불안정함", "unsettled"),
        ("자유로움", "free"),
        ("기대감", "anticipation"),
        ("공허함", "empty"),
        ("감사함", "grateful"),
        ("외로움", "lonely"),
        ("기쁨", "joyful"),
        ("어두움", "dark"),
        ("차분함", "calm"),
        ("위로", "comforting"),
        ("용기", "courageous"),
        ("무한함", "infinite"),
        ("즐거움", "cheerful"),
        ("강렬함", "intense"),
    ])
});

fn lookup(table: &HashMap<&'static str, &'static str>, term: &str) -> String {
    table
        .get(term.trim())
        .map(|english| english.to_string())
        .unwrap_or_else(|| term.to_string())
}

pub fn translate_style(style: &str) -> String {
    lookup(&STYLE_TABLE, style)
}

pub fn translate_tone(tone: &str) -> String {
    lookup(&TONE_TABLE, tone)
}

pub fn translate_mood(mood: &str) -> String {
    lookup(&MOOD_TABLE, mood)
}

pub fn translate_moods(moods: &[String]) -> Vec<String> {
    moods.iter().map(|mood| translate_mood(mood)).collect()
}

/// Style, tone and moods go through their tables. Theme, elements and
/// viewpoint are free text and pass through untouched.
pub fn translate_params(params: &SelectionParams) -> SelectionParams {
    SelectionParams {
        style: translate_style(&params.style),
        color_tone: translate_tone(&params.color_tone),
        moods: translate_moods(&params.moods),
        ..params.clone()
    }
}
