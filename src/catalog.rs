//! Option lists offered by the form.

pub const STYLES: &[&str] = &[
    "수채화",
    "유화",
    "카툰",
    "픽셀 아트",
    "3D 렌더링",
    "사이버펑크",
    "스케치풍",
    "클림트 스타일",
    "큐비즘",
    "사진 같은 리얼리즘",
    "아르누보",
    "낙서풍 (Doodle)",
];

pub const COLOR_TONES: &[&str] = &[
    "따뜻한 파스텔톤",
    "선명한 원색",
    "몽환적 퍼플",
    "차가운 블루",
    "빈티지 세피아",
    "형광 네온",
    "모노톤 (흑백)",
    "대비 강한 컬러",
    "브라운 계열",
    "연보라+회색",
    "다채로운 무지개",
    "연한 베이지",
    "청록+골드",
];

pub const MOODS: &[&str] = &[
    "몽환적",
    "고요함",
    "희망",
    "슬픔",
    "그리움",
    "설렘",
    "불안정함",
    "자유로움",
    "기대감",
    "공허함",
    "감사함",
    "외로움",
    "기쁨",
    "어두움",
    "차분함",
    "위로",
    "용기",
    "무한함",
    "즐거움",
    "강렬함",
];

pub const DEFAULT_MOODS: &[&str] = &["몽환적"];

pub const VIEWPOINTS: &[&str] = &[
    "정면",
    "항공 시점",
    "클로즈업",
    "광각",
    "역광",
    "뒷모습",
    "소프트 포커스",
    "하늘을 올려다보는 시점",
];
