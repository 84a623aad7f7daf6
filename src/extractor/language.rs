use whatlang::detect;

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_LENGTH: usize = 50;

/// Tag stored when detection is inconclusive.
pub const DEFAULT_LANGUAGE: &str = "en";

/// ISO 639-3 (whatlang) to ISO 639-1 for the languages we expect to meet.
const TWO_LETTER: &[(&str, &str)] = &[
    ("eng", "en"),
    ("spa", "es"),
    ("hin", "hi"),
    ("fra", "fr"),
    ("deu", "de"),
    ("por", "pt"),
    ("ita", "it"),
    ("nld", "nl"),
    ("rus", "ru"),
    ("cmn", "zh"),
    ("jpn", "ja"),
    ("kor", "ko"),
    ("ara", "ar"),
    ("ben", "bn"),
    ("urd", "ur"),
    ("tur", "tr"),
    ("pol", "pl"),
    ("swe", "sv"),
];

pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().len() < MIN_TEXT_LENGTH {
        return None;
    }

    let info = detect(text)?;
    if info.confidence() < MIN_CONFIDENCE {
        return None;
    }

    let code = info.lang().code();
    let short = TWO_LETTER
        .iter()
        .find(|(long, _)| *long == code)
        .map(|(_, short)| *short)
        .unwrap_or(code);
    Some(short.to_string())
}
