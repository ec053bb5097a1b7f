//! Story point estimates and extraction of an estimate from model output.
//!
//! Model responses are free-form text. [`extract`] runs an ordered cascade of
//! matchers over the text and returns the first value that belongs to the
//! allowed point scale, or the caller's fallback when nothing matches.

use crate::error::{Result, SprigError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::{fmt, str::FromStr};

/// Number of leading characters inspected by the windowed keyword matcher.
pub const KEYWORD_WINDOW: usize = 300;

const TAG_MARKER: &str = "AI_ESTIMATE:";

/// A story point value on the Fibonacci-like scale `1, 2, 3, 5, 8, 13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EstimateValue(u8);

impl EstimateValue {
    /// The allowed scale, ascending.
    pub const ALLOWED: [EstimateValue; 6] = [
        EstimateValue(1),
        EstimateValue(2),
        EstimateValue(3),
        EstimateValue(5),
        EstimateValue(8),
        EstimateValue(13),
    ];

    pub fn new(points: u64) -> Option<Self> {
        Self::ALLOWED.into_iter().find(|v| u64::from(v.0) == points)
    }

    pub fn points(self) -> u8 {
        self.0
    }

    /// The scale scanned from the largest value down.
    pub fn descending() -> impl Iterator<Item = EstimateValue> {
        Self::ALLOWED.into_iter().rev()
    }
}

impl TryFrom<u8> for EstimateValue {
    type Error = SprigError;

    fn try_from(points: u8) -> Result<Self> {
        Self::new(u64::from(points)).ok_or_else(|| not_on_scale(&points.to_string()))
    }
}

impl From<EstimateValue> for u8 {
    fn from(value: EstimateValue) -> Self {
        value.0
    }
}

impl FromStr for EstimateValue {
    type Err = SprigError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| not_on_scale(s))
    }
}

impl fmt::Display for EstimateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn not_on_scale(input: &str) -> SprigError {
    SprigError::Validation(format!(
        "Invalid estimate '{}': must be one of 1, 2, 3, 5, 8, 13",
        input
    ))
}

/// Which matcher produced an extracted estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    TaggedLine,
    MarkdownEmphasis,
    WindowedKeyword,
    PhrasePattern,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::TaggedLine => write!(f, "TaggedLine"),
            ExtractionMethod::MarkdownEmphasis => write!(f, "MarkdownEmphasis"),
            ExtractionMethod::WindowedKeyword => write!(f, "WindowedKeyword"),
            ExtractionMethod::PhrasePattern => write!(f, "PhrasePattern"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub value: EstimateValue,
    /// `None` when the fallback was used
    pub method: Option<ExtractionMethod>,
    pub matched: bool,
}

impl ExtractionResult {
    fn found(value: EstimateValue, method: ExtractionMethod) -> Self {
        Self {
            value,
            method: Some(method),
            matched: true,
        }
    }

    fn fallback(value: EstimateValue) -> Self {
        Self {
            value,
            method: None,
            matched: false,
        }
    }

    pub fn method_label(&self) -> String {
        self.method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "None".to_string())
    }
}

static TAGGED_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"{}\s*(\d+)", regex::escape(TAG_MARKER))));

static MARKDOWN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\*\*(\d+)\s*points?\*\*",
        r"(?i)\*\*(\d+)-points?\*\*",
        r"(?i)estimate[:\s]+\*\*(\d+)",
        r"(?i)My\s+AI\s+estimate[:\s]+\*\*(\d+)",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

// Matched against lower-cased text
static PHRASE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:my|ai)?\s*estimate[:\s]+is[:\s]+(\d+)",
        r"(?:recommend|suggest|propose)[:\s]+(\d+)\s+point",
        r"would\s+estimate[:\s]+(?:this\s+at[:\s]+)?(\d+)",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("built-in estimate pattern {:?} is invalid: {}", pattern, e),
    }
}

/// Extract a story point estimate from free-form text.
///
/// Matchers run in a fixed order and the first one yielding a value on the
/// allowed scale wins:
///
/// 1. an `AI_ESTIMATE: N` tag
/// 2. bold markdown such as `**8 points**` or `estimate: **8`
/// 3. keyword phrases (`"N point"`, `"estimate is N"`, ...) in the first
///    [`KEYWORD_WINDOW`] characters, scanning values from 13 down to 1
/// 4. looser phrases such as `"would estimate this at N"`
///
/// When none match, `fallback` is returned with `matched == false`.
pub fn extract(text: &str, fallback: EstimateValue) -> ExtractionResult {
    let result = tagged_line(text)
        .map(|v| ExtractionResult::found(v, ExtractionMethod::TaggedLine))
        .or_else(|| {
            markdown_emphasis(text)
                .map(|v| ExtractionResult::found(v, ExtractionMethod::MarkdownEmphasis))
        })
        .or_else(|| {
            windowed_keyword(text)
                .map(|v| ExtractionResult::found(v, ExtractionMethod::WindowedKeyword))
        })
        .or_else(|| {
            phrase_pattern(text).map(|v| ExtractionResult::found(v, ExtractionMethod::PhrasePattern))
        });

    match result {
        Some(found) => {
            tracing::debug!(
                value = %found.value,
                method = %found.method_label(),
                "Extracted estimate"
            );
            found
        }
        None => {
            let preview: String = text.chars().take(KEYWORD_WINDOW).collect();
            tracing::warn!(
                fallback = %fallback,
                preview = %preview,
                "Could not extract an estimate, using fallback"
            );
            ExtractionResult::fallback(fallback)
        }
    }
}

/// Value of the first capture group of the first match, if it is on the scale.
fn first_capture(re: &Regex, text: &str) -> Option<EstimateValue> {
    let caps = re.captures(text)?;
    caps.get(1)?.as_str().parse::<u64>().ok().and_then(EstimateValue::new)
}

fn tagged_line(text: &str) -> Option<EstimateValue> {
    first_capture(&TAGGED_LINE, text)
}

fn markdown_emphasis(text: &str) -> Option<EstimateValue> {
    MARKDOWN_PATTERNS
        .iter()
        .find_map(|re| first_capture(re, text))
}

fn windowed_keyword(text: &str) -> Option<EstimateValue> {
    let window: String = text.chars().take(KEYWORD_WINDOW).collect();
    let window = window.to_lowercase();

    EstimateValue::descending().find(|value| {
        let n = value.points();
        [
            format!("{} point", n),
            format!("{}-point", n),
            format!("estimate {}", n),
            format!("estimate: {}", n),
            format!("estimate is {}", n),
        ]
        .iter()
        .any(|needle| window.contains(needle.as_str()))
    })
}

fn phrase_pattern(text: &str) -> Option<EstimateValue> {
    let lowered = text.to_lowercase();
    PHRASE_PATTERNS
        .iter()
        .find_map(|re| first_capture(re, &lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(points: u64) -> EstimateValue {
        EstimateValue::new(points).unwrap()
    }

    #[test]
    fn test_allowed_scale() {
        for points in [1, 2, 3, 5, 8, 13] {
            assert_eq!(est(points).points() as u64, points);
        }
        for points in [0, 4, 6, 7, 10, 20, 21, 100] {
            assert!(EstimateValue::new(points).is_none(), "{} accepted", points);
        }
    }

    #[test]
    fn test_parse_estimate_value() {
        assert_eq!("8".parse::<EstimateValue>().unwrap(), est(8));
        assert_eq!(" 13 ".parse::<EstimateValue>().unwrap(), est(13));
        assert!("7".parse::<EstimateValue>().is_err());
        assert!("eight".parse::<EstimateValue>().is_err());
        assert!(EstimateValue::try_from(4u8).is_err());
    }

    #[test]
    fn test_serde_as_integer() {
        let json = serde_json::to_string(&est(5)).unwrap();
        assert_eq!(json, "5");
        let back: EstimateValue = serde_json::from_str("13").unwrap();
        assert_eq!(back, est(13));
        assert!(serde_json::from_str::<EstimateValue>("4").is_err());
    }

    #[test]
    fn test_tagged_line_wins_regardless_of_fallback() {
        for value in EstimateValue::ALLOWED {
            for fallback in EstimateValue::ALLOWED {
                let text = format!("AI_ESTIMATE: {}\nReasoning follows.", value);
                let result = extract(&text, fallback);
                assert_eq!(result.value, value);
                assert_eq!(result.method, Some(ExtractionMethod::TaggedLine));
                assert!(result.matched);
            }
        }
    }

    #[test]
    fn test_tagged_line_without_space() {
        let result = extract("AI_ESTIMATE:13", est(1));
        assert_eq!(result.value, est(13));
        assert_eq!(result.method, Some(ExtractionMethod::TaggedLine));
    }

    #[test]
    fn test_tagged_line_is_case_sensitive() {
        let result = extract("ai_estimate:8", est(3));
        assert_eq!(result, ExtractionResult::fallback(est(3)));

        // A lower-case tag still reads as a keyword phrase
        let result = extract("ai_estimate: 8", est(3));
        assert_eq!(result.value, est(8));
        assert_eq!(result.method, Some(ExtractionMethod::WindowedKeyword));
    }

    #[test]
    fn test_tagged_line_out_of_scale_falls_through() {
        // The tag is ignored, the bold value is picked up instead
        let result = extract("AI_ESTIMATE: 7\nI'd call it **5 points** overall.", est(2));
        assert_eq!(result.value, est(5));
        assert_eq!(result.method, Some(ExtractionMethod::MarkdownEmphasis));
    }

    #[test]
    fn test_no_pattern_returns_fallback() {
        let result = extract("This story looks straightforward to me.", est(3));
        assert_eq!(
            result,
            ExtractionResult {
                value: est(3),
                method: None,
                matched: false
            }
        );
        assert_eq!(result.method_label(), "None");
    }

    #[test]
    fn test_empty_text_returns_fallback() {
        let result = extract("", est(8));
        assert_eq!(result.value, est(8));
        assert!(!result.matched);
    }

    #[test]
    fn test_out_of_scale_number_falls_back() {
        let result = extract("I think this is about 7 points of work.", est(5));
        assert_eq!(result.value, est(5));
        assert!(!result.matched);
    }

    #[test]
    fn test_markdown_beats_windowed_keyword() {
        let text = "Team said 3 point but I disagree.\nMy take: **8 points** given the migration.";
        let result = extract(text, est(3));
        assert_eq!(result.value, est(8));
        assert_eq!(result.method, Some(ExtractionMethod::MarkdownEmphasis));
    }

    #[test]
    fn test_markdown_variants() {
        assert_eq!(extract("**5-points**", est(1)).value, est(5));
        assert_eq!(extract("**2 Point**", est(1)).value, est(2));
        assert_eq!(extract("Final estimate: **13** points", est(1)).value, est(13));
        assert_eq!(extract("My AI estimate: **3**", est(1)).value, est(3));
    }

    #[test]
    fn test_markdown_non_numeric_does_not_match() {
        let result = extract("I'd say **eight points** for this one.", est(2));
        assert_eq!(result.value, est(2));
        assert!(!result.matched);
    }

    #[test]
    fn test_windowed_prefers_larger_values() {
        let text = "This mentions 13 point story but maybe 1 concern about the API.";
        let result = extract(text, est(2));
        assert_eq!(result.value, est(13));
        assert_eq!(result.method, Some(ExtractionMethod::WindowedKeyword));
    }

    #[test]
    fn test_windowed_descending_tie_break() {
        // Both "1 point" and "5 point" appear; 5 is scanned first
        let text = "Could be 1 point, realistically a 5 point story.";
        assert_eq!(extract(text, est(2)).value, est(5));
    }

    #[test]
    fn test_windowed_ignores_text_after_window() {
        let padding = "x".repeat(KEYWORD_WINDOW);
        let text = format!("{}8 point", padding);
        let result = extract(&text, est(3));
        assert_eq!(result.value, est(3));
        assert!(!result.matched);
    }

    #[test]
    fn test_windowed_counts_characters_not_bytes() {
        // Two-byte characters push the keyword past byte 300 but not past character 300
        let padding = "é".repeat(KEYWORD_WINDOW - 10);
        let text = format!("{}5 point!", padding);
        assert_eq!(extract(&text, est(1)).value, est(5));
    }

    #[test]
    fn test_windowed_keyword_forms() {
        assert_eq!(extract("An 8-point effort.", est(1)).value, est(8));
        assert_eq!(extract("Estimate: 3 given scope.", est(1)).value, est(3));
        assert_eq!(extract("My estimate is 2.", est(1)).value, est(2));
    }

    #[test]
    fn test_phrase_pattern_beyond_window() {
        let padding = "Some context about the story. ".repeat(12);
        let text = format!("{}I would estimate this at 8 given the unknowns.", padding);
        let result = extract(&text, est(1));
        assert_eq!(result.value, est(8));
        assert_eq!(result.method, Some(ExtractionMethod::PhrasePattern));
    }

    #[test]
    fn test_phrase_recommend() {
        let padding = "Background. ".repeat(30);
        let text = format!("{}We recommend 5 points here.", padding);
        let result = extract(&text, est(1));
        assert_eq!(result.value, est(5));
        assert_eq!(result.method, Some(ExtractionMethod::PhrasePattern));
    }

    #[test]
    fn test_end_to_end_example() {
        let text = "AI_ESTIMATE: 8\nI think 8 points because the schema changes ripple.";
        let result = extract(text, est(5));
        assert_eq!(result.value, est(8));
        assert_eq!(result.method_label(), "TaggedLine");
    }
}
