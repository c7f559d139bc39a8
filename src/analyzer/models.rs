//! Recognition data models
//!
//! Offsets in a [`RecognizerResult`] are **character** indices into the
//! original text (half-open). Matching internally runs on byte offsets and
//! converts before a result leaves a recognizer, so multi-byte Chinese text
//! never produces misaligned spans.

use crate::domain::Result;
use serde::{Deserialize, Serialize};

/// Highest confidence a result can carry
pub const MAX_SCORE: f32 = 1.0;
/// Lowest confidence; results at this score are vetoed
pub const MIN_SCORE: f32 = 0.0;

/// Default regex flags: multiline + dot-matches-newline
pub const DEFAULT_FLAGS: &str = "ms";

/// A named regular expression with a base confidence score, owned by
/// exactly one recognizer
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Pattern name, surfaced in result explanations
    pub name: String,
    /// Compiled expression
    pub regex: fancy_regex::Regex,
    /// Base confidence score in [0, 1]
    pub score: f32,
    /// Capture group holding the span to report; group 0 (the whole
    /// match) unless the pattern consumes anchoring context such as a
    /// field label
    pub group: usize,
}

impl Pattern {
    /// Compile a pattern with the default flag set
    pub fn new(name: impl Into<String>, regex: &str, score: f32) -> Result<Self> {
        Self::with_flags(name, regex, score, DEFAULT_FLAGS)
    }

    /// Report the span captured by `group` instead of the whole match
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// Compile a pattern with an explicit flag set (e.g. `"m"`, `""`)
    pub fn with_flags(
        name: impl Into<String>,
        regex: &str,
        score: f32,
        flags: &str,
    ) -> Result<Self> {
        let name = name.into();
        let expr = if flags.is_empty() {
            regex.to_string()
        } else {
            format!("(?{flags}){regex}")
        };
        let regex = fancy_regex::Regex::new(&expr).map_err(|e| {
            crate::domain::MosaicError::Configuration(format!(
                "invalid regex in pattern '{name}': {e}"
            ))
        })?;
        Ok(Self {
            name,
            regex,
            score: score.clamp(MIN_SCORE, MAX_SCORE),
            group: 0,
        })
    }
}

/// A scored, offset-bounded detection of an entity type within a text
///
/// This is the plain record exchanged across the engine boundary; the
/// provenance fields are optional and omitted from serialized output when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    /// Entity type identifier (e.g. `ID_CARD`)
    pub entity_type: String,
    /// Start offset, character-indexed into the original text
    pub start: usize,
    /// End offset (half-open), character-indexed into the original text
    pub end: usize,
    /// Confidence score in [0, 1]
    #[serde(default)]
    pub score: f32,
    /// Name of the recognizer that produced this result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognizer: Option<String>,
    /// Human-readable explanation of how the result was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl RecognizerResult {
    /// Create a plain result with no provenance
    pub fn new(entity_type: impl Into<String>, start: usize, end: usize, score: f32) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score,
            recognizer: None,
            explanation: None,
        }
    }

    /// Span length in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span is empty
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `other`'s span lies fully within this result's span
    pub fn contains(&self, other: &RecognizerResult) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the two spans share at least one character
    pub fn overlaps(&self, other: &RecognizerResult) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Fold a base pattern score through the validation and invalidation
/// verdicts, producing the final score
///
/// Tri-state verdicts: `Some(true)` / `Some(false)` / `None` (not
/// applicable). Validation clamps to max or min; invalidation always wins
/// and forces the minimum. The result stays in [0, 1].
pub fn resolve_score(base: f32, validation: Option<bool>, invalidation: Option<bool>) -> f32 {
    let score = match validation {
        Some(true) => MAX_SCORE,
        Some(false) => MIN_SCORE,
        None => base,
    };
    let score = match invalidation {
        Some(true) => MIN_SCORE,
        _ => score,
    };
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by character offsets, or `None` when out of bounds
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let mut byte_start = None;
    let mut byte_end = None;
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == start {
            byte_start = Some(byte_idx);
        }
        if count == end {
            byte_end = Some(byte_idx);
            break;
        }
    }
    let len = text.len();
    let total = char_len(text);
    let byte_start = byte_start.or(if start == total { Some(len) } else { None })?;
    let byte_end = byte_end.or(if end == total { Some(len) } else { None })?;
    text.get(byte_start..byte_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_score_chain() {
        assert_eq!(resolve_score(0.5, None, None), 0.5);
        assert_eq!(resolve_score(0.5, Some(true), None), MAX_SCORE);
        assert_eq!(resolve_score(0.5, Some(false), None), MIN_SCORE);
        // Invalidation always wins, even over a passing validation
        assert_eq!(resolve_score(0.5, Some(true), Some(true)), MIN_SCORE);
        assert_eq!(resolve_score(0.5, None, Some(false)), 0.5);
    }

    #[test]
    fn test_resolve_score_stays_in_range() {
        assert_eq!(resolve_score(3.0, None, None), MAX_SCORE);
        assert_eq!(resolve_score(-1.0, None, None), MIN_SCORE);
    }

    #[test]
    fn test_contains_and_overlaps() {
        let outer = RecognizerResult::new("ID_CARD", 2, 10, 0.5);
        let inner = RecognizerResult::new("ID_CARD", 4, 8, 0.5);
        let disjoint = RecognizerResult::new("ID_CARD", 10, 12, 0.5);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.overlaps(&inner));
        assert!(!outer.overlaps(&disjoint));
    }

    #[test]
    fn test_char_slice_multibyte() {
        let text = "我叫李雷，家住北京";
        assert_eq!(char_slice(text, 2, 4), Some("李雷"));
        assert_eq!(char_slice(text, 0, 9), Some(text));
        assert_eq!(char_slice(text, 9, 9), Some(""));
        assert_eq!(char_slice(text, 5, 12), None);
    }

    #[test]
    fn test_pattern_rejects_bad_regex() {
        assert!(Pattern::new("Broken", "(unclosed", 0.5).is_err());
    }

    #[test]
    fn test_pattern_reporting_group() {
        let plain = Pattern::new("Plain", r"\d+", 0.5).unwrap();
        assert_eq!(plain.group, 0);

        let labelled = Pattern::new("Labelled", r"(生日)[:：\s]*(\d+)", 0.8)
            .unwrap()
            .with_group(2);
        assert_eq!(labelled.group, 2);
    }

    #[test]
    fn test_variable_width_lookbehind_is_rejected_at_compile() {
        // fancy-regex only accepts constant-size lookbehind; label anchors
        // must be ordinary groups paired with a reporting group instead
        assert!(Pattern::new("Bad", r"(?<=(生日|出生日期)[:：\s]*)\d+", 0.8).is_err());
        assert!(Pattern::new("ConstWidth", r"(?<=[^0-9a-zA-Z])\d+", 0.8).is_ok());
    }

    #[test]
    fn test_result_serde_shape() {
        let result = RecognizerResult::new("ID_CARD", 35, 53, 1.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entity_type": "ID_CARD",
                "start": 35,
                "end": 53,
                "score": 1.0
            })
        );
    }
}
