//! Pattern-driven recognizer for one entity family
//!
//! A recognizer is constructed once, is immutable afterwards, and is safe
//! for unrestricted concurrent use. Matching failures inside a scan are
//! logged and treated as "no match"; they never propagate to the caller.

use crate::analyzer::models::{char_len, resolve_score, Pattern, RecognizerResult, MIN_SCORE};
use crate::analyzer::resolve::remove_duplicates;
use crate::analyzer::rules::RuleSet;
use crate::domain::Language;

/// Sentinel wrapped around the text before matching, guarding lookbehind
/// and lookahead patterns that require a non-alphanumeric boundary at the
/// very start or end of the input
const BOUNDARY: char = '#';

/// Secondary scan run only when the primary patterns yield nothing
#[derive(Debug)]
pub struct FallbackScan {
    /// Name surfaced in result explanations
    pub name: String,
    /// Keyword that must appear in the text for the fallback to run at all
    pub trigger: Option<String>,
    /// Fallback expression, matched against the unwrapped text
    pub pattern: fancy_regex::Regex,
    /// Capture group providing the reported span
    pub span_group: usize,
    /// Optional capture group whose end extends the reported span (used
    /// when a suffix group completes the candidate)
    pub extend_group: Option<usize>,
    /// Base score for fallback matches
    pub score: f32,
}

/// A regex-driven detector for one entity family
#[derive(Debug)]
pub struct PatternRecognizer {
    name: String,
    entity_type: String,
    language: Language,
    patterns: Vec<Pattern>,
    context: Vec<String>,
    rules: RuleSet,
    fallback: Option<FallbackScan>,
}

impl PatternRecognizer {
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        language: Language,
        patterns: Vec<Pattern>,
        context: Vec<String>,
        rules: RuleSet,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            language,
            patterns,
            context,
            rules,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackScan) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Context keywords associated with this recognizer. Currently a
    /// scoring no-op; kept for callers that implement proximity boosting.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Scan `text` and return scored results with character offsets into
    /// the original (unwrapped) text
    pub fn analyze(&self, text: &str) -> Vec<RecognizerResult> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut results = self.scan_patterns(text);

        if results.is_empty() {
            if let Some(fallback) = &self.fallback {
                let triggered = fallback
                    .trigger
                    .as_ref()
                    .map(|kw| text.contains(kw.as_str()))
                    .unwrap_or(true);
                if triggered {
                    results = self.scan_fallback(text, fallback);
                }
            }
        }

        remove_duplicates(results)
    }

    fn scan_patterns(&self, text: &str) -> Vec<RecognizerResult> {
        let wrapped = format!("{BOUNDARY}{text}{BOUNDARY}");
        let mut results = Vec::new();

        for pattern in &self.patterns {
            let group = pattern.group;
            for caps in pattern.regex.captures_iter(&wrapped) {
                let caps = match caps {
                    Ok(caps) => caps,
                    Err(e) => {
                        tracing::warn!(
                            recognizer = %self.name,
                            pattern = %pattern.name,
                            error = %e,
                            "pattern scan failed, treating as no match"
                        );
                        break;
                    }
                };

                let Some(m) = caps.get(group) else { continue };
                // Skip zero-length matches
                if m.as_str().is_empty() {
                    continue;
                }

                if let Some(result) = self.score_match(
                    &wrapped,
                    &pattern.name,
                    pattern.score,
                    m.start(),
                    m.end(),
                    m.as_str(),
                ) {
                    results.push(result);
                }
            }
        }

        results
    }

    /// Fold a raw match through validation and invalidation; offsets are
    /// byte positions in the wrapped text
    fn score_match(
        &self,
        wrapped: &str,
        pattern_name: &str,
        base_score: f32,
        byte_start: usize,
        byte_end: usize,
        candidate: &str,
    ) -> Option<RecognizerResult> {
        let validation = self.rules.validate(candidate);
        let invalidation = self.rules.invalidate(candidate);
        let score = resolve_score(base_score, validation, invalidation);

        tracing::debug!(
            recognizer = %self.name,
            pattern = pattern_name,
            validation = ?validation,
            invalidation = ?invalidation,
            score,
            "match scored"
        );

        if score <= MIN_SCORE {
            return None;
        }

        // Map back to character offsets in the unwrapped text. A match may
        // touch the boundary sentinels (a caller-supplied `.+` swallows
        // both); clamp to the original text and drop what collapses to an
        // empty span.
        let len = char_len(wrapped) - 2;
        let start = byte_to_char(wrapped, byte_start).saturating_sub(1);
        let end = byte_to_char(wrapped, byte_end).saturating_sub(1).min(len);
        if start >= end {
            return None;
        }

        let mut explanation = format!("{} matched pattern '{pattern_name}'", self.name);
        if let Some(note) = self.rules.annotate(candidate) {
            explanation.push_str(", ");
            explanation.push_str(&note);
        }

        Some(RecognizerResult {
            entity_type: self.entity_type.clone(),
            start,
            end,
            score,
            recognizer: Some(self.name.clone()),
            explanation: Some(explanation),
        })
    }

    fn scan_fallback(&self, text: &str, fallback: &FallbackScan) -> Vec<RecognizerResult> {
        let mut results = Vec::new();

        for caps in fallback.pattern.captures_iter(text) {
            let caps = match caps {
                Ok(caps) => caps,
                Err(e) => {
                    tracing::warn!(
                        recognizer = %self.name,
                        fallback = %fallback.name,
                        error = %e,
                        "fallback scan failed, treating as no match"
                    );
                    break;
                }
            };

            let Some(m) = caps.get(fallback.span_group) else {
                continue;
            };
            let byte_start = m.start();
            let byte_end = match fallback.extend_group.and_then(|g| caps.get(g)) {
                Some(ext) => ext.end(),
                None => m.end(),
            };
            let candidate = &text[byte_start..byte_end];
            if candidate.is_empty() {
                continue;
            }

            let validation = self.rules.validate(candidate);
            let invalidation = self.rules.invalidate(candidate);
            let score = resolve_score(fallback.score, validation, invalidation);

            tracing::debug!(
                recognizer = %self.name,
                fallback = %fallback.name,
                validation = ?validation,
                score,
                "fallback match scored"
            );

            if score <= MIN_SCORE {
                continue;
            }

            results.push(RecognizerResult {
                entity_type: self.entity_type.clone(),
                start: byte_to_char(text, byte_start),
                end: byte_to_char(text, byte_end),
                score,
                recognizer: Some(self.name.clone()),
                explanation: Some(format!(
                    "{} matched fallback '{}'",
                    self.name, fallback.name
                )),
            });
        }

        results
    }
}

/// Number of characters preceding `byte_idx` in `text`
fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::models::char_slice;

    fn id_card_recognizer() -> PatternRecognizer {
        PatternRecognizer::new(
            "IDCardRecognizer",
            "ID_CARD",
            Language::Zh,
            vec![Pattern::new(
                "IDCard",
                r"(?<=[^0-9a-zA-Z])((1[1-5]|2[1-3]|3[1-7]|4[1-6]|5[0-4]|6[1-5]|71|81|82|91)(0[0-9]|1[0-9]|2[0-9]|3[0-4]|4[0-3]|5[1-3]|90)(0[0-9]|1[0-9]|2[0-9]|3[0-9]|4[0-3]|5[1-7]|6[1-4]|7[1-4]|8[1-7])(18|19|20)\d{2}(0[1-9]|1[0-2])(0[1-9]|[12][0-9]|3[01])\d{3}[0-9xX])(?=[^0-9a-zA-Z])",
                0.5,
            )
            .unwrap()],
            vec!["身份证号".to_string()],
            RuleSet::id_card().unwrap(),
        )
    }

    #[test]
    fn test_id_card_offsets_are_character_indexed() {
        let recognizer = id_card_recognizer();
        let text = "我叫李雷，家住北京市朝阳区光华路7号汉威大厦，身份证号码是411323198303155953";
        let results = recognizer.analyze(text);

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.entity_type, "ID_CARD");
        assert_eq!(result.score, 1.0);
        assert_eq!(
            char_slice(text, result.start, result.end),
            Some("411323198303155953")
        );
    }

    #[test]
    fn test_sentinel_guards_text_boundaries() {
        // The ID sits at the very start and end of the text; the boundary
        // sentinels satisfy the lookaround on both sides.
        let recognizer = id_card_recognizer();
        let results = recognizer.analyze("411323198303155953");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start, 0);
        assert_eq!(results[0].end, 18);
    }

    #[test]
    fn test_corrupted_check_digit_is_invalidated() {
        let recognizer = id_card_recognizer();
        let results = recognizer.analyze("身份证号码是411323198303155954，其他内容");
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_text_yields_no_results() {
        let recognizer = id_card_recognizer();
        assert!(recognizer.analyze("").is_empty());
    }

    #[test]
    fn test_catch_all_pattern_is_clamped_to_text_bounds() {
        // A caller-supplied `.+` matches the boundary sentinels too; the
        // reported span must cover exactly the original text
        let recognizer = PatternRecognizer::new(
            "CustomSecretRecognizer",
            "SECRET",
            Language::Zh,
            vec![Pattern::new("CatchAll", r".+", 0.1).unwrap()],
            vec![],
            RuleSet::None,
        );
        let text = "秘密内容";
        let results = recognizer.analyze(text);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start, 0);
        assert_eq!(results[0].end, 4);
        assert_eq!(char_slice(text, results[0].start, results[0].end), Some(text));
    }

    #[test]
    fn test_sentinel_only_match_is_dropped() {
        let recognizer = PatternRecognizer::new(
            "SentinelRecognizer",
            "SENTINEL",
            Language::Zh,
            vec![Pattern::new("Hash", r"#", 0.1).unwrap()],
            vec![],
            RuleSet::None,
        );
        assert!(recognizer.analyze("无井号文本").is_empty());
    }

    #[test]
    fn test_offsets_within_bounds() {
        let recognizer = id_card_recognizer();
        let text = "身份证号 110226198211093312 其他";
        let len = text.chars().count();
        for result in recognizer.analyze(&text) {
            assert!(result.start < result.end);
            assert!(result.end <= len);
        }
    }
}
