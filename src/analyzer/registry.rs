//! Recognizer registry and dispatch
//!
//! Holds the immutable recognizer set for each language and runs a text
//! through the subset the caller asked for. An optional external NLP bank
//! (statistical PERSON/PHONE/EMAIL detection) can be plugged in behind the
//! [`ExternalBank`] trait; its results merge into the same resolution
//! pipeline.

use crate::analyzer::catalog;
use crate::analyzer::models::{char_len, char_slice, Pattern, RecognizerResult};
use crate::analyzer::recognizer::PatternRecognizer;
use crate::analyzer::resolve::remove_duplicates;
use crate::analyzer::rules::RuleSet;
use crate::domain::{Language, MosaicError, Result};
use serde::Deserialize;
use std::sync::Arc;

/// Boundary seam for an external statistical recognizer bank
///
/// Implementations supplement the pattern recognizers; they are never a
/// replacement for them. Results merge into the same dedup/threshold
/// pipeline as pattern matches.
pub trait ExternalBank: Send + Sync {
    /// Detect entities in `text`, restricted to `entities` when given
    fn analyze(
        &self,
        text: &str,
        language: Language,
        entities: Option<&[String]>,
    ) -> Vec<RecognizerResult>;

    /// Entity types the bank can produce for `language`
    fn supported_entities(&self, language: Language) -> Vec<String>;
}

fn default_pattern_score() -> f32 {
    0.1
}

/// Ad hoc pattern supplied by a caller for custom analysis
#[derive(Debug, Clone, Deserialize)]
pub struct PatternSpec {
    pub name: String,
    pub regex: String,
    #[serde(default = "default_pattern_score")]
    pub score: f32,
}

/// Caller-supplied definition of a transient entity recognizer
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDefinition {
    /// Entity type the transient recognizer reports
    pub entity: String,
    /// Literal terms to detect (compiled into one escaped alternation at
    /// full confidence)
    #[serde(default)]
    pub deny_list: Vec<String>,
    /// Ad hoc regex patterns with names and scores
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
    /// Context keywords (scoring no-op hook)
    #[serde(default)]
    pub context: Vec<String>,
}

/// Registry of active recognizers
pub struct RecognizerRegistry {
    recognizers: Vec<Arc<PatternRecognizer>>,
    external: Option<Arc<dyn ExternalBank>>,
}

impl RecognizerRegistry {
    /// Registry with the built-in Chinese recognizer set
    pub fn zh_defaults() -> Result<Self> {
        Ok(Self::new(catalog::zh_recognizers()?))
    }

    pub fn new(recognizers: Vec<PatternRecognizer>) -> Self {
        Self {
            recognizers: recognizers.into_iter().map(Arc::new).collect(),
            external: None,
        }
    }

    /// Attach an external statistical recognizer bank
    pub fn with_external_bank(mut self, bank: Arc<dyn ExternalBank>) -> Self {
        self.external = Some(bank);
        self
    }

    /// Register an additional recognizer
    pub fn add(&mut self, recognizer: PatternRecognizer) {
        self.recognizers.push(Arc::new(recognizer));
    }

    /// Entity types available for `language`
    ///
    /// Unknown languages are fatal, not an empty list.
    pub fn supported_entities(&self, language: Language) -> Result<Vec<String>> {
        let mut entities: Vec<String> = self
            .recognizers
            .iter()
            .filter(|r| r.language() == language)
            .map(|r| r.entity_type().to_string())
            .collect();

        if let Some(bank) = &self.external {
            entities.extend(bank.supported_entities(language));
        }

        if entities.is_empty() {
            return Err(MosaicError::UnsupportedLanguage(language.to_string()));
        }

        entities.sort();
        entities.dedup();
        Ok(entities)
    }

    /// Run `text` through the recognizers for `language`
    ///
    /// `entities` restricts dispatch to the named types (unknown names are
    /// silently filtered); `None` means all supported types. Results below
    /// `score_threshold` are dropped, and any span whose exact text appears
    /// in `allow_list` is suppressed regardless of score.
    pub fn analyze(
        &self,
        text: &str,
        language: Language,
        entities: Option<&[String]>,
        score_threshold: f32,
        allow_list: &[String],
    ) -> Result<Vec<RecognizerResult>> {
        // Unknown language is fatal even for empty input
        self.supported_entities(language)?;

        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for recognizer in &self.recognizers {
            if recognizer.language() != language {
                continue;
            }
            if let Some(requested) = entities {
                if !requested.iter().any(|e| e == recognizer.entity_type()) {
                    continue;
                }
            }
            results.extend(recognizer.analyze(text));
        }

        if let Some(bank) = &self.external {
            results.extend(bank.analyze(text, language, entities));
        }

        let len = char_len(text);
        results.retain(|r| {
            let in_bounds = r.start < r.end && r.end <= len;
            if !in_bounds {
                tracing::warn!(
                    entity_type = %r.entity_type,
                    start = r.start,
                    end = r.end,
                    "discarding result with out-of-bounds span"
                );
            }
            in_bounds
        });

        if !allow_list.is_empty() {
            results.retain(|r| {
                let span = char_slice(text, r.start, r.end).unwrap_or_default();
                let allowed = allow_list.iter().any(|a| a == span);
                if allowed {
                    tracing::debug!(
                        entity_type = %r.entity_type,
                        "suppressing allow-listed span"
                    );
                }
                !allowed
            });
        }

        let mut results = remove_duplicates(results);
        results.retain(|r| r.score >= score_threshold);
        Ok(results)
    }

    /// Build transient recognizers from caller-supplied definitions
    pub fn build_custom(
        definitions: &[EntityDefinition],
        language: Language,
    ) -> Result<Vec<PatternRecognizer>> {
        let mut recognizers = Vec::with_capacity(definitions.len());

        for def in definitions {
            if def.entity.is_empty() {
                return Err(MosaicError::Validation(
                    "custom entity definition has an empty entity type".to_string(),
                ));
            }
            if def.deny_list.is_empty() && def.patterns.is_empty() {
                return Err(MosaicError::Validation(format!(
                    "custom entity '{}' supplies neither a deny list nor patterns",
                    def.entity
                )));
            }

            let mut patterns = Vec::new();
            if !def.deny_list.is_empty() {
                let alternation = def
                    .deny_list
                    .iter()
                    .map(|term| regex::escape(term))
                    .collect::<Vec<_>>()
                    .join("|");
                patterns.push(Pattern::new(
                    format!("deny_list_{}", def.entity),
                    &format!("(?:{alternation})"),
                    1.0,
                )?);
            }
            for spec in &def.patterns {
                patterns.push(Pattern::new(spec.name.clone(), &spec.regex, spec.score)?);
            }

            recognizers.push(PatternRecognizer::new(
                format!("Custom{}Recognizer", def.entity),
                def.entity.clone(),
                language,
                patterns,
                def.context.clone(),
                RuleSet::None,
            ));
        }

        Ok(recognizers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RecognizerRegistry {
        RecognizerRegistry::zh_defaults().unwrap()
    }

    #[test]
    fn test_supported_entities() {
        let entities = registry().supported_entities(Language::Zh).unwrap();
        assert!(entities.contains(&"ID_CARD".to_string()));
        assert!(entities.contains(&"BANK_CARD".to_string()));
        assert_eq!(entities.len(), 10);
    }

    #[test]
    fn test_unknown_language_is_fatal() {
        let err = registry()
            .analyze("some text", Language::En, None, 0.0, &[])
            .unwrap_err();
        assert!(matches!(err, MosaicError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_unknown_entity_type_is_filtered() {
        let requested = vec!["NOT_A_REAL_ENTITY".to_string()];
        let results = registry()
            .analyze(
                "身份证号码是411323198303155953，其他内容",
                Language::Zh,
                Some(&requested),
                0.0,
                &[],
            )
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_text_returns_no_matches() {
        let results = registry()
            .analyze("", Language::Zh, None, 0.0, &[])
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_allow_list_suppresses_valid_match() {
        let text = "身份证号码是411323198303155953。";
        let entities = vec!["ID_CARD".to_string()];
        let allow = vec!["411323198303155953".to_string()];

        let without = registry()
            .analyze(text, Language::Zh, Some(&entities), 0.3, &[])
            .unwrap();
        assert_eq!(without.len(), 1);

        let with = registry()
            .analyze(text, Language::Zh, Some(&entities), 0.3, &allow)
            .unwrap();
        assert!(with.is_empty());
    }

    #[test]
    fn test_custom_deny_list_recognizer() {
        let defs = vec![EntityDefinition {
            entity: "PROJECT_CODE".to_string(),
            deny_list: vec!["天网一号".to_string()],
            patterns: vec![],
            context: vec![],
        }];
        let custom = RecognizerRegistry::build_custom(&defs, Language::Zh).unwrap();
        let registry = RecognizerRegistry::new(custom);

        let results = registry
            .analyze("本项目代号天网一号，注意保密。", Language::Zh, None, 0.0, &[])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_type, "PROJECT_CODE");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_custom_catch_all_pattern_spans_whole_text() {
        let defs = vec![EntityDefinition {
            entity: "SECRET".to_string(),
            deny_list: vec![],
            patterns: vec![PatternSpec {
                name: "CatchAll".to_string(),
                regex: ".+".to_string(),
                score: 0.4,
            }],
            context: vec![],
        }];
        let custom = RecognizerRegistry::build_custom(&defs, Language::Zh).unwrap();
        let registry = RecognizerRegistry::new(custom);

        let results = registry
            .analyze("秘密内容", Language::Zh, None, 0.0, &[])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].start, results[0].end), (0, 4));
    }

    #[test]
    fn test_custom_definition_must_have_content() {
        let defs = vec![EntityDefinition {
            entity: "EMPTY".to_string(),
            deny_list: vec![],
            patterns: vec![],
            context: vec![],
        }];
        let err = RecognizerRegistry::build_custom(&defs, Language::Zh).unwrap_err();
        assert!(matches!(err, MosaicError::Validation(_)));
    }

    struct StubBank;
    impl ExternalBank for StubBank {
        fn analyze(
            &self,
            _text: &str,
            _language: Language,
            _entities: Option<&[String]>,
        ) -> Vec<RecognizerResult> {
            vec![RecognizerResult::new("PERSON", 2, 4, 0.85)]
        }
        fn supported_entities(&self, _language: Language) -> Vec<String> {
            vec!["PERSON".to_string()]
        }
    }

    #[test]
    fn test_external_bank_results_merge() {
        let registry = registry().with_external_bank(Arc::new(StubBank));
        let results = registry
            .analyze("我叫李雷，其他内容。", Language::Zh, None, 0.0, &[])
            .unwrap();
        assert!(results.iter().any(|r| r.entity_type == "PERSON"));

        let entities = registry.supported_entities(Language::Zh).unwrap();
        assert!(entities.contains(&"PERSON".to_string()));
    }
}
