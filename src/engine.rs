//! Engine facade
//!
//! Single entry point tying analysis and anonymization together. The
//! engine owns the recognizer registry and the optional synthesis client;
//! it is immutable after construction and safe to share across tasks.

use crate::analyzer::models::RecognizerResult;
use crate::analyzer::registry::{EntityDefinition, RecognizerRegistry};
use crate::anonymizer::synthesis::SynthesisClient;
use crate::anonymizer::{self, AnonymizedOutput, OperatorConfig, SUPPORTED_OPERATORS};
use crate::config::MosaicConfig;
use crate::domain::{Language, MosaicError, Result};
use std::collections::HashMap;

/// PII detection and anonymization engine
pub struct Engine {
    registry: RecognizerRegistry,
    synthesis: Option<SynthesisClient>,
    default_threshold: f32,
}

impl Engine {
    /// Build an engine with the default recognizer set
    pub fn new(config: &MosaicConfig) -> Result<Self> {
        let synthesis = config
            .synthesis
            .clone()
            .map(SynthesisClient::new)
            .transpose()?;
        Ok(Self {
            registry: RecognizerRegistry::zh_defaults()?,
            synthesis,
            default_threshold: config.default_score_threshold,
        })
    }

    /// Replace the registry (used to attach an external bank or extra
    /// recognizers before first use)
    pub fn with_registry(mut self, registry: RecognizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Whether a synthesis backend is configured
    pub fn synthesis_available(&self) -> bool {
        self.synthesis.is_some()
    }

    /// Detect entities in `text`
    ///
    /// `score_threshold` falls back to the configured default when `None`.
    pub fn analyze(
        &self,
        text: &str,
        language: Language,
        entities: Option<&[String]>,
        score_threshold: Option<f32>,
        allow_list: &[String],
    ) -> Result<Vec<RecognizerResult>> {
        let threshold = score_threshold.unwrap_or(self.default_threshold);
        let results = self
            .registry
            .analyze(text, language, entities, threshold, allow_list)?;
        tracing::info!(
            language = %language,
            results = results.len(),
            threshold,
            "analysis complete"
        );
        Ok(results)
    }

    /// Detect caller-defined entities with transient recognizers
    ///
    /// The built-in recognizer set is not consulted; only the supplied
    /// definitions run, with no score threshold applied.
    pub fn custom_analyze(
        &self,
        text: &str,
        language: Language,
        definitions: &[EntityDefinition],
        allow_list: &[String],
    ) -> Result<Vec<RecognizerResult>> {
        let recognizers = RecognizerRegistry::build_custom(definitions, language)?;
        let transient = RecognizerRegistry::new(recognizers);
        let results = transient.analyze(text, language, None, 0.0, allow_list)?;
        tracing::info!(
            language = %language,
            definitions = definitions.len(),
            results = results.len(),
            "custom analysis complete"
        );
        Ok(results)
    }

    /// Rewrite `text` according to `results` and `operators`
    ///
    /// With `synthesize` set, every substitution value is produced by the
    /// synthesis backend instead of the configured operators, and the
    /// audit records report the reserved operator name `synthesize` (not
    /// part of [`supported_anonymizers`](Self::supported_anonymizers),
    /// since it cannot be configured per entity type). A missing backend
    /// fails here, before any text is touched.
    pub async fn anonymize(
        &self,
        text: &str,
        results: &[RecognizerResult],
        operators: &[OperatorConfig],
        synthesize: bool,
    ) -> Result<AnonymizedOutput> {
        if synthesize && self.synthesis.is_none() {
            return Err(MosaicError::Configuration(
                "synthesis requested but no synthesis backend is configured \
                 (set OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        let mut plan = anonymizer::resolve_plan(text, results, operators)?;

        if synthesize {
            // Checked above
            if let Some(client) = &self.synthesis {
                for op in &mut plan {
                    let original = crate::analyzer::models::char_slice(
                        text,
                        op.result.start,
                        op.result.end,
                    )
                    .unwrap_or_default();
                    op.new_value = client
                        .synthesize(&op.result.entity_type, original)
                        .await?;
                    op.operator = "synthesize".to_string();
                }
            }
        }

        Ok(anonymizer::apply_plan(text, plan))
    }

    /// Analyze and anonymize in one pass
    pub async fn analyze_and_anonymize(
        &self,
        text: &str,
        language: Language,
        entities: Option<&[String]>,
        score_threshold: Option<f32>,
        allow_list: &[String],
        operators: &[OperatorConfig],
        synthesize: bool,
    ) -> Result<AnonymizedOutput> {
        let results = self.analyze(text, language, entities, score_threshold, allow_list)?;
        self.anonymize(text, &results, operators, synthesize).await
    }

    /// Anonymize using an entity-to-replacement mapping
    ///
    /// Only the mapped entity types are detected, each replaced with its
    /// mapped literal at the default score threshold.
    pub fn anonymize_with_mapping(
        &self,
        text: &str,
        language: Language,
        entity_mapping: &HashMap<String, String>,
    ) -> Result<AnonymizedOutput> {
        if entity_mapping.is_empty() {
            return Err(MosaicError::Validation(
                "entity mapping must name at least one entity type".to_string(),
            ));
        }

        let entities: Vec<String> = entity_mapping.keys().cloned().collect();
        let operators: Vec<OperatorConfig> = entity_mapping
            .iter()
            .map(|(entity, value)| OperatorConfig::replace(entity.clone(), value.clone()))
            .collect();

        let results = self.analyze(text, language, Some(&entities), None, &[])?;
        let plan = anonymizer::resolve_plan(text, &results, &operators)?;
        Ok(anonymizer::apply_plan(text, plan))
    }

    /// Entity types detectable for `language`
    pub fn supported_entities(&self, language: Language) -> Result<Vec<String>> {
        self.registry.supported_entities(language)
    }

    /// Names of the available anonymization operators
    pub fn supported_anonymizers(&self) -> Vec<String> {
        SUPPORTED_OPERATORS.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(&MosaicConfig::default()).unwrap()
    }

    const SAMPLE: &str = "我叫李雷，性别男，家住北京市朝阳区光华路7号汉威大厦，\
                          我的身份证号码是411323198303155953，\
                          我的的电话号码是13122832932";

    #[test]
    fn test_analyze_id_card() {
        let entities = vec!["ID_CARD".to_string()];
        let results = engine()
            .analyze(SAMPLE, Language::Zh, Some(&entities), Some(0.3), &[])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_type, "ID_CARD");
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_analyze_and_anonymize_replaces_span() {
        let entities = vec!["ID_CARD".to_string()];
        let operators = vec![OperatorConfig::replace("ID_CARD", "[证件号码]")];
        let output = engine()
            .analyze_and_anonymize(
                SAMPLE,
                Language::Zh,
                Some(&entities),
                Some(0.3),
                &[],
                &operators,
                false,
            )
            .await
            .unwrap();
        assert!(output.text.contains("[证件号码]"));
        assert!(!output.text.contains("411323198303155953"));
    }

    #[tokio::test]
    async fn test_synthesized_substitutions_audited_under_reserved_name() {
        use crate::anonymizer::synthesis::SynthesisConfig;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"130102199204052846"}}]}"#,
            )
            .create_async()
            .await;

        let config = MosaicConfig {
            synthesis: Some(SynthesisConfig {
                api_key: "test-key".to_string(),
                endpoint: format!("{}/v1/chat/completions", server.url()),
                model: "gpt-3.5-turbo".to_string(),
                timeout_secs: 5,
            }),
            ..Default::default()
        };
        let engine = Engine::new(&config).unwrap();
        assert!(engine.synthesis_available());

        let requested = vec!["ID_CARD".to_string()];
        let results = engine
            .analyze(SAMPLE, Language::Zh, Some(&requested), Some(0.3), &[])
            .unwrap();
        let output = engine.anonymize(SAMPLE, &results, &[], true).await.unwrap();

        assert!(output.text.contains("130102199204052846"));
        assert!(!output.text.contains("411323198303155953"));
        assert_eq!(output.items.len(), 1);
        // Reserved audit name, intentionally not in the configurable set
        assert_eq!(output.items[0].operator, "synthesize");
        assert!(!engine
            .supported_anonymizers()
            .contains(&"synthesize".to_string()));
    }

    #[tokio::test]
    async fn test_synthesize_without_backend_fails_before_mutation() {
        let results = vec![RecognizerResult::new("ID_CARD", 0, 5, 1.0)];
        let err = engine()
            .anonymize("某段文本内容", &results, &[], true)
            .await
            .unwrap_err();
        assert!(matches!(err, MosaicError::Configuration(_)));
    }

    #[test]
    fn test_anonymize_with_mapping() {
        let mut mapping = HashMap::new();
        mapping.insert("ID_CARD".to_string(), "[身份证]".to_string());
        let output = engine()
            .anonymize_with_mapping(SAMPLE, Language::Zh, &mapping)
            .unwrap();
        assert!(output.text.contains("[身份证]"));
        assert!(!output.text.contains("411323198303155953"));
    }

    #[test]
    fn test_empty_mapping_rejected() {
        let err = engine()
            .anonymize_with_mapping(SAMPLE, Language::Zh, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, MosaicError::Validation(_)));
    }

    #[test]
    fn test_supported_surfaces() {
        let e = engine();
        let entities = e.supported_entities(Language::Zh).unwrap();
        assert!(entities.contains(&"SALARY_AMOUNT".to_string()));
        let anonymizers = e.supported_anonymizers();
        assert_eq!(
            anonymizers,
            vec!["replace", "redact", "mask", "hash", "keep"]
        );
    }
}
