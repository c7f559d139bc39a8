//! Span anonymization
//!
//! Consumes a finalized, scored span list plus operator configuration and
//! rewrites the source text. Substitution values are all resolved before
//! the first splice, and splices run in descending start order so earlier
//! replacements can never shift the offsets of spans still waiting.
//!
//! Caller-supplied results are **defensively re-resolved**: overlapping or
//! duplicate spans are reduced to a conflict-free set with the same logic
//! the analyzer uses, rather than trusting the caller to have done so.

pub mod synthesis;

use crate::analyzer::models::{char_len, char_slice, RecognizerResult};
use crate::analyzer::resolve::resolve_conflicts;
use crate::domain::{MosaicError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Operator names accepted in an [`OperatorConfig`] and discoverable
/// through the engine facade
///
/// Synthesized runs bypass operator configuration entirely; their audit
/// records carry the reserved name `synthesize`, which is deliberately
/// absent here because it cannot be requested per entity type.
pub const SUPPORTED_OPERATORS: [&str; 5] = ["replace", "redact", "mask", "hash", "keep"];

/// Operator configuration record exchanged across the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub entity_type: String,
    pub operator_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl OperatorConfig {
    /// Convenience constructor for the `replace` operator
    pub fn replace(entity_type: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            operator_name: "replace".to_string(),
            params: Some(serde_json::json!({ "new_value": new_value.into() })),
        }
    }
}

/// A parsed anonymization operator
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Replace the span with a literal (empty by default)
    Replace { new_value: String },
    /// Delete the span
    Redact,
    /// Mask part of the span with a masking character
    Mask {
        masking_char: char,
        chars_to_mask: usize,
        from_end: bool,
    },
    /// Replace the span with its SHA-256 hex digest
    Hash,
    /// Leave the span untouched (audit-only)
    Keep,
}

impl Operator {
    /// Parse a boundary configuration record
    pub fn from_config(config: &OperatorConfig) -> Result<Self> {
        let params = config.params.as_ref();
        let bad_params = |message: &str| MosaicError::InvalidOperatorParams {
            operator: config.operator_name.clone(),
            message: message.to_string(),
        };

        match config.operator_name.as_str() {
            "replace" => {
                let new_value = params
                    .and_then(|p| p.get("new_value"))
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| bad_params("new_value must be a string"))
                    })
                    .transpose()?
                    .unwrap_or_default();
                Ok(Self::Replace { new_value })
            }
            "redact" => Ok(Self::Redact),
            "mask" => {
                let masking_char = params
                    .and_then(|p| p.get("masking_char"))
                    .and_then(|v| v.as_str())
                    .map(|s| {
                        let mut chars = s.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => Ok(c),
                            _ => Err(bad_params("masking_char must be a single character")),
                        }
                    })
                    .transpose()?
                    .unwrap_or('*');
                let chars_to_mask = params
                    .and_then(|p| p.get("chars_to_mask"))
                    .map(|v| {
                        v.as_u64()
                            .map(|n| n as usize)
                            .ok_or_else(|| bad_params("chars_to_mask must be an integer"))
                    })
                    .transpose()?
                    .unwrap_or(usize::MAX);
                let from_end = params
                    .and_then(|p| p.get("from_end"))
                    .map(|v| {
                        v.as_bool()
                            .ok_or_else(|| bad_params("from_end must be a boolean"))
                    })
                    .transpose()?
                    .unwrap_or(false);
                Ok(Self::Mask {
                    masking_char,
                    chars_to_mask,
                    from_end,
                })
            }
            "hash" => Ok(Self::Hash),
            "keep" => Ok(Self::Keep),
            other => Err(MosaicError::UnknownOperator(other.to_string())),
        }
    }

    /// Operator name as exposed by the facade
    pub fn name(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::Redact => "redact",
            Self::Mask { .. } => "mask",
            Self::Hash => "hash",
            Self::Keep => "keep",
        }
    }

    /// Produce the substitution value for a span
    pub fn apply(&self, original: &str) -> String {
        match self {
            Self::Replace { new_value } => new_value.clone(),
            Self::Redact => String::new(),
            Self::Mask {
                masking_char,
                chars_to_mask,
                from_end,
            } => {
                let chars: Vec<char> = original.chars().collect();
                let n = (*chars_to_mask).min(chars.len());
                let mask_range = if *from_end {
                    chars.len() - n..chars.len()
                } else {
                    0..n
                };
                chars
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        if mask_range.contains(&i) {
                            *masking_char
                        } else {
                            *c
                        }
                    })
                    .collect()
            }
            Self::Hash => {
                let mut hasher = Sha256::new();
                hasher.update(original.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            Self::Keep => original.to_string(),
        }
    }
}

/// One substitution with its value fully resolved, ready to splice
#[derive(Debug, Clone)]
pub struct PlannedOperation {
    pub result: RecognizerResult,
    pub operator: String,
    pub new_value: String,
}

/// One substitution actually applied, reported for auditability
#[derive(Debug, Clone, Serialize)]
pub struct AppliedOperation {
    pub entity_type: String,
    pub operator: String,
    pub start: usize,
    pub end: usize,
    pub new_value: String,
}

/// Rewritten text plus the substitutions that produced it
#[derive(Debug, Clone, Serialize)]
pub struct AnonymizedOutput {
    pub text: String,
    pub items: Vec<AppliedOperation>,
}

/// Validate spans, resolve conflicts, and compute every substitution value
///
/// No text is mutated here; a failure leaves the input untouched. Entity
/// types without a configured operator fall back to `replace` with an
/// empty literal.
pub fn resolve_plan(
    text: &str,
    results: &[RecognizerResult],
    operators: &[OperatorConfig],
) -> Result<Vec<PlannedOperation>> {
    let len = char_len(text);
    for result in results {
        if result.start >= result.end || result.end > len {
            return Err(MosaicError::InvalidSpan {
                start: result.start,
                end: result.end,
                len,
            });
        }
    }

    let mut operator_map: HashMap<&str, Operator> = HashMap::new();
    for config in operators {
        operator_map.insert(config.entity_type.as_str(), Operator::from_config(config)?);
    }
    let default_operator = Operator::Replace {
        new_value: String::new(),
    };

    let resolved = resolve_conflicts(results.to_vec());

    let mut plan = Vec::with_capacity(resolved.len());
    for result in resolved {
        let operator = operator_map
            .get(result.entity_type.as_str())
            .unwrap_or(&default_operator);
        let original = char_slice(text, result.start, result.end).unwrap_or_default();
        let new_value = operator.apply(original);

        plan.push(PlannedOperation {
            operator: operator.name().to_string(),
            new_value,
            result,
        });
    }
    Ok(plan)
}

/// Splice a fully resolved plan into the text
///
/// Substitutions run in descending start order: every splice happens at an
/// offset strictly before all spans already processed, so previously
/// computed offsets stay valid without adjustment.
pub fn apply_plan(text: &str, plan: Vec<PlannedOperation>) -> AnonymizedOutput {
    let mut plan = plan;
    plan.sort_by(|a, b| b.result.start.cmp(&a.result.start));

    let mut chars: Vec<char> = text.chars().collect();
    let mut items = Vec::with_capacity(plan.len());

    for op in plan {
        chars.splice(op.result.start..op.result.end, op.new_value.chars());
        items.push(AppliedOperation {
            entity_type: op.result.entity_type,
            operator: op.operator,
            start: op.result.start,
            end: op.result.end,
            new_value: op.new_value,
        });
    }

    items.reverse();
    AnonymizedOutput {
        text: chars.into_iter().collect(),
        items,
    }
}

/// Plan and apply in one step (the non-synthesizing path)
pub fn anonymize(
    text: &str,
    results: &[RecognizerResult],
    operators: &[OperatorConfig],
) -> Result<AnonymizedOutput> {
    let plan = resolve_plan(text, results, operators)?;
    Ok(apply_plan(text, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::models::char_len;

    #[test]
    fn test_replace_single_span() {
        let text = "我叫李雷，性别男，家住北京市朝阳区光华路7号汉威大厦，我的身份证号码是411323198303155953，我的的电话号码是13122832932";
        let results = vec![RecognizerResult::new("ID_CARD", 35, 53, 0.85)];
        let operators = vec![OperatorConfig::replace("ID_CARD", "[证件号码]")];

        let output = anonymize(text, &results, &operators).unwrap();
        assert!(output.text.contains("[证件号码]"));
        assert!(!output.text.contains("411323198303155953"));
        assert_eq!(output.items.len(), 1);
        assert_eq!(output.items[0].new_value, "[证件号码]");
    }

    #[test]
    fn test_length_accounting_is_exact() {
        let text = "零一二三四五六七八九";
        let results = vec![
            RecognizerResult::new("A", 1, 3, 1.0),
            RecognizerResult::new("B", 5, 9, 1.0),
        ];
        let operators = vec![
            OperatorConfig::replace("A", "XY"),
            OperatorConfig::replace("B", "Z"),
        ];

        let output = anonymize(text, &results, &operators).unwrap();
        let expected_len = char_len(text) - (2 + 4) + (2 + 1);
        assert_eq!(char_len(&output.text), expected_len);
        assert_eq!(output.text, "零XY三四Z九");
    }

    #[test]
    fn test_multiple_spans_no_offset_drift() {
        let text = "甲12345乙67890丙";
        let results = vec![
            RecognizerResult::new("N", 1, 6, 1.0),
            RecognizerResult::new("N", 7, 12, 1.0),
        ];
        let operators = vec![OperatorConfig::replace("N", "[数]")];

        let output = anonymize(text, &results, &operators).unwrap();
        assert_eq!(output.text, "甲[数]乙[数]丙");
        // Audit items come back in ascending span order
        assert_eq!(output.items[0].start, 1);
        assert_eq!(output.items[1].start, 7);
    }

    #[test]
    fn test_default_operator_replaces_with_empty_literal() {
        let text = "abcdef";
        let results = vec![RecognizerResult::new("UNCONFIGURED", 2, 4, 1.0)];
        let output = anonymize(text, &results, &[]).unwrap();
        assert_eq!(output.text, "abef");
    }

    #[test]
    fn test_overlapping_results_are_resolved_not_spliced_blind() {
        let text = "0123456789";
        let results = vec![
            RecognizerResult::new("A", 2, 8, 0.9),
            RecognizerResult::new("B", 4, 10, 0.5),
        ];
        let operators = vec![
            OperatorConfig::replace("A", "[a]"),
            OperatorConfig::replace("B", "[b]"),
        ];

        let output = anonymize(text, &results, &operators).unwrap();
        // The higher-scored span wins; the overlapping one is dropped
        assert_eq!(output.text, "01[a]89");
        assert_eq!(output.items.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_span_rejected() {
        let text = "短文本";
        let results = vec![RecognizerResult::new("A", 1, 9, 1.0)];
        let err = anonymize(text, &results, &[]).unwrap_err();
        assert!(matches!(err, MosaicError::InvalidSpan { .. }));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let text = "abcdef";
        let results = vec![RecognizerResult::new("A", 0, 3, 1.0)];
        let operators = vec![OperatorConfig {
            entity_type: "A".to_string(),
            operator_name: "encrypt".to_string(),
            params: None,
        }];
        let err = anonymize(text, &results, &operators).unwrap_err();
        assert!(matches!(err, MosaicError::UnknownOperator(_)));
    }

    #[test]
    fn test_mask_operator() {
        let op = Operator::Mask {
            masking_char: '*',
            chars_to_mask: 4,
            from_end: true,
        };
        assert_eq!(op.apply("6217900100026373517"), "621790010002637****");

        let op = Operator::Mask {
            masking_char: '#',
            chars_to_mask: usize::MAX,
            from_end: false,
        };
        assert_eq!(op.apply("abc"), "###");
    }

    #[test]
    fn test_hash_operator_is_deterministic() {
        let op = Operator::Hash;
        let a = op.apply("张大勇");
        let b = op.apply("张大勇");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_redact_and_keep_operators() {
        assert_eq!(Operator::Redact.apply("secret"), "");
        assert_eq!(Operator::Keep.apply("secret"), "secret");
    }
}
