//! Built-in recognizer catalog
//!
//! Pattern strings, base scores, and context keywords live in the embedded
//! TOML library (`patterns/zh_patterns.toml`); this module pairs each
//! definition with its rule set and fallback scan, and produces the
//! process-wide recognizer instances. The tables are loaded once and never
//! mutated afterwards.

use crate::analyzer::models::Pattern;
use crate::analyzer::recognizer::{FallbackScan, PatternRecognizer};
use crate::analyzer::rules::{AddressKind, RuleSet};
use crate::domain::{Language, MosaicError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Pattern definition as loaded from TOML
#[derive(Debug, Clone, Deserialize)]
struct PatternDefinition {
    name: String,
    regex: String,
    score: f32,
    /// Capture group reported as the span (0 = whole match)
    #[serde(default)]
    group: usize,
}

/// Recognizer definition as loaded from TOML
#[derive(Debug, Clone, Deserialize)]
struct RecognizerDefinition {
    entity: String,
    #[serde(default)]
    context: Vec<String>,
    patterns: Vec<PatternDefinition>,
}

#[derive(Debug, Deserialize)]
struct PatternLibrary {
    recognizers: HashMap<String, RecognizerDefinition>,
}

/// Build the default Chinese recognizer set from the embedded library
pub fn zh_recognizers() -> Result<Vec<PatternRecognizer>> {
    let library = include_str!("../../patterns/zh_patterns.toml");
    from_toml(library, Language::Zh)
}

/// Build recognizers from TOML content (exposed for custom libraries)
pub fn from_toml(content: &str, language: Language) -> Result<Vec<PatternRecognizer>> {
    let library: PatternLibrary = toml::from_str(content)?;

    let mut definitions: Vec<RecognizerDefinition> =
        library.recognizers.into_values().collect();
    // Stable registration order regardless of TOML map iteration
    definitions.sort_by(|a, b| a.entity.cmp(&b.entity));

    let mut recognizers = Vec::with_capacity(definitions.len());
    for def in definitions {
        recognizers.push(build_recognizer(def, language)?);
    }
    Ok(recognizers)
}

fn build_recognizer(
    def: RecognizerDefinition,
    language: Language,
) -> Result<PatternRecognizer> {
    let patterns = def
        .patterns
        .iter()
        .map(|p| Ok(Pattern::new(p.name.clone(), &p.regex, p.score)?.with_group(p.group)))
        .collect::<Result<Vec<_>>>()?;
    let base_score = patterns.first().map(|p| p.score).unwrap_or(0.5);

    let (name, rules, fallback) = match def.entity.as_str() {
        "ID_CARD" => ("IDCardRecognizer", RuleSet::id_card()?, None),
        "BIRTH_DATE" => ("BirthDateRecognizer", RuleSet::birth_date(), None),
        "HOUSEHOLD_ADDRESS" => (
            "HouseholdAddressRecognizer",
            RuleSet::address(AddressKind::Household)?,
            None,
        ),
        "RESIDENTIAL_ADDRESS" => (
            "ResidentialAddressRecognizer",
            RuleSet::address(AddressKind::Residential)?,
            Some(introducer_fallback(base_score)?),
        ),
        "MAILING_ADDRESS" => (
            "MailingAddressRecognizer",
            RuleSet::address(AddressKind::Mailing)?,
            None,
        ),
        "HOME_ADDRESS" => (
            "HomeAddressRecognizer",
            RuleSet::address(AddressKind::Home)?,
            Some(introducer_fallback(base_score)?),
        ),
        "COMPANY_NAME" => (
            "CompanyNameRecognizer",
            RuleSet::company_name(),
            Some(company_affiliation_fallback(base_score)?),
        ),
        "COMPANY_ADDRESS" => (
            "CompanyAddressRecognizer",
            RuleSet::company_address()?,
            None,
        ),
        "SALARY_AMOUNT" => (
            "SalaryAmountRecognizer",
            RuleSet::salary()?,
            Some(standalone_salary_fallback(base_score)?),
        ),
        "BANK_CARD" => (
            "BankCardRecognizer",
            RuleSet::bank_card(),
            Some(labelled_card_fallback(base_score)?),
        ),
        other => {
            return Err(MosaicError::Configuration(format!(
                "no rule set for entity '{other}' in pattern library"
            )))
        }
    };

    let mut recognizer =
        PatternRecognizer::new(name, def.entity, language, patterns, def.context, rules);
    if let Some(fallback) = fallback {
        recognizer = recognizer.with_fallback(fallback);
    }
    Ok(recognizer)
}

fn compile_fallback(pattern: &str) -> Result<fancy_regex::Regex> {
    fancy_regex::Regex::new(pattern)
        .map_err(|e| MosaicError::Configuration(format!("invalid fallback pattern: {e}")))
}

/// Alternate introducer phrases for addresses mentioned in running prose
/// rather than labelled fields
fn introducer_fallback(score: f32) -> Result<FallbackScan> {
    Ok(FallbackScan {
        name: "AddressIntroducer".to_string(),
        trigger: None,
        pattern: compile_fallback(r"(家住|家在)([^\n，。；！？]{5,40})")?,
        span_group: 2,
        extend_group: None,
        score,
    })
}

/// "归/属于/隶属于 <candidate> <company-suffix>" constructions
fn company_affiliation_fallback(score: f32) -> Result<FallbackScan> {
    Ok(FallbackScan {
        name: "CompanyAffiliation".to_string(),
        trigger: None,
        pattern: compile_fallback(
            r"(归|属于|隶属于)\s*([^。\n]{4,60}?)(公司|集团|厂|所|中心|事务所|分行|支行|分店)",
        )?,
        span_group: 2,
        extend_group: Some(3),
        score,
    })
}

/// Bare numeral after a salary keyword, for tabular "薪酬标准：36000" rows
fn standalone_salary_fallback(score: f32) -> Result<FallbackScan> {
    Ok(FallbackScan {
        name: "StandaloneSalary".to_string(),
        trigger: Some("薪酬标准".to_string()),
        pattern: compile_fallback(r"(薪酬标准|工资|月薪)[:：\s为]+([\d,]+(\.\d{1,2})?)")?,
        span_group: 2,
        extend_group: None,
        score,
    })
}

/// Card number following an explicit 卡号/账号 label in tabular text
fn labelled_card_fallback(score: f32) -> Result<FallbackScan> {
    Ok(FallbackScan {
        name: "LabelledCardNumber".to_string(),
        trigger: None,
        pattern: compile_fallback(r"(卡号|账号)[^0-9\n]{0,12}(\d{16,19})")?,
        span_group: 2,
        extend_group: None,
        score,
    })
}
