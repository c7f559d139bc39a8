//! Per-entity-family validation and invalidation rules
//!
//! Each recognizer owns one [`RuleSet`] variant. Rules are pure: they look
//! only at the matched candidate substring, return tri-state verdicts
//! (`Some(true)` / `Some(false)` / `None` = not applicable), and never touch
//! the result record itself — the score fold happens in
//! [`resolve_score`](crate::analyzer::models::resolve_score).

use crate::analyzer::checksum::{id_check_digit, issuing_bank, luhn_check};
use crate::analyzer::numerals::parse_chinese_amount;
use crate::domain::{MosaicError, Result};
use chrono::NaiveDate;

/// Salary amounts outside this range are rejected as noise
const SALARY_RANGE: std::ops::RangeInclusive<f64> = 1_000.0..=10_000_000.0;

/// Stricter anchored re-validation pattern for 18-character national IDs
const ID_CHECK_PATTERN: &str = r"^(1[1-5]|2[1-3]|3[1-7]|4[1-6]|5[0-4]|6[1-5]|71|81|82|91)(0[0-9]|1[0-9]|2[0-9]|3[0-4]|4[0-3]|5[1-3]|90)(0[0-9]|1[0-9]|2[0-9]|3[0-9]|4[0-3]|5[1-7]|6[1-4]|7[1-4]|8[1-7])(19|20)\d{2}(0[1-9]|1[0-2])(0[1-9]|[12][0-9]|3[01])\d{3}[0-9xX]$";

const COMPANY_SUFFIXES: &[&str] = &[
    "公司", "有限公司", "股份公司", "集团", "分公司", "厂", "所", "中心", "事务所", "工作室",
    "分行", "支行", "分店",
];

const COMPANY_KEYWORDS: &[&str] = &[
    "企业", "机构", "集团", "事务所", "科技", "技术", "服务", "咨询", "国际", "银行", "保险",
    "证券",
];

/// Personal-data vocabulary: a company-name candidate containing any of
/// these has over-captured into personal fields and is vetoed
const PERSONAL_DATA_TERMS: &[&str] = &[
    "姓名", "姓 名", "身份证", "证件号", "住址", "家庭地址", "电话", "手机", "邮箱", "联系方式",
];

/// Trailing connector words that indicate the match ran into a following
/// clause
const TRAILING_CONNECTORS: &[&str] = &["的", "及", "和", "与", "或", "等", "之"];

const COMPANY_ADDRESS_FEATURES: &[&str] = &[
    "区", "街道", "路", "号", "院", "楼", "栋", "室", "大厦", "层",
];

const OFFICE_PARK_TERMS: &[&str] = &[
    "产业园", "科技园", "工业区", "商务区", "写字楼", "办公室", "基地", "园区",
];

/// Address recognizer flavors sharing the structural-keyword rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Household,
    Residential,
    Mailing,
    Home,
}

/// Closed set of rule variants, one per entity family
#[derive(Debug)]
pub enum RuleSet {
    /// 18-character national ID: anchored structural re-check plus check
    /// digit; failure invalidates the match outright
    IdCard { check: regex::Regex },
    /// Calendar-date plausibility via separator normalization
    BirthDate,
    /// Administrative/structural keyword requirement
    Address {
        kind: AddressKind,
        features: regex::Regex,
        structure: Option<regex::Regex>,
    },
    /// Company-suffix requirement, personal-data blacklist, trailing
    /// connector rejection
    CompanyName,
    /// Structural keywords, two-level administrative structure, office-park
    /// vocabulary, or digit-plus-unit suffix
    CompanyAddress {
        structure: regex::Regex,
        unit: regex::Regex,
    },
    /// Numeric or capital-numeral amount within the plausible salary range
    Salary { strip: regex::Regex, numeric: regex::Regex },
    /// 16-19 digit all-numeric card number passing Luhn
    BankCard,
    /// No structural rules (deny-lists and ad hoc custom patterns)
    None,
}

fn compile(pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern)
        .map_err(|e| MosaicError::Configuration(format!("invalid rule pattern: {e}")))
}

impl RuleSet {
    pub fn id_card() -> Result<Self> {
        Ok(Self::IdCard {
            check: compile(ID_CHECK_PATTERN)?,
        })
    }

    pub fn birth_date() -> Self {
        Self::BirthDate
    }

    pub fn address(kind: AddressKind) -> Result<Self> {
        let (features, structure) = match kind {
            AddressKind::Household => (r"(省|市|区|县|街道|路|号|村|乡|镇)", None),
            AddressKind::Residential => (
                r"(区|街道|路|号|院|楼|栋|单元|小区|社区|花园|新村|家园)",
                Some(r"[省市区县].+[省市区县]"),
            ),
            AddressKind::Mailing => (r"(信箱|邮编|邮政|快递|收发室)", None),
            AddressKind::Home => (
                r"(区|街道|路|号|院|楼|栋|单元|小区|花园|别墅|新村|家园)",
                None,
            ),
        };
        Ok(Self::Address {
            kind,
            features: compile(features)?,
            structure: structure.map(compile).transpose()?,
        })
    }

    pub fn company_name() -> Self {
        Self::CompanyName
    }

    pub fn company_address() -> Result<Self> {
        Ok(Self::CompanyAddress {
            structure: compile(r"(省|市|区|县|镇|乡|村).+(省|市|区|县|镇|乡|村)")?,
            unit: compile(r"\d+[号幢栋单元室层]")?,
        })
    }

    pub fn salary() -> Result<Self> {
        Ok(Self::Salary {
            strip: compile(r"(税前|税后|人民币|RMB|￥|CNY|元)")?,
            numeric: compile(r"^[\d.]+$")?,
        })
    }

    pub fn bank_card() -> Self {
        Self::BankCard
    }

    /// Validation hook: may raise the score to max or veto to min
    pub fn validate(&self, candidate: &str) -> Option<bool> {
        match self {
            Self::IdCard { check } => {
                if check.is_match(candidate) && id_check_digit(candidate) {
                    Some(true)
                } else {
                    None
                }
            }
            Self::BirthDate => Some(parse_birth_date(candidate).is_some()),
            Self::Address {
                features, structure, ..
            } => {
                let has_features = features.is_match(candidate);
                let has_structure = structure
                    .as_ref()
                    .map(|s| s.is_match(candidate))
                    .unwrap_or(false);
                Some(has_features || has_structure)
            }
            Self::CompanyName => Some(validate_company_name(candidate)),
            Self::CompanyAddress { structure, unit } => {
                let valid = COMPANY_ADDRESS_FEATURES.iter().any(|f| candidate.contains(f))
                    || structure.is_match(candidate)
                    || OFFICE_PARK_TERMS.iter().any(|w| candidate.contains(w))
                    || unit.is_match(candidate);
                Some(valid)
            }
            Self::Salary { strip, numeric } => {
                Some(matches!(parse_amount(strip, numeric, candidate), Ok(v) if SALARY_RANGE.contains(&v)))
            }
            Self::BankCard => {
                let digits = normalize_card_number(candidate);
                Some((16..=19).contains(&digits.chars().count()) && luhn_check(&digits))
            }
            Self::None => None,
        }
    }

    /// Invalidation hook: a `Some(true)` verdict vetoes the match and
    /// always wins over validation
    pub fn invalidate(&self, candidate: &str) -> Option<bool> {
        match self {
            Self::IdCard { check } => {
                Some(!(check.is_match(candidate) && id_check_digit(candidate)))
            }
            Self::CompanyName => Some(
                PERSONAL_DATA_TERMS
                    .iter()
                    .any(|term| candidate.contains(term)),
            ),
            _ => None,
        }
    }

    /// Advisory annotation attached to the result explanation
    pub fn annotate(&self, candidate: &str) -> Option<String> {
        match self {
            Self::BankCard => issuing_bank(&normalize_card_number(candidate))
                .map(|bank| format!("issuing bank: {bank}")),
            _ => None,
        }
    }
}

/// Normalize separators to `YYYY-MM-DD`, zero-pad components, and parse as
/// a calendar date
fn parse_birth_date(candidate: &str) -> Option<NaiveDate> {
    let cleaned = candidate
        .replace('年', "-")
        .replace('月', "-")
        .replace('日', "")
        .replace("..", "-")
        .replace('.', "-");

    let parts: Vec<&str> = cleaned.split('-').collect();
    if parts.len() != 3 {
        return None;
    }

    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn validate_company_name(candidate: &str) -> bool {
    if TRAILING_CONNECTORS
        .iter()
        .any(|conn| candidate.trim_end().ends_with(conn))
    {
        return false;
    }

    COMPANY_SUFFIXES.iter().any(|s| candidate.contains(s))
        || COMPANY_KEYWORDS.iter().any(|k| candidate.contains(k))
}

/// Strip currency/tax qualifiers and parse the remaining token as an Arabic
/// numeral or a capital-numeral string
fn parse_amount(strip: &regex::Regex, numeric: &regex::Regex, candidate: &str) -> Result<f64> {
    let cleaned = strip.replace_all(candidate, "").replace(',', "");
    let cleaned = cleaned.trim();

    if numeric.is_match(cleaned) {
        return cleaned
            .parse::<f64>()
            .map_err(|e| MosaicError::Validation(format!("invalid amount: {e}")));
    }

    parse_chinese_amount(cleaned)
}

fn normalize_card_number(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}
