//! Supported analysis languages

use crate::domain::{MosaicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language a recognizer (or an analysis request) is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Chinese
    Zh,
    /// English
    En,
}

impl Language {
    /// ISO 639-1 code for the language
    pub fn code(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zh" => Ok(Self::Zh),
            "en" => Ok(Self::En),
            other => Err(MosaicError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
    }

    #[test]
    fn test_parse_unknown_language() {
        let err = "fr".parse::<Language>().unwrap_err();
        assert!(matches!(err, MosaicError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(Language::Zh.to_string(), "zh");
        assert_eq!(Language::En.to_string(), "en");
    }
}
