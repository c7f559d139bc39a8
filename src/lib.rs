//! # Mosaic - Chinese-text PII detection and anonymization
//!
//! Mosaic locates personally identifiable information in Chinese text with
//! context-anchored pattern recognizers, scores each candidate through
//! validation and invalidation rules, and rewrites the text with
//! configurable anonymization operators.
//!
//! ## Overview
//!
//! This library provides:
//! - **Detection** of ID cards, birth dates, addresses, company names,
//!   salary amounts, and bank cards with checksum and structural validation
//! - **Custom recognizers** built at call time from deny lists and ad hoc
//!   patterns
//! - **Anonymization** with replace, redact, mask, hash, and keep
//!   operators, plus optional LLM-backed value synthesis
//!
//! ## Architecture
//!
//! Mosaic follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`engine`] - Facade tying analysis and anonymization together
//! - [`analyzer`] - Recognizers, scoring rules, and result resolution
//! - [`anonymizer`] - Operators, text rewriting, and value synthesis
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mosaic::anonymizer::OperatorConfig;
//! use mosaic::config::MosaicConfig;
//! use mosaic::domain::Language;
//! use mosaic::engine::Engine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new(&MosaicConfig::default())?;
//!
//!     let text = "我的身份证号码是411323198303155953。";
//!     let operators = vec![OperatorConfig::replace("ID_CARD", "[证件号码]")];
//!
//!     let output = engine
//!         .analyze_and_anonymize(text, Language::Zh, None, None, &[], &operators, false)
//!         .await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`] with
//! [`domain::MosaicError`]; errors convert automatically with the `?`
//! operator.

pub mod analyzer;
pub mod anonymizer;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod logging;
