//! PII detection pipeline
//!
//! The analysis side of the engine: pattern recognizers locate candidate
//! spans with context-anchored expressions, per-family rules raise, lower,
//! or veto their confidence, and the resolver reduces the merged output to
//! a minimal, conflict-free result set.
//!
//! Recognizers are immutable after construction and stateless across
//! calls; a registry can be shared freely across parallel requests.

pub mod catalog;
pub mod checksum;
pub mod models;
pub mod numerals;
pub mod recognizer;
pub mod registry;
pub mod resolve;
pub mod rules;

pub use models::{Pattern, RecognizerResult, MAX_SCORE, MIN_SCORE};
pub use recognizer::PatternRecognizer;
pub use registry::{EntityDefinition, ExternalBank, PatternSpec, RecognizerRegistry};
