//! Domain types shared across the engine

pub mod errors;
pub mod language;
pub mod result;

pub use errors::MosaicError;
pub use language::Language;
pub use result::Result;
