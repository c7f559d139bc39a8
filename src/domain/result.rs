//! Result type alias for Mosaic
//!
//! Convenience alias that uses [`MosaicError`] as the error type.

use super::errors::MosaicError;

/// Result type alias for Mosaic operations
///
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use mosaic::domain::{MosaicError, Result};
///
/// fn checked(threshold: f32) -> Result<f32> {
///     if !(0.0..=1.0).contains(&threshold) {
///         return Err(MosaicError::Validation("threshold out of range".into()));
///     }
///     Ok(threshold)
/// }
/// ```
pub type Result<T> = std::result::Result<T, MosaicError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::MosaicError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(MosaicError::Validation("test".to_string()));
        assert!(result.is_err());
    }
}
