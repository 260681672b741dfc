//! Result type alias for Tablemask

use super::errors::TablemaskError;

/// Result type alias for Tablemask operations
///
/// # Examples
///
/// ```
/// use tablemask::domain::{Result, TableRef, TablemaskError};
///
/// fn parse_target(raw: &str) -> Result<TableRef> {
///     TableRef::new(raw).map_err(TablemaskError::Configuration)
/// }
///
/// assert!(parse_target("public.users_masked").is_ok());
/// assert!(parse_target("").is_err());
/// ```
pub type Result<T> = std::result::Result<T, TablemaskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailureKind;

    fn rows_in(batch: &[u64]) -> Result<u64> {
        if batch.is_empty() {
            return Err(TablemaskError::SchemaMismatch("empty batch".to_string()));
        }
        Ok(batch.iter().sum())
    }

    #[test]
    fn test_question_mark_propagates() -> Result<()> {
        assert_eq!(rows_in(&[2, 3])?, 5);
        Ok(())
    }

    #[test]
    fn test_error_keeps_kind() {
        let err = rows_in(&[]).unwrap_err();
        assert_eq!(err.kind(), FailureKind::SchemaMismatch);
    }
}
