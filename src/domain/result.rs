//! Result type alias for hisseed

use super::errors::SeedError;

/// Result type alias for hisseed operations
///
/// # Examples
///
/// ```
/// use hisseed::domain::result::Result;
/// use hisseed::domain::errors::SeedError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SeedError::Configuration("missing base_url".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
