//! Result type alias for gridload

use super::errors::GridloadError;

/// Result type alias for gridload operations
///
/// # Examples
///
/// ```
/// use gridload::domain::result::Result;
/// use gridload::domain::errors::GridloadError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(GridloadError::Trigger("no records".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, GridloadError>;
