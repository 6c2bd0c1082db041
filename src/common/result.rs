use crate::common::error::GitstuffError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use gitstuff::common::result::GitstuffResult;
/// use gitstuff::common::error::GitstuffError;
///
/// fn example_function() -> GitstuffResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> GitstuffResult<()> {
///     Err(GitstuffError::config_error("no providers configured"))
/// }
/// ```
pub type GitstuffResult<T> = Result<T, GitstuffError>;

/// Conversion helpers from `Option` into [`GitstuffResult`].
pub trait OptionExt<T> {
    /// Turn `None` into a repository-not-found error for `query`.
    fn ok_or_not_found(self, query: impl Into<String>) -> GitstuffResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, query: impl Into<String>) -> GitstuffResult<T> {
        self.ok_or_else(|| GitstuffError::repository_not_found(query))
    }
}
