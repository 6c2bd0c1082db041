use thiserror::Error;

/// Reasons a provider-reported full path cannot be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FullPathError {
    #[error("full path is empty")]
    Empty,

    #[error("full path '{path}' contains an empty segment")]
    EmptySegment { path: String },
}

/// Check that `path` is a non-empty `/`-separated path without empty
/// segments (no leading, trailing or doubled slashes).
///
/// Provider clients call this on every record they receive; records that
/// fail are dropped before they reach the tree builder.
pub fn validate_full_path(path: &str) -> Result<(), FullPathError> {
    if path.is_empty() {
        return Err(FullPathError::Empty);
    }
    if path.split('/').any(str::is_empty) {
        return Err(FullPathError::EmptySegment {
            path: path.to_string(),
        });
    }
    Ok(())
}
