/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Provider API clients over an HTTP transport
/// - Local git operations through the `git` executable
/// - Configuration file storage and local path resolution
pub mod filesystem;
pub mod git;
pub mod http;
pub mod scm;

// Re-export commonly used types
pub use filesystem::{ConfigStore, PathResolver};
pub use git::{GitCli, GitOperations, LocalStatus};
pub use http::{HttpTransport, ReqwestTransport};
pub use scm::{ScmClient, ScmError, ScmFactory};
