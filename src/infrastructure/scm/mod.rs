/// Hosting-provider API clients
///
/// Each provider (GitLab, GitHub) implements [`ScmClient`] by translating
/// its paginated REST listings into the common repository model.
pub mod github_scm;
pub mod gitlab_scm;
pub mod scm_factory;
pub mod scm_interface;

pub use github_scm::GitHubClient;
pub use gitlab_scm::GitLabClient;
pub use scm_factory::ScmFactory;
pub use scm_interface::{ScmClient, ScmError};
