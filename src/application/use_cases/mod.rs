pub mod clone_repositories;
pub mod list_repositories;

pub use clone_repositories::{
    CloneEvent, CloneRepositoriesConfig, CloneRepositoriesUseCase, CloneSummary, CloneTarget,
    ProcessedRepository, ProgressCallback, RepositoryOutcome,
};
pub use list_repositories::{
    ListRepositoriesConfig, ListRepositoriesUseCase, ListedRepository, ProviderTreeListing,
    RepositoryListing, RepositoryTreeListing, StatusOutcome, TreeSelection,
};
