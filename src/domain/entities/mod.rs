pub mod repository;
pub mod repository_tree;

pub use repository::{filter_by_group, Group, Repository};
pub use repository_tree::{GroupNesting, GroupNode, RepositoryTree};
