//! Nested group hierarchy built from flat provider listings.
//!
//! A provider reports repositories by full path only (`team-a/backend/api`).
//! [`RepositoryTree::build`] turns such a list into groups and subgroups,
//! with the nesting depth decided by the provider's [`GroupNesting`] policy.

use std::collections::BTreeMap;

use serde::Serialize;

use super::repository::{Group, Repository};

/// How many leading path segments become groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupNesting {
    /// Every segment except the last is a group
    Unlimited,
    /// At most this many leading segments are groups; deeper segments are
    /// folded into the last group
    MaxDepth(usize),
}

impl GroupNesting {
    /// Number of group levels for a path with `available` group segments
    fn depth_for(self, available: usize) -> usize {
        match self {
            GroupNesting::Unlimited => available,
            GroupNesting::MaxDepth(max) => available.min(max.max(1)),
        }
    }
}

/// A group with its child groups and direct repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    pub group: Group,
    pub sub_groups: BTreeMap<String, GroupNode>,
    pub repositories: Vec<Repository>,
}

impl GroupNode {
    fn new(group: Group) -> Self {
        Self {
            group,
            sub_groups: BTreeMap::new(),
            repositories: Vec::new(),
        }
    }

    /// Repositories in this group and all subgroups
    pub fn repository_count(&self) -> usize {
        self.repositories.len()
            + self
                .sub_groups
                .values()
                .map(GroupNode::repository_count)
                .sum::<usize>()
    }

    /// Direct repositories first, then each subgroup in name order
    pub fn all_repositories(&self) -> Vec<&Repository> {
        let mut out: Vec<&Repository> = self.repositories.iter().collect();
        for child in self.sub_groups.values() {
            out.extend(child.all_repositories());
        }
        out
    }
}

/// Root of a provider's repository hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryTree {
    /// Top-level groups by name
    pub groups: BTreeMap<String, GroupNode>,
    /// Repositories whose full path has no `/`
    pub repositories: Vec<Repository>,
}

impl RepositoryTree {
    /// Build a tree from a flat listing.
    ///
    /// Never fails. Segments are taken as given; callers are expected to
    /// have dropped malformed paths already.
    pub fn build(repositories: impl IntoIterator<Item = Repository>, nesting: GroupNesting) -> Self {
        let mut tree = Self::default();
        for repository in repositories {
            tree.insert(repository, nesting);
        }
        tree
    }

    fn insert(&mut self, repository: Repository, nesting: GroupNesting) {
        let segments: Vec<String> = repository
            .full_path
            .split('/')
            .map(str::to_owned)
            .collect();

        if segments.len() == 1 {
            self.repositories.push(repository);
            return;
        }

        let depth = nesting.depth_for(segments.len() - 1);
        let provider = repository.provider;
        let make_node = |index: usize| {
            let full_path = segments[..=index].join("/");
            GroupNode::new(Group::new(
                provider,
                full_path.clone(),
                segments[index].clone(),
                full_path,
            ))
        };

        let mut node = self
            .groups
            .entry(segments[0].clone())
            .or_insert_with(|| make_node(0));
        for index in 1..depth {
            node = node
                .sub_groups
                .entry(segments[index].clone())
                .or_insert_with(|| make_node(index));
        }
        node.repositories.push(repository);
    }

    /// Find the group node at `path` (e.g. `team-a/backend`).
    ///
    /// Exact segment-by-segment walk; any missing segment yields `None`.
    pub fn find_group(&self, path: &str) -> Option<&GroupNode> {
        let mut segments = path.split('/');
        let mut node = self.groups.get(segments.next()?)?;
        for segment in segments {
            node = node.sub_groups.get(segment)?;
        }
        Some(node)
    }

    /// Root repositories first, then every group in name order
    pub fn all_repositories(&self) -> Vec<&Repository> {
        let mut out: Vec<&Repository> = self.repositories.iter().collect();
        for node in self.groups.values() {
            out.extend(node.all_repositories());
        }
        out
    }

    /// Total number of repositories in the tree
    pub fn repository_count(&self) -> usize {
        self.repositories.len()
            + self
                .groups
                .values()
                .map(GroupNode::repository_count)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty() && self.groups.is_empty()
    }
}
