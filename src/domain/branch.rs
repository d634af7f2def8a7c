use crate::domain::version::Version;
use crate::error::{ReleaseTrainError, Result};

/// Trunk: always holds the latest tagged release
pub const MASTER_BRANCH: &str = "master";
/// Integration branch with the newest unreleased work
pub const DEVELOP_BRANCH: &str = "develop";
pub const RELEASE_PREFIX: &str = "release";
pub const HOTFIX_PREFIX: &str = "hotfix";

/// Kind of a branch, derived from its name alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Master,
    Develop,
    Release,
    Hotfix,
    Other,
}

impl BranchKind {
    pub fn of(name: &str) -> Self {
        match name {
            MASTER_BRANCH => BranchKind::Master,
            DEVELOP_BRANCH => BranchKind::Develop,
            _ if has_prefix(name, RELEASE_PREFIX) => BranchKind::Release,
            _ if has_prefix(name, HOTFIX_PREFIX) => BranchKind::Hotfix,
            _ => BranchKind::Other,
        }
    }

    /// Prefix used when naming branches of this kind, if any
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            BranchKind::Release => Some(RELEASE_PREFIX),
            BranchKind::Hotfix => Some(HOTFIX_PREFIX),
            _ => None,
        }
    }
}

fn has_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('-'))
}

pub fn is_hotfix_branch(name: &str) -> bool {
    BranchKind::of(name) == BranchKind::Hotfix
}

pub fn is_release_branch(name: &str) -> bool {
    BranchKind::of(name) == BranchKind::Release
}

/// Branch names carrying the hotfix prefix, in input order
pub fn hotfix_branches<S: AsRef<str>>(branch_names: &[S]) -> Vec<&str> {
    branch_names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| is_hotfix_branch(name))
        .collect()
}

/// Branch names carrying the release prefix, in input order
pub fn release_branches<S: AsRef<str>>(branch_names: &[S]) -> Vec<&str> {
    branch_names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| is_release_branch(name))
        .collect()
}

/// Version encoded in a release or hotfix branch name (text after the first `-`)
pub fn branch_version(name: &str) -> Result<Version> {
    let (_, version) = name.split_once('-').ok_or_else(|| {
        ReleaseTrainError::format(format!("Branch '{}' does not carry a version", name))
    })?;
    Version::parse(version)
}
