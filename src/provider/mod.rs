//! Source-control provider abstraction
//!
//! The release workflow never talks to a hosting service directly. It goes through
//! the [Provider] trait, which exposes the handful of remote operations a release
//! train needs: reading the latest release and the branch list, creating branches,
//! merging, tagging, opening pull requests and downloading archives.
//!
//! # Implementations
//!
//! - [github::GitHubProvider]: GitHub REST API over a blocking HTTP client
//! - [mock::MockProvider]: in-memory provider that records every call, for tests
//!
//! Code should depend on the trait rather than a concrete implementation:
//!
//! ```rust
//! # use release_train::provider::Provider;
//! # fn example<P: Provider>(provider: &P) -> release_train::Result<()> {
//! let tag = provider.latest_release_tag()?;
//! let branches = provider.branch_names()?;
//! println!("{} with {} branches", tag, branches.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod github;
pub mod mock;

pub use github::GitHubProvider;
pub use mock::{MockProvider, ProviderCall};

use crate::domain::Tag;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of asking the provider to create a branch off the trunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCreation {
    Created,
    AlreadyExists,
}

/// Result of a merge request
///
/// A conflict is an expected outcome that needs a human, not a fault, so it is a
/// variant here. Transport failures and unexpected responses are `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    NothingToMerge,
    Conflict { detail: String },
}

/// An open pull request as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub head: String,
    pub base: String,
    pub url: String,
}

/// Remote operations needed to drive a release train
///
/// ## Thread Safety
///
/// Implementors must be `Send + Sync`.
///
/// ## Error Handling
///
/// Any unexpected response maps to [crate::error::ReleaseTrainError::Provider];
/// a missing resource maps to [crate::error::ReleaseTrainError::NotFound].
/// Nothing is retried.
pub trait Provider: Send + Sync {
    /// Tag of the latest published release
    ///
    /// # Returns
    /// * `Ok(Tag)` - e.g. `v1.3.0`
    /// * `Err(NotFound)` - if the repository has no release yet
    fn latest_release_tag(&self) -> Result<Tag>;

    /// Names of all branches in the repository, in no particular order
    fn branch_names(&self) -> Result<Vec<String>>;

    /// Create `name` pointing at the current trunk head
    ///
    /// An existing branch is reported as [BranchCreation::AlreadyExists], not an error.
    fn create_branch_from_trunk(&self, name: &str) -> Result<BranchCreation>;

    /// Merge `head` into `base` with the given commit message
    fn merge(&self, base: &str, head: &str, message: &str) -> Result<MergeOutcome>;

    /// Tag the trunk's current head as release `tag_name`
    fn tag_trunk(&self, tag_name: &str) -> Result<()>;

    /// Open a pull request from `head` into `base`
    fn create_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest>;

    /// Fetch the source archive of `branch` and extract it into `destination`
    fn download_and_extract_archive(&self, branch: &str, destination: &Path) -> Result<()>;

    /// Open pull requests targeting `base`
    fn list_pull_requests(&self, base: &str) -> Result<Vec<PullRequest>>;
}
