use crate::domain::{Tag, MASTER_BRANCH};
use crate::error::{ReleaseTrainError, Result};
use crate::provider::{BranchCreation, MergeOutcome, PullRequest, Provider};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A call received by [MockProvider], in the order it arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    LatestReleaseTag,
    BranchNames,
    CreateBranch { name: String },
    Merge { base: String, head: String, message: String },
    TagTrunk { tag: String },
    CreatePullRequest { base: String, head: String, title: String },
    DownloadArchive { branch: String, destination: PathBuf },
    ListPullRequests { base: String },
}

impl ProviderCall {
    /// Whether the call changes remote state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ProviderCall::CreateBranch { .. }
                | ProviderCall::Merge { .. }
                | ProviderCall::TagTrunk { .. }
                | ProviderCall::CreatePullRequest { .. }
                | ProviderCall::DownloadArchive { .. }
        )
    }
}

#[derive(Default)]
struct MockState {
    latest_tag: Option<String>,
    branches: BTreeSet<String>,
    tags: Vec<String>,
    merge_outcomes: HashMap<(String, String), MergeOutcome>,
    pull_requests: Vec<PullRequest>,
    fail_tagging: bool,
    fail_pull_requests: bool,
}

/// Mock provider for testing without a hosting service
///
/// Merges succeed unless an outcome is configured for the `(base, head)` pair.
/// Accepted tags become the latest release, so a second run sees the new state.
pub struct MockProvider {
    state: Mutex<MockState>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockProvider {
    /// Create a new mock with no releases and no branches
    pub fn new() -> Self {
        MockProvider {
            state: Mutex::new(MockState::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose latest release is `tag`, holding the given branches
    pub fn with_release(tag: &str, branches: &[&str]) -> Self {
        let mut provider = MockProvider::new();
        provider.set_latest_tag(tag);
        for branch in branches {
            provider.add_branch(*branch);
        }
        provider
    }

    pub fn set_latest_tag(&mut self, tag: impl Into<String>) {
        self.state_mut().latest_tag = Some(tag.into());
    }

    pub fn add_branch(&mut self, name: impl Into<String>) {
        self.state_mut().branches.insert(name.into());
    }

    /// Configure the outcome of merging `head` into `base`
    pub fn set_merge_outcome(&mut self, base: &str, head: &str, outcome: MergeOutcome) {
        self.state_mut()
            .merge_outcomes
            .insert((base.to_string(), head.to_string()), outcome);
    }

    pub fn add_pull_request(&mut self, pr: PullRequest) {
        self.state_mut().pull_requests.push(pr);
    }

    /// Make every tag request fail with a provider error
    pub fn fail_tagging(&mut self) {
        self.state_mut().fail_tagging = true;
    }

    pub fn fail_pull_requests(&mut self) {
        self.state_mut().fail_pull_requests = true;
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls that would have changed remote state
    pub fn mutating_calls(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(ProviderCall::is_mutating)
            .collect()
    }

    /// Tags created through [Provider::tag_trunk]
    pub fn created_tags(&self) -> Vec<String> {
        self.lock_state().map(|s| s.tags.clone()).unwrap_or_default()
    }

    fn state_mut(&mut self) -> &mut MockState {
        // a poisoned lock only means another test thread panicked
        match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| ReleaseTrainError::provider("mock state lock poisoned"))
    }

    fn record(&self, call: ProviderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for MockProvider {
    fn latest_release_tag(&self) -> Result<Tag> {
        self.record(ProviderCall::LatestReleaseTag);
        self.lock_state()?
            .latest_tag
            .clone()
            .map(Tag::new)
            .ok_or_else(|| ReleaseTrainError::not_found("No release has been published yet"))
    }

    fn branch_names(&self) -> Result<Vec<String>> {
        self.record(ProviderCall::BranchNames);
        Ok(self.lock_state()?.branches.iter().cloned().collect())
    }

    fn create_branch_from_trunk(&self, name: &str) -> Result<BranchCreation> {
        self.record(ProviderCall::CreateBranch {
            name: name.to_string(),
        });
        if self.lock_state()?.branches.insert(name.to_string()) {
            Ok(BranchCreation::Created)
        } else {
            Ok(BranchCreation::AlreadyExists)
        }
    }

    fn merge(&self, base: &str, head: &str, message: &str) -> Result<MergeOutcome> {
        self.record(ProviderCall::Merge {
            base: base.to_string(),
            head: head.to_string(),
            message: message.to_string(),
        });
        let state = self.lock_state()?;
        if !state.branches.contains(base) && base != MASTER_BRANCH {
            return Err(ReleaseTrainError::provider(format!(
                "Unexpected result code (404): base branch '{}' not found",
                base
            )));
        }
        Ok(state
            .merge_outcomes
            .get(&(base.to_string(), head.to_string()))
            .cloned()
            .unwrap_or(MergeOutcome::Merged))
    }

    fn tag_trunk(&self, tag_name: &str) -> Result<()> {
        self.record(ProviderCall::TagTrunk {
            tag: tag_name.to_string(),
        });
        let mut state = self.lock_state()?;
        if state.fail_tagging {
            return Err(ReleaseTrainError::provider(format!(
                "Unexpected result code (500) tagging '{}'",
                tag_name
            )));
        }
        state.tags.push(tag_name.to_string());
        state.latest_tag = Some(tag_name.to_string());
        Ok(())
    }

    fn create_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        _body: &str,
    ) -> Result<PullRequest> {
        self.record(ProviderCall::CreatePullRequest {
            base: base.to_string(),
            head: head.to_string(),
            title: title.to_string(),
        });
        let mut state = self.lock_state()?;
        if state.fail_pull_requests {
            return Err(ReleaseTrainError::provider(format!(
                "Unexpected result code (422) creating pull request '{}' -> '{}'",
                head, base
            )));
        }
        let number = state.pull_requests.len() as u64 + 1;
        let pr = PullRequest {
            number,
            title: title.to_string(),
            head: head.to_string(),
            base: base.to_string(),
            url: format!("mock://pulls/{}", number),
        };
        state.pull_requests.push(pr.clone());
        Ok(pr)
    }

    fn download_and_extract_archive(&self, branch: &str, destination: &Path) -> Result<()> {
        self.record(ProviderCall::DownloadArchive {
            branch: branch.to_string(),
            destination: destination.to_path_buf(),
        });
        fs::create_dir_all(destination)?;
        fs::write(destination.join("BRANCH"), branch)?;
        Ok(())
    }

    fn list_pull_requests(&self, base: &str) -> Result<Vec<PullRequest>> {
        self.record(ProviderCall::ListPullRequests {
            base: base.to_string(),
        });
        Ok(self
            .lock_state()?
            .pull_requests
            .iter()
            .filter(|pr| pr.base == base)
            .cloned()
            .collect())
    }
}
