//! Release train workflow
//!
//! Assumes the following branch structure:
//!
//! - `develop`: the latest version of the code
//! - `release-X.Y.Z`: release candidates
//! - `hotfix-X.Y.Z`: urgent patches to the latest release
//! - `master`: always holds the latest release, tagged `vX.Y.Z`
//!
//! At most one hotfix and one release branch may be pending at a time. Nothing is
//! stored locally: every operation re-reads the latest release and the branch list
//! from the provider and rebuilds the queue.
//!
//! In what-if mode no mutating provider call is made, but every operation still
//! returns the [Action]s a real run would perform.

use crate::boundary::BoundaryWarning;
use crate::domain::branch::is_hotfix_branch;
use crate::domain::conventions::{branch_name_from_version, tag_from_branch};
use crate::domain::{
    build_queue, Queue, Version, DEVELOP_BRANCH, HOTFIX_PREFIX, MASTER_BRANCH,
    RELEASE_PREFIX,
};
use crate::error::{ReleaseTrainError, Result};
use crate::provider::{BranchCreation, MergeOutcome, Provider, PullRequest};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_PULL_REQUEST_BODY: &str = "Pull request was made automatically by release-train";

/// One intended change to the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateBranch { name: String },
    Merge { base: String, head: String, message: String },
    Tag { tag: String },
    PullRequest { base: String, head: String, title: String },
    Download { branch: String, destination: PathBuf },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CreateBranch { name } => {
                write!(f, "Create branch '{}' from {}", name, MASTER_BRANCH)
            }
            Action::Merge { base, head, .. } => write!(f, "Merge '{}' into '{}'", head, base),
            Action::Tag { tag } => write!(f, "Tag HEAD of {} as release {}", MASTER_BRANCH, tag),
            Action::PullRequest { base, head, .. } => {
                write!(f, "Open pull request from '{}' to '{}'", head, base)
            }
            Action::Download { branch, destination } => write!(
                f,
                "Download and extract '{}' to '{}'",
                branch,
                destination.display()
            ),
        }
    }
}

/// Result of creating a release candidate or hotfix branch
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub branch: String,
    /// `None` in what-if mode
    pub creation: Option<BranchCreation>,
    /// Merge of `develop` into the candidate; never attempted for hotfixes
    pub merge: Option<MergeOutcome>,
    pub actions: Vec<Action>,
}

/// Details of an accepted branch
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptReport {
    pub branch: String,
    pub tag: String,
    /// Branch queued behind the accepted one
    pub next: Option<String>,
    /// `None` in what-if mode
    pub merge: Option<MergeOutcome>,
    pub pull_requests: Vec<PullRequest>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    NothingToAccept,
    Cancelled { branch: String },
    Accepted(AcceptReport),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    QueueEmpty,
    Downloaded {
        branch: String,
        destination: PathBuf,
        actions: Vec<Action>,
        warnings: Vec<BoundaryWarning>,
    },
}

/// Snapshot of the release train for the `status` command
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub latest: Version,
    pub candidate: Version,
    pub hotfix: Version,
    pub branches: Vec<String>,
    pub queue: Queue,
    /// Open pull requests per queued branch, in queue order
    pub pull_request_counts: Vec<(String, usize)>,
}

/// Drives the release train against a [Provider]
pub struct Workflow<P: Provider> {
    provider: P,
    whatif: bool,
    pull_request_body: String,
}

impl<P: Provider> Workflow<P> {
    pub fn new(provider: P, whatif: bool) -> Self {
        Workflow {
            provider,
            whatif,
            pull_request_body: DEFAULT_PULL_REQUEST_BODY.to_string(),
        }
    }

    /// Body used for the pull requests opened when accepting a hotfix
    pub fn with_pull_request_body(mut self, body: impl Into<String>) -> Self {
        self.pull_request_body = body.into();
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn is_whatif(&self) -> bool {
        self.whatif
    }

    pub fn latest_version(&self) -> Result<Version> {
        self.provider.latest_release_tag()?.version()
    }

    pub fn candidate_version(&self) -> Result<Version> {
        self.latest_version()?.inc_minor()
    }

    pub fn hotfix_version(&self) -> Result<Version> {
        self.latest_version()?.inc_patch()
    }

    pub fn candidate_branch(&self) -> Result<String> {
        Ok(branch_name_from_version(
            &self.candidate_version()?,
            RELEASE_PREFIX,
        ))
    }

    pub fn hotfix_branch(&self) -> Result<String> {
        Ok(branch_name_from_version(
            &self.hotfix_version()?,
            HOTFIX_PREFIX,
        ))
    }

    /// Pending branches, hotfix first
    pub fn queue(&self) -> Result<Queue> {
        let branch_names = self.provider.branch_names()?;
        let current = self.latest_version()?;
        build_queue(&current, &branch_names)
    }

    fn plan(&self, actions: &mut Vec<Action>, action: Action) {
        if self.whatif {
            tracing::info!(%action, "what-if: skipping");
        } else {
            tracing::info!(%action, "executing");
        }
        actions.push(action);
    }

    fn merge_or_conflict(&self, base: &str, head: &str, message: &str) -> Result<MergeOutcome> {
        match self.provider.merge(base, head, message)? {
            MergeOutcome::Conflict { detail } => {
                tracing::error!(base, head, %detail, "merge conflict");
                Err(ReleaseTrainError::Conflict {
                    base: base.to_string(),
                    head: head.to_string(),
                })
            }
            outcome => Ok(outcome),
        }
    }

    /// Create `release-{latest.inc_minor()}` off the trunk and merge `develop` into it
    ///
    /// An existing candidate branch is reused. The candidate is then reviewed and
    /// eventually accepted.
    pub fn create_release_candidate(&self) -> Result<CreateOutcome> {
        let candidate = self.candidate_branch()?;
        let mut actions = Vec::new();

        self.plan(
            &mut actions,
            Action::CreateBranch {
                name: candidate.clone(),
            },
        );
        let creation = if self.whatif {
            None
        } else {
            Some(self.provider.create_branch_from_trunk(&candidate)?)
        };

        let message = merge_message(DEVELOP_BRANCH, &candidate);
        self.plan(
            &mut actions,
            Action::Merge {
                base: candidate.clone(),
                head: DEVELOP_BRANCH.to_string(),
                message: message.clone(),
            },
        );
        let merge = if self.whatif {
            None
        } else {
            Some(self.merge_or_conflict(&candidate, DEVELOP_BRANCH, &message)?)
        };

        Ok(CreateOutcome {
            branch: candidate,
            creation,
            merge,
            actions,
        })
    }

    /// Create `hotfix-{latest.inc_patch()}` off the trunk
    ///
    /// Nothing is merged automatically; fixes arrive as pull requests to the branch.
    pub fn create_hotfix(&self) -> Result<CreateOutcome> {
        let hotfix = self.hotfix_branch()?;
        let mut actions = Vec::new();

        self.plan(
            &mut actions,
            Action::CreateBranch {
                name: hotfix.clone(),
            },
        );
        let creation = if self.whatif {
            None
        } else {
            Some(self.provider.create_branch_from_trunk(&hotfix)?)
        };

        Ok(CreateOutcome {
            branch: hotfix,
            creation,
            merge: None,
            actions,
        })
    }

    /// Accept the head of the queue: merge it into the trunk, tag, and for hotfixes
    /// open pull requests into `develop` and the next queued release
    ///
    /// With more than one queued branch and `force` unset, `confirm` decides whether
    /// to go on; declining leaves the repository untouched.
    ///
    /// # Errors
    /// `Conflict` if the merge into the trunk conflicts; nothing is tagged and no pull
    /// request is opened. A failure after the merge leaves the merge in place; a re-run
    /// finds nothing to merge and continues with tagging.
    pub fn accept_release_candidate<F>(&self, force: bool, confirm: F) -> Result<AcceptOutcome>
    where
        F: FnOnce(&Queue) -> Result<bool>,
    {
        let queue = self.queue()?;

        let Some(branch) = queue.head().map(str::to_string) else {
            tracing::info!("queue is empty, nothing to accept");
            return Ok(AcceptOutcome::NothingToAccept);
        };
        let next = queue.next().map(str::to_string);

        if next.is_some() {
            if force {
                tracing::info!(%branch, "force set, accepting head of queue");
            } else if !confirm(&queue)? {
                tracing::info!(%branch, "accept cancelled by user");
                return Ok(AcceptOutcome::Cancelled { branch });
            }
        }

        let mut actions = Vec::new();

        let message = merge_message(&branch, MASTER_BRANCH);
        self.plan(
            &mut actions,
            Action::Merge {
                base: MASTER_BRANCH.to_string(),
                head: branch.clone(),
                message: message.clone(),
            },
        );
        let merge = if self.whatif {
            None
        } else {
            Some(self.merge_or_conflict(MASTER_BRANCH, &branch, &message)?)
        };

        let tag = tag_from_branch(&branch)?;
        self.plan(&mut actions, Action::Tag { tag: tag.clone() });
        if !self.whatif {
            self.provider.tag_trunk(&tag)?;
        }

        let mut pull_requests = Vec::new();
        if is_hotfix_branch(&branch) {
            let mut targets = vec![DEVELOP_BRANCH.to_string()];
            targets.extend(next.clone());

            for base in targets {
                let title = format!("Apply hotfix '{}' to '{}'", branch, base);
                self.plan(
                    &mut actions,
                    Action::PullRequest {
                        base: base.clone(),
                        head: branch.clone(),
                        title: title.clone(),
                    },
                );
                if !self.whatif {
                    pull_requests.push(self.provider.create_pull_request(
                        &base,
                        &branch,
                        &title,
                        &self.pull_request_body,
                    )?);
                }
            }
        }

        Ok(AcceptOutcome::Accepted(AcceptReport {
            branch,
            tag,
            next,
            merge,
            pull_requests,
            actions,
        }))
    }

    /// Download the head of the queue into `path/<branch>`
    ///
    /// # Errors
    /// `DestinationExists` if the target exists and `force` is unset.
    pub fn download_next_in_queue(&self, path: &Path, force: bool) -> Result<DownloadOutcome> {
        let queue = self.queue()?;
        let Some(branch) = queue.head().map(str::to_string) else {
            tracing::info!("queue is empty, nothing to download");
            return Ok(DownloadOutcome::QueueEmpty);
        };

        let mut warnings = queue.warnings().to_vec();
        if queue.len() > 1 {
            warnings.push(BoundaryWarning::QueueBacklog {
                head: branch.clone(),
                waiting: queue.iter().skip(1).map(str::to_string).collect(),
            });
        }

        let destination = path.join(&branch);
        if destination.exists() {
            if !force {
                return Err(ReleaseTrainError::DestinationExists(
                    destination.display().to_string(),
                ));
            }
            warnings.push(BoundaryWarning::DestinationOverwrite {
                path: destination.display().to_string(),
            });
        }

        let mut actions = Vec::new();
        self.plan(
            &mut actions,
            Action::Download {
                branch: branch.clone(),
                destination: destination.clone(),
            },
        );
        if !self.whatif {
            self.provider
                .download_and_extract_archive(&branch, &destination)?;
        }

        Ok(DownloadOutcome::Downloaded {
            branch,
            destination,
            actions,
            warnings,
        })
    }

    /// Versions, branches, queue and open pull requests per queued branch
    pub fn status(&self) -> Result<StatusReport> {
        let mut branches = self.provider.branch_names()?;
        branches.sort();
        let latest = self.latest_version()?;
        let queue = build_queue(&latest, &branches)?;

        let pull_request_counts = queue
            .iter()
            .map(|entry| {
                self.provider
                    .list_pull_requests(entry)
                    .map(|prs| (entry.to_string(), prs.len()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StatusReport {
            latest,
            candidate: latest.inc_minor()?,
            hotfix: latest.inc_patch()?,
            branches,
            queue,
            pull_request_counts,
        })
    }
}

fn merge_message(head: &str, base: &str) -> String {
    format!("Merging from '{}' to '{}'", head, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockProvider, ProviderCall};

    fn never_asked(_: &Queue) -> Result<bool> {
        panic!("confirmation should not be requested");
    }

    #[test]
    fn test_versions_from_latest_release() {
        let workflow = Workflow::new(MockProvider::with_release("v1.3.0", &[]), false);
        assert_eq!(workflow.latest_version().unwrap(), Version::new(1, 3, 0));
        assert_eq!(workflow.candidate_branch().unwrap(), "release-1.4.0");
        assert_eq!(workflow.hotfix_branch().unwrap(), "hotfix-1.3.1");
    }

    #[test]
    fn test_malformed_latest_tag() {
        let workflow = Workflow::new(MockProvider::with_release("latest", &[]), false);
        let err = workflow.latest_version().unwrap_err();
        assert!(matches!(err, ReleaseTrainError::Format(_)));
    }

    #[test]
    fn test_create_candidate_merges_develop() {
        let workflow = Workflow::new(
            MockProvider::with_release("v1.3.0", &["master", "develop"]),
            false,
        );
        let outcome = workflow.create_release_candidate().unwrap();
        assert_eq!(outcome.branch, "release-1.4.0");
        assert_eq!(outcome.creation, Some(BranchCreation::Created));
        assert_eq!(outcome.merge, Some(MergeOutcome::Merged));
        assert_eq!(
            workflow.provider().mutating_calls(),
            vec![
                ProviderCall::CreateBranch {
                    name: "release-1.4.0".to_string()
                },
                ProviderCall::Merge {
                    base: "release-1.4.0".to_string(),
                    head: "develop".to_string(),
                    message: "Merging from 'develop' to 'release-1.4.0'".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_create_candidate_reuses_existing_branch() {
        let workflow = Workflow::new(
            MockProvider::with_release("v1.3.0", &["master", "develop", "release-1.4.0"]),
            false,
        );
        let outcome = workflow.create_release_candidate().unwrap();
        assert_eq!(outcome.creation, Some(BranchCreation::AlreadyExists));
    }

    #[test]
    fn test_create_hotfix_does_not_merge() {
        let workflow = Workflow::new(MockProvider::with_release("v1.3.0", &["master"]), false);
        let outcome = workflow.create_hotfix().unwrap();
        assert_eq!(outcome.branch, "hotfix-1.3.1");
        assert_eq!(outcome.merge, None);
        assert_eq!(workflow.provider().mutating_calls().len(), 1);
    }

    #[test]
    fn test_accept_release_opens_no_pull_requests() {
        let workflow = Workflow::new(
            MockProvider::with_release("v1.3.0", &["master", "develop", "release-1.4.0"]),
            false,
        );
        let outcome = workflow.accept_release_candidate(false, never_asked).unwrap();
        let AcceptOutcome::Accepted(report) = outcome else {
            panic!("expected accepted outcome");
        };
        assert_eq!(report.tag, "v1.4.0");
        assert!(report.pull_requests.is_empty());
        assert_eq!(workflow.provider().created_tags(), vec!["v1.4.0"]);
    }

    #[test]
    fn test_action_display() {
        let action = Action::PullRequest {
            base: "develop".to_string(),
            head: "hotfix-1.3.1".to_string(),
            title: "t".to_string(),
        };
        assert_eq!(
            action.to_string(),
            "Open pull request from 'hotfix-1.3.1' to 'develop'"
        );
    }
}
