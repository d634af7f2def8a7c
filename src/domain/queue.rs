//! Release queue derivation
//!
//! The queue is rebuilt from the latest released version and a snapshot of branch
//! names every time it is needed. It holds at most one pending hotfix followed by
//! at most one pending release; a hotfix always ships first, whatever the versions.

use crate::boundary::BoundaryWarning;
use crate::domain::branch::{self, BranchKind};
use crate::domain::version::Version;
use crate::error::{ReleaseTrainError, Result};

/// Branches awaiting acceptance into the trunk, head first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    entries: Vec<String>,
    warnings: Vec<BoundaryWarning>,
}

/// State of the release train, as implied by the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    Idle,
    HotfixPending,
    ReleasePending,
    HotfixAndReleasePending,
}

impl Queue {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn warnings(&self) -> &[BoundaryWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Branch that would be accepted next
    pub fn head(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    /// Branch queued behind the head, if any
    pub fn next(&self) -> Option<&str> {
        self.entries.get(1).map(String::as_str)
    }

    pub fn contains(&self, branch: &str) -> bool {
        self.entries.iter().any(|entry| entry == branch)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn state(&self) -> TrainState {
        let hotfix = self.iter().any(branch::is_hotfix_branch);
        let release = self.iter().any(branch::is_release_branch);
        match (hotfix, release) {
            (false, false) => TrainState::Idle,
            (true, false) => TrainState::HotfixPending,
            (false, true) => TrainState::ReleasePending,
            (true, true) => TrainState::HotfixAndReleasePending,
        }
    }
}

/// A hotfix is pending if it patches the current major.minor line past the current patch
pub fn is_pending_hotfix(current: &Version, candidate: &Version) -> bool {
    candidate.major == current.major
        && candidate.minor == current.minor
        && candidate.patch > current.patch
}

/// A release is pending if it moves major or minor forward; patch is not compared
pub fn is_pending_release(current: &Version, candidate: &Version) -> bool {
    candidate.major > current.major
        || (candidate.major == current.major && candidate.minor > current.minor)
}

/// Build the queue from the current released version and a snapshot of branch names
///
/// # Errors
/// `Workflow` if more than one hotfix or more than one release branch is pending.
pub fn build_queue<S: AsRef<str>>(current: &Version, branch_names: &[S]) -> Result<Queue> {
    let mut warnings = Vec::new();

    let mut pending = |names: Vec<&str>, is_pending: fn(&Version, &Version) -> bool| {
        let mut found: Vec<String> = Vec::new();
        for name in names {
            match branch::branch_version(name) {
                Ok(version) if is_pending(current, &version) => found.push(name.to_string()),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(branch = name, error = %e, "skipping malformed branch");
                    warnings.push(BoundaryWarning::MalformedBranch {
                        branch: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        found.sort();
        found
    };

    let hotfixes = pending(branch::hotfix_branches(branch_names), is_pending_hotfix);
    let releases = pending(branch::release_branches(branch_names), is_pending_release);

    check_single(BranchKind::Hotfix, &hotfixes)?;
    check_single(BranchKind::Release, &releases)?;

    let mut entries = hotfixes;
    entries.extend(releases);

    tracing::debug!(current = %current, queue = ?entries, "built release queue");

    Ok(Queue { entries, warnings })
}

fn check_single(kind: BranchKind, pending: &[String]) -> Result<()> {
    if pending.len() > 1 {
        let label = kind.prefix().unwrap_or("branch");
        return Err(ReleaseTrainError::workflow(format!(
            "Unexpected number of pending {} branches: {} ({})",
            label,
            pending.len(),
            pending.join(", ")
        )));
    }
    Ok(())
}
