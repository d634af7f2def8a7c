//! Command orchestration
//!
//! Maps a parsed command onto workflow calls and renders the results. Kept apart
//! from `main.rs` so commands can run against any provider without clap or a
//! network connection.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::{Queue, DEVELOP_BRANCH};
use crate::provider::{BranchCreation, MergeOutcome, Provider};
use crate::ui;
use crate::workflow::{AcceptOutcome, DownloadOutcome, Workflow};

/// A release-train command, independent of how it was parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateCandidate,
    CreateHotfix,
    Accept { force: bool },
    Download { path: PathBuf, force: bool },
    Latest,
    Status,
}

/// Run one command against `workflow`
///
/// `confirm` is only consulted by `accept` when more than one branch is queued
/// and `force` is unset.
pub fn run_command<P, F>(workflow: &Workflow<P>, command: &Command, confirm: F) -> Result<()>
where
    P: Provider,
    F: FnOnce(&Queue) -> std::io::Result<bool>,
{
    let whatif = workflow.is_whatif();

    match command {
        Command::CreateCandidate => {
            ui::display_status(&format!(
                "Creating a release candidate from {}",
                DEVELOP_BRANCH
            ));
            let outcome = workflow
                .create_release_candidate()
                .context("Failed to create release candidate")?;
            ui::display_actions(&outcome.actions, whatif);
            if outcome.creation == Some(BranchCreation::AlreadyExists) {
                ui::display_status(&format!("Branch '{}' already exists", outcome.branch));
            }
            if outcome.merge == Some(MergeOutcome::NothingToMerge) {
                ui::display_status("Nothing to merge");
            }
        }
        Command::CreateHotfix => {
            ui::display_status("Creating a hotfix branch");
            let outcome = workflow
                .create_hotfix()
                .context("Failed to create hotfix branch")?;
            ui::display_actions(&outcome.actions, whatif);
            if outcome.creation == Some(BranchCreation::AlreadyExists) {
                ui::display_status(&format!("Branch '{}' already exists", outcome.branch));
            }
            ui::display_status(
                "Not merging automatically into a hotfix - hotfix patches should be sent as pull requests to it",
            );
        }
        Command::Accept { force } => {
            ui::display_status("Accepting the next branch in the queue");
            let outcome = workflow.accept_release_candidate(*force, |queue| {
                confirm(queue).map_err(crate::error::ReleaseTrainError::from)
            })?;
            match outcome {
                AcceptOutcome::NothingToAccept => {
                    ui::display_status("The queue is empty. Nothing to accept.");
                }
                AcceptOutcome::Cancelled { branch } => {
                    ui::display_status(&format!("Accepting '{}' cancelled by user", branch));
                }
                AcceptOutcome::Accepted(report) => {
                    ui::display_actions(&report.actions, whatif);
                    if report.merge == Some(MergeOutcome::NothingToMerge) {
                        ui::display_status(&format!(
                            "'{}' was already merged into the trunk",
                            report.branch
                        ));
                    }
                    if !report.pull_requests.is_empty() {
                        ui::display_status(
                            "These pull requests need to be reviewed and potential merge conflicts resolved:",
                        );
                        for pr in &report.pull_requests {
                            ui::display_status(&format!("  #{} {}", pr.number, pr.url));
                        }
                    }
                    ui::display_success(&format!(
                        "Accepted '{}' as release {}",
                        report.branch, report.tag
                    ));
                }
            }
        }
        Command::Download { path, force } => {
            ui::display_status("Downloading the next release in the queue");
            match workflow.download_next_in_queue(path, *force)? {
                DownloadOutcome::QueueEmpty => {
                    ui::display_status("The queue is empty. Nothing to download.");
                }
                DownloadOutcome::Downloaded {
                    actions, warnings, ..
                } => {
                    for warning in &warnings {
                        ui::display_boundary_warning(warning);
                    }
                    ui::display_actions(&actions, whatif);
                }
            }
        }
        Command::Latest => {
            let latest = workflow.latest_version()?;
            println!("{}", ui::formatter::format_latest(&latest));
        }
        Command::Status => {
            let report = workflow.status()?;
            ui::display_status_report(&report);
        }
    }

    Ok(())
}
