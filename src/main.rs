use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use release_train::cli::{run_command, Command};
use release_train::config::{self, Config};
use release_train::credentials::load_access_token;
use release_train::provider::GitHubProvider;
use release_train::{logging, ui, ReleaseTrainError, Workflow};

#[derive(Parser)]
#[command(
    name = "release-train",
    version,
    about = "Drive a branch-based release train: candidates, hotfixes and accepting them into master"
)]
struct Args {
    #[arg(long, global = true, help = "Report what would happen without making changes")]
    whatif: bool,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "File holding the GitHub access token")]
    token_file: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the next release candidate branch from master and merge develop into it
    #[command(name = "create-cand")]
    CreateCand { owner: String, repo: String },

    /// Create the next hotfix branch from master
    #[command(name = "create-hotfix")]
    CreateHotfix { owner: String, repo: String },

    /// Accept the next branch in the queue into master
    Accept {
        owner: String,
        repo: String,
        #[arg(short, long, help = "Skip confirmation when more than one branch is queued")]
        force: bool,
    },

    /// Download the next branch in the queue into <path>/<branch>
    Download {
        owner: String,
        repo: String,
        path: PathBuf,
        #[arg(short, long, help = "Extract even if the destination already exists")]
        force: bool,
    },

    /// Print the latest released version
    Latest { owner: String, repo: String },

    /// Show versions, branches and the release queue
    Status { owner: String, repo: String },
}

impl Commands {
    fn split(self) -> (String, String, Command) {
        match self {
            Commands::CreateCand { owner, repo } => (owner, repo, Command::CreateCandidate),
            Commands::CreateHotfix { owner, repo } => (owner, repo, Command::CreateHotfix),
            Commands::Accept { owner, repo, force } => (owner, repo, Command::Accept { force }),
            Commands::Download {
                owner,
                repo,
                path,
                force,
            } => (owner, repo, Command::Download { path, force }),
            Commands::Latest { owner, repo } => (owner, repo, Command::Latest),
            Commands::Status { owner, repo } => (owner, repo, Command::Status),
        }
    }
}

fn build_workflow(
    config: &Config,
    token_file: Option<&Path>,
    owner: String,
    repo: String,
    whatif: bool,
) -> Result<Workflow<GitHubProvider>> {
    let token_path = token_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.provider.token_file));
    let token = load_access_token(&token_path)?;

    let provider = GitHubProvider::new(owner, repo, token, &config.provider)
        .context("Failed to set up GitHub client")?;

    Ok(Workflow::new(provider, whatif)
        .with_pull_request_body(config.behavior.pull_request_body.clone()))
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    if args.whatif {
        ui::display_whatif_banner();
    }

    let (owner, repo, command) = args.command.split();
    let workflow = build_workflow(&config, args.token_file.as_deref(), owner, repo, args.whatif)?;

    run_command(&workflow, &command, ui::confirm_accept)
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let conflict = e
                .downcast_ref::<ReleaseTrainError>()
                .is_some_and(ReleaseTrainError::is_conflict);
            ui::display_error(&format!("{:#}", e));
            if conflict {
                ui::display_status("The accept was aborted before tagging; no pull requests were opened.");
            }
            ExitCode::FAILURE
        }
    }
}
