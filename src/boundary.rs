use std::fmt;

/// Warnings raised while reading the release train from remote state.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A release/hotfix branch whose name does not carry a valid version
    MalformedBranch { branch: String, reason: String },
    /// More than one branch is queued; only the head is acted on
    QueueBacklog { head: String, waiting: Vec<String> },
    /// Download target exists and will be written into because of --force
    DestinationOverwrite { path: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::MalformedBranch { branch, reason } => {
                write!(f, "Ignoring branch '{}': {}", branch, reason)
            }
            BoundaryWarning::QueueBacklog { head, waiting } => {
                write!(
                    f,
                    "More than one item in the queue; using '{}' (waiting: {})",
                    head,
                    waiting.join(", ")
                )
            }
            BoundaryWarning::DestinationOverwrite { path } => {
                write!(f, "Destination '{}' already exists, extracting over it", path)
            }
        }
    }
}
