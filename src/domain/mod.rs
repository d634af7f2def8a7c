//! Domain logic - pure release-train rules independent of any provider

pub mod branch;
pub mod conventions;
pub mod queue;
pub mod tag;
pub mod version;

pub use branch::{BranchKind, DEVELOP_BRANCH, HOTFIX_PREFIX, MASTER_BRANCH, RELEASE_PREFIX};
pub use queue::{build_queue, Queue, TrainState};
pub use tag::Tag;
pub use version::Version;
