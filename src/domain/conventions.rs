//! Naming conventions between versions, tags and branches
//!
//! - tags are `v{version}`
//! - candidate branches are `release-{version}`, hotfix branches `hotfix-{version}`

use crate::domain::branch::{HOTFIX_PREFIX, RELEASE_PREFIX};
use crate::domain::version::Version;
use crate::error::{ReleaseTrainError, Result};

pub use crate::domain::tag::version_from_tag;

/// Branch name for a version, e.g. `release-1.4.0`
pub fn branch_name_from_version(version: &Version, prefix: &str) -> String {
    format!("{}-{}", prefix, version)
}

/// Tag used when accepting a branch into the trunk
///
/// Derived from the branch name by swapping the prefix for `v`, so the tag always
/// matches the branch that was merged. Any suffix is kept verbatim.
pub fn tag_from_branch(branch_name: &str) -> Result<String> {
    [RELEASE_PREFIX, HOTFIX_PREFIX]
        .iter()
        .find_map(|prefix| {
            branch_name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('-'))
        })
        .map(|rest| format!("v{}", rest))
        .ok_or_else(|| {
            ReleaseTrainError::format(format!(
                "Branch '{}' is neither a release nor a hotfix branch",
                branch_name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_from_version() {
        let v = Version::new(1, 4, 0);
        assert_eq!(branch_name_from_version(&v, "release"), "release-1.4.0");
        assert_eq!(branch_name_from_version(&v, "hotfix"), "hotfix-1.4.0");
    }

    #[test]
    fn test_tag_from_branch() {
        assert_eq!(tag_from_branch("release-1.4.0").unwrap(), "v1.4.0");
        assert_eq!(tag_from_branch("hotfix-1.3.1").unwrap(), "v1.3.1");
    }

    #[test]
    fn test_tag_from_branch_keeps_suffix() {
        assert_eq!(tag_from_branch("release-2.0.0-beta").unwrap(), "v2.0.0-beta");
    }

    #[test]
    fn test_tag_from_branch_rejects_other_branches() {
        assert!(tag_from_branch("develop").is_err());
        assert!(tag_from_branch("master").is_err());
        assert!(tag_from_branch("feature-1.0.0").is_err());
    }

    #[test]
    fn test_tag_round_trips_through_version() {
        let v = Version::new(3, 1, 4);
        let branch = branch_name_from_version(&v, RELEASE_PREFIX);
        let tag = tag_from_branch(&branch).unwrap();
        assert_eq!(version_from_tag(&tag).unwrap(), v);
    }
}
