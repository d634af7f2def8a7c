use crate::domain::version::Version;
use crate::error::{ReleaseTrainError, Result};
use std::fmt;

/// Pattern release tags must start with; anything after the patch digits is ignored
const TAG_PATTERN: &str = r"^v(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)";

/// A release tag as reported by the provider (e.g. `v1.4.0`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Tag for a version, `v{version}`
    pub fn for_version(version: &Version) -> Self {
        Tag::new(format!("v{}", version))
    }

    /// Extract the version this tag names
    pub fn version(&self) -> Result<Version> {
        version_from_tag(&self.name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Parse the version out of a release tag (e.g., "v1.2.3" -> Version(1,2,3))
///
/// The match is anchored at the start of the tag only, so `v1.2.3-rc1` reads as `1.2.3`.
pub fn version_from_tag(tag: &str) -> Result<Version> {
    let re = regex::Regex::new(TAG_PATTERN)
        .map_err(|e| ReleaseTrainError::format(format!("Invalid tag pattern: {}", e)))?;

    let caps = re.captures(tag).ok_or_else(|| {
        ReleaseTrainError::format(format!(
            "Tag '{}' does not match the release tag format vX.Y.Z",
            tag
        ))
    })?;

    let component = |name: &str| -> Result<u32> {
        caps[name].parse::<u32>().map_err(|_| {
            ReleaseTrainError::format(format!("Tag '{}' has an out of range {} component", tag, name))
        })
    };

    Ok(Version::new(
        component("major")?,
        component("minor")?,
        component("patch")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_tag() {
        assert_eq!(version_from_tag("v1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_from_tag_requires_prefix() {
        let err = version_from_tag("1.2.3").unwrap_err();
        assert!(matches!(err, ReleaseTrainError::Format(_)));
        assert!(version_from_tag("V1.2.3").is_err());
        assert!(version_from_tag("release-1.2.3").is_err());
    }

    #[test]
    fn test_version_from_tag_malformed() {
        assert!(version_from_tag("v1.2").is_err());
        assert!(version_from_tag("v1x2x3").is_err());
        assert!(version_from_tag("").is_err());
    }

    #[test]
    fn test_version_from_tag_ignores_suffix() {
        assert_eq!(
            version_from_tag("v2.0.1-rc1").unwrap(),
            Version::new(2, 0, 1)
        );
    }

    #[test]
    fn test_tag_for_version() {
        let tag = Tag::for_version(&Version::new(1, 4, 0));
        assert_eq!(tag.name, "v1.4.0");
        assert_eq!(tag.version().unwrap(), Version::new(1, 4, 0));
    }
}
