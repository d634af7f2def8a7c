use crate::error::{ReleaseTrainError, Result};
use std::fmt;
use std::str::FromStr;

/// Released or planned version of the product, `major.minor.patch`
///
/// Increments touch exactly one component and leave the other two as they are,
/// so `inc_minor` on `1.3.2` yields `1.4.2`, not `1.4.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse version from a plain `X.Y.Z` string (no prefix)
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseTrainError::format(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                s
            )));
        }

        let major = parse_component(parts[0], "major", s)?;
        let minor = parse_component(parts[1], "minor", s)?;
        let patch = parse_component(parts[2], "patch", s)?;

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// # Errors
    /// `Format` if the component is already at its maximum.
    pub fn inc_major(&self) -> Result<Self> {
        Ok(Version {
            major: bump(self.major, "major", self)?,
            ..*self
        })
    }

    pub fn inc_minor(&self) -> Result<Self> {
        Ok(Version {
            minor: bump(self.minor, "minor", self)?,
            ..*self
        })
    }

    pub fn inc_patch(&self) -> Result<Self> {
        Ok(Version {
            patch: bump(self.patch, "patch", self)?,
            ..*self
        })
    }
}

fn bump(component: u32, name: &str, version: &Version) -> Result<u32> {
    component.checked_add(1).ok_or_else(|| {
        ReleaseTrainError::format(format!(
            "Cannot increment {} version of {}: component overflows",
            name, version
        ))
    })
}

fn parse_component(part: &str, name: &str, whole: &str) -> Result<u32> {
    let invalid = || {
        ReleaseTrainError::format(format!(
            "Invalid {} version '{}' in '{}'",
            name, part, whole
        ))
    };
    // plain decimal only, so the rendered version matches the input
    let canonical = !part.is_empty()
        && part.bytes().all(|b| b.is_ascii_digit())
        && (part == "0" || !part.starts_with('0'));
    if !canonical {
        return Err(invalid());
    }
    part.parse::<u32>().map_err(|_| invalid())
}

impl FromStr for Version {
    type Err = ReleaseTrainError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_from_str() {
        let v: Version = "10.0.7".parse().unwrap();
        assert_eq!(v, Version::new(10, 0, 7));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("v1.2.3").is_err());
        assert!(Version::parse("1.x.3").is_err());
        assert!(Version::parse("1.-2.3").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_version_round_trip() {
        for s in ["0.0.0", "1.2.3", "10.20.30", "4294967295.0.1"] {
            assert_eq!(Version::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_inc_minor_keeps_other_components() {
        let v = Version::new(1, 3, 2);
        let next = v.inc_minor().unwrap();
        assert_eq!(next.major, v.major);
        assert_eq!(next.minor, v.minor + 1);
        assert_eq!(next.patch, v.patch);
    }

    #[test]
    fn test_inc_major_and_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.inc_major().unwrap(), Version::new(2, 2, 3));
        assert_eq!(v.inc_patch().unwrap(), Version::new(1, 2, 4));
        // original value is untouched
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_chained_increments_do_not_reset() {
        let v = Version::new(1, 2, 3);
        let chained = v
            .inc_patch()
            .and_then(|v| v.inc_major())
            .and_then(|v| v.inc_minor())
            .unwrap();
        assert_eq!(chained, Version::new(2, 3, 4));
    }

    #[test]
    fn test_increment_overflow_is_format_error() {
        let v = Version::new(1, 3, u32::MAX);
        let err = v.inc_patch().unwrap_err();
        assert!(matches!(err, ReleaseTrainError::Format(_)));
        assert_eq!(v.inc_minor().unwrap(), Version::new(1, 4, u32::MAX));
        assert!(Version::new(u32::MAX, 0, 0).inc_major().is_err());
        assert!(Version::new(0, u32::MAX, 0).inc_minor().is_err());
    }

    #[test]
    fn test_version_parse_rejects_non_canonical_numbers() {
        assert!(Version::parse("1.+2.3").is_err());
        assert!(Version::parse("1.02.3").is_err());
        assert!(Version::parse("1. 2.3").is_err());
        assert!(Version::parse("1..3").is_err());
        assert!(Version::parse("4294967296.0.0").is_err());
        assert_eq!(Version::parse("0.10.0").unwrap(), Version::new(0, 10, 0));
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 3, 0) < Version::new(1, 4, 0));
        assert!(Version::new(1, 9, 9) < Version::new(2, 0, 0));
        assert!(Version::new(1, 3, 1) > Version::new(1, 3, 0));
    }
}
