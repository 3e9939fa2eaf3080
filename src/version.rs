//! Version Gate
//!
//! Versions of the binary task-parameter layout. A node refuses to decode
//! parameters whose minimum version is newer than its own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Release version, ordered by (major, minor, revision)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl Version {
    pub const V_1_0_0: Version = Version::new(1, 0, 0);
    pub const V_1_1_0: Version = Version::new(1, 1, 0);
    pub const V_1_3_0: Version = Version::new(1, 3, 0);

    /// Version of this build
    pub const CURRENT: Version = Version::V_1_3_0;

    pub const fn new(major: u8, minor: u8, revision: u8) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    /// Whether a node running `self` may decode data that requires `minimum`
    pub fn can_decode(&self, minimum: Version) -> bool {
        *self >= minimum
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        let mut nums = [0u8; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        }

        Ok(Version::new(nums[0], nums[1], nums[2]))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Version::V_1_0_0 < Version::V_1_1_0);
        assert!(Version::new(2, 0, 0) > Version::new(1, 9, 9));
        assert!(Version::V_1_3_0.can_decode(Version::V_1_1_0));
        assert!(!Version::V_1_0_0.can_decode(Version::V_1_1_0));
    }

    #[test]
    fn test_parse_and_display() {
        let v: Version = "1.1.0".parse().unwrap();
        assert_eq!(v, Version::V_1_1_0);
        assert_eq!(v.to_string(), "1.1.0");

        assert!("1.1".parse::<Version>().is_err());
        assert!("1.x.0".parse::<Version>().is_err());
        assert!("1.300.0".parse::<Version>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Version::V_1_1_0).unwrap();
        assert_eq!(json, "\"1.1.0\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Version::V_1_1_0);
    }
}
