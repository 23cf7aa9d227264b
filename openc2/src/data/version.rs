use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{FormatError, ValueKind};

/// OpenC2 version in "Major.Minor" format
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| FormatError::new(Self::KIND, s, "expected 'major.minor'"))?;
        let part = |text: &str, name: &str| {
            text.parse::<u8>()
                .map_err(|e| FormatError::new(Self::KIND, s, format!("invalid {name}: {e}")))
        };
        Ok(Version::new(part(major, "major")?, part(minor, "minor")?))
    }
}

impl ValueKind for Version {
    const KIND: &'static str = "version";
}
