use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{FormatError, ValueKind};

/// Immutable identifier of a rule, returned by a consumer from a prior `allow` or `deny`.
///
/// The value is an opaque handle owned by the consumer that issued it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RuleId(u32);

impl RuleId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for RuleId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<RuleId> for u32 {
    fn from(value: RuleId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for RuleId {
    type Error = FormatError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(FormatError::new(Self::KIND, value, "must not be negative"));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| FormatError::new(Self::KIND, value, "must fit in 32 bits"))
    }
}

impl FromStr for RuleId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .parse()
            .map_err(|_| FormatError::new(Self::KIND, s, "not an integer"))?;
        Self::try_from(value)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ValueKind for RuleId {
    const KIND: &'static str = "rule_id";
}

/// The HTTP(S) endpoint a producer authenticates against.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct AuthEndpoint(String);

impl AuthEndpoint {
    pub fn new(text: impl Into<String>) -> Result<Self, FormatError> {
        let text = text.into();
        if text.starts_with("http://") || text.starts_with("https://") {
            Ok(Self(text))
        } else {
            Err(FormatError::new(
                Self::KIND,
                text,
                "does not start with http:// or https://",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_secure(&self) -> bool {
        self.0.starts_with("https://")
    }
}

impl fmt::Display for AuthEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AuthEndpoint {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl ValueKind for AuthEndpoint {
    const KIND: &'static str = "auth_endpoint";
}

/// Declares a string newtype that can only hold non-empty text.
macro_rules! non_empty_string {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
        )]
        pub struct $name(String);

        impl $name {
            pub fn new(text: impl Into<String>) -> Result<Self, FormatError> {
                let text = text.into();
                if text.is_empty() {
                    return Err(FormatError::new(Self::KIND, text, "must not be empty"));
                }
                Ok(Self(text))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl ValueKind for $name {
            const KIND: &'static str = $kind;
        }
    };
}

non_empty_string!(
    /// Names a field to export from a consumer's data.
    ExportField,
    "export_field"
);

non_empty_string!(
    /// Names a field at which a stream or scan stops.
    StopField,
    "stop_field"
);
