use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{
    borrow::{Borrow, Cow},
    fmt,
    str::FromStr,
};

use crate::{FormatError, ValueKind};

const MAX_LEN: usize = 16;

/// A namespace identifier, scoping a profile's custom types so independently developed
/// extensions can't collide.
#[derive(
    Debug, Clone, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Nsid(Cow<'static, str>);

impl Nsid {
    /// The OpenC2 Language Specification itself; owns the language-defined targets.
    pub const LANGUAGE: Nsid = Nsid::new_static("oc2ls");
    /// Stateless Packet Filtering.
    pub const SLPF: Nsid = Nsid::new_static("slpf");
    /// Packet Filtering.
    pub const PF: Nsid = Nsid::new_static("pf");
    /// Endpoint Response.
    pub const ER: Nsid = Nsid::new_static("er");

    /// # Panics
    /// Panics at compile time if `text` is empty or longer than 16 bytes.
    pub const fn new_static(text: &'static str) -> Self {
        if text.is_empty() || text.len() > MAX_LEN {
            panic!("NSID must be between 1 and 16 characters");
        }
        Self(Cow::Borrowed(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn check(text: &str) -> Result<(), FormatError> {
        if text.is_empty() || text.len() > MAX_LEN {
            return Err(FormatError::new(
                Self::KIND,
                text,
                "must be between 1 and 16 characters",
            ));
        }
        Ok(())
    }
}

impl TryFrom<String> for Nsid {
    type Error = FormatError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::check(&value)?;
        Ok(Self(Cow::Owned(value)))
    }
}

impl TryFrom<&'static str> for Nsid {
    type Error = FormatError;
    fn try_from(value: &'static str) -> Result<Self, Self::Error> {
        Self::check(value)?;
        Ok(Self(Cow::Borrowed(value)))
    }
}

impl FromStr for Nsid {
    type Err = FormatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::check(s)?;
        Ok(Self(Cow::Owned(s.to_string())))
    }
}

impl fmt::Display for Nsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for Nsid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Nsid {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl From<Nsid> for Cow<'_, Nsid> {
    fn from(value: Nsid) -> Self {
        Cow::Owned(value)
    }
}

impl<'a> From<&'a Nsid> for Cow<'a, Nsid> {
    fn from(value: &'a Nsid) -> Self {
        Cow::Borrowed(value)
    }
}

impl ValueKind for Nsid {
    const KIND: &'static str = "nsid";
}

#[cfg(test)]
mod tests {
    use super::Nsid;

    #[test]
    fn length_bounds() {
        assert!("".parse::<Nsid>().is_err());
        assert!("x".repeat(17).parse::<Nsid>().is_err());
        assert_eq!("x".repeat(16).parse::<Nsid>().unwrap().as_str().len(), 16);
    }

    #[test]
    fn constant_matches_parsed() {
        assert_eq!("slpf".parse::<Nsid>().unwrap(), Nsid::SLPF);
    }
}
