use std::borrow::Cow;

use indexmap::IndexSet;

use crate::Nsid;

/// An OpenC2 actuator profile.
pub trait Profile {
    /// Returns the profile's namespace identifier.
    fn ns() -> &'static Nsid;

    /// The name the profile is registered under. Defaults to the namespace identifier.
    fn name() -> &'static str {
        Self::ns().as_str()
    }

    /// Describes the arguments and targets the profile adds to the language.
    fn spec() -> ProfileSpec;
}

/// The argument and target names an actuator profile declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSpec {
    args: IndexSet<Cow<'static, str>>,
    targets: IndexSet<Cow<'static, str>>,
}

impl ProfileSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args<S>(mut self, args: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_targets<S>(mut self, targets: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn declares_arg(&self, name: &str) -> bool {
        self.args.contains(name)
    }

    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(AsRef::as_ref)
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(AsRef::as_ref)
    }
}
