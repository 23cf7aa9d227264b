use std::borrow::Borrow;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{Action, Error, IsEmpty, TargetType, ValueKind};

mod fields;
mod ipnet;
mod nsid;
pub mod primitive;
mod time;
mod uri;
mod value;
mod version;

pub use fields::{AuthEndpoint, ExportField, RuleId, StopField};
pub use ipnet::{Ipv4Net, Ipv6Net};
pub use nsid::Nsid;
pub use time::{DateTime, Duration};
pub use uri::Uri;
pub use value::Value;
pub use version::Version;

pub type ActionTargets = IndexMap<Action, IndexSet<TargetType<'static>>>;

pub type CommandId = String;

pub type DomainName = String;

pub type Port = u16;

/// Profile-defined data keyed by the namespace identifier of the profile that defines it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Extensions<V>(IndexMap<Nsid, V>);

impl<V> Extensions<V> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &impl Borrow<str>) -> bool {
        self.0.contains_key(key.borrow())
    }

    pub fn get_raw(&self, key: &impl Borrow<str>) -> Option<&V> {
        self.0.get(key.borrow())
    }

    pub fn insert(&mut self, key: Nsid, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Nsid, V> {
        self.0.iter()
    }
}

impl<V: Value + Clone> Extensions<V> {
    /// Gets an extension's value by key, or returns `None` if the key doesn't exist.
    pub fn get<T: serde::de::DeserializeOwned>(
        &self,
        key: &impl Borrow<str>,
    ) -> Option<Result<T, V::Error>> {
        self.get_raw(key).map(|v| v.clone().to_typed())
    }

    /// Gets an extension's value by key, returning an error if the key doesn't exist or
    /// doesn't deserialize into the provided type.
    pub fn require<T: serde::de::DeserializeOwned>(
        &self,
        key: &impl Borrow<str>,
    ) -> Result<T, Error> {
        let key = key.borrow();
        match self.get::<T>(&key) {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(Error::validation(format!("extension {key}: {e}"))),
            None => Err(Error::validation(format!("extension {key} is required"))),
        }
    }
}

impl<V> IsEmpty for Extensions<V> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for Extensions<V> {
    fn default() -> Self {
        Self(Default::default())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Extensions<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        IndexMap::<Nsid, V>::deserialize(deserializer).map(Self)
    }
}

impl<'a, V> IntoIterator for &'a Extensions<V> {
    type Item = (&'a Nsid, &'a V);
    type IntoIter = indexmap::map::Iter<'a, Nsid, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<V> FromIterator<(Nsid, V)> for Extensions<V> {
    fn from_iter<T: IntoIterator<Item = (Nsid, V)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Feature {
    Versions,
    Profiles,
    Pairs,
    RateLimit,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Hashes {
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    None,
    Ack,
    Status,
    Complete,
}

impl ResponseType {
    pub fn requires_command_id(self) -> bool {
        !matches!(self, ResponseType::None)
    }
}

impl ValueKind for ResponseType {
    const KIND: &'static str = "response_type";
}
