//! The authority that gives extension types their names.
//!
//! A [`Registry`] holds three namespaces: profiles, actuators and targets. Each maps a
//! human-readable name to an [`Implementation`] owned by a namespace identifier. Names are
//! unique per namespace; actuator implementations are additionally unique across names.
//!
//! Registries are populated once during startup and then shared read-only, usually behind an
//! `Arc`. There is deliberately no way to remove an entry.

use std::{collections::HashMap, fmt, sync::Arc};

use from_variants::FromVariants;
use indexmap::{IndexMap, IndexSet};

use crate::{Action, ActionTargets, Nsid, Profile, ProfileSpec, TargetType};

/// One of the three name tables in a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Namespace {
    Profiles,
    Actuators,
    Targets,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("{namespace}: '{name}' is already registered")]
    DuplicateName { namespace: Namespace, name: String },
    #[error("{namespace}: '{name}' is the same implementation already registered as '{existing}'")]
    DuplicateImplementation {
        namespace: Namespace,
        name: String,
        existing: String,
    },
    #[error("{namespace}: no entry named '{name}'")]
    UnknownName { namespace: Namespace, name: String },
    #[error("{namespace}: {implementation} is not registered")]
    UnknownImplementation {
        namespace: Namespace,
        implementation: String,
    },
}

/// Something that executes commands against targets on behalf of a profile.
pub trait Actuator: fmt::Debug + Send + Sync {
    /// The profile whose commands this actuator accepts.
    fn profile(&self) -> &Nsid;

    /// The action-target pairs this actuator can execute.
    fn pairs(&self) -> ActionTargets;

    fn supports(&self, action: &Action, target: &TargetType<'_>) -> bool {
        self.pairs()
            .get(action)
            .is_some_and(|targets| targets.contains(&target.clone().into_owned()))
    }
}

/// What a registered name stands for.
#[derive(Debug, Clone, FromVariants)]
pub enum Implementation {
    Profile(Arc<ProfileSpec>),
    Actuator(Arc<dyn Actuator>),
    Target(TargetType<'static>),
}

impl Implementation {
    pub fn profile(spec: ProfileSpec) -> Self {
        Implementation::Profile(Arc::new(spec))
    }

    pub fn actuator(actuator: impl Actuator + 'static) -> Self {
        Implementation::Actuator(Arc::new(actuator))
    }

    /// The namespace this kind of implementation is registered into.
    pub fn namespace(&self) -> Namespace {
        match self {
            Implementation::Profile(_) => Namespace::Profiles,
            Implementation::Actuator(_) => Namespace::Actuators,
            Implementation::Target(_) => Namespace::Targets,
        }
    }

    pub fn as_profile(&self) -> Option<&Arc<ProfileSpec>> {
        match self {
            Implementation::Profile(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn as_actuator(&self) -> Option<&Arc<dyn Actuator>> {
        match self {
            Implementation::Actuator(actuator) => Some(actuator),
            _ => None,
        }
    }

    pub fn as_target(&self) -> Option<&TargetType<'static>> {
        match self {
            Implementation::Target(kind) => Some(kind),
            _ => None,
        }
    }

    /// Shared implementations are identified by allocation, so two equal but separately
    /// created actuators are distinct. Target kinds are plain values.
    fn identity(&self) -> Identity {
        match self {
            Implementation::Profile(spec) => Identity::Shared(Arc::as_ptr(spec) as *const () as usize),
            Implementation::Actuator(actuator) => {
                Identity::Shared(Arc::as_ptr(actuator) as *const () as usize)
            }
            Implementation::Target(kind) => Identity::Target(kind.clone()),
        }
    }
}

impl From<ProfileSpec> for Implementation {
    fn from(value: ProfileSpec) -> Self {
        Implementation::profile(value)
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Profile(spec) => write!(f, "profile@{:p}", Arc::as_ptr(spec)),
            Implementation::Actuator(actuator) => {
                write!(f, "actuator {actuator:?}@{:p}", Arc::as_ptr(actuator))
            }
            Implementation::Target(kind) => write!(f, "target type '{kind}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    Shared(usize),
    Target(TargetType<'static>),
}

/// A registered name.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    nsid: Nsid,
    implementation: Implementation,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nsid(&self) -> &Nsid {
        &self.nsid
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }
}

/// The entries of a single namespace.
#[derive(Debug)]
pub struct Table {
    namespace: Namespace,
    entries: IndexMap<String, Entry>,
    by_identity: HashMap<Identity, String>,
    by_nsid: HashMap<Nsid, String>,
}

impl Table {
    fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            entries: IndexMap::new(),
            by_identity: HashMap::new(),
            by_nsid: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn insert(
        &mut self,
        name: String,
        implementation: Implementation,
        nsid: Nsid,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                namespace: self.namespace,
                name,
            });
        }

        let identity = implementation.identity();

        // Actuators may not alias one another. Registration only happens at startup, so
        // a scan is fine here.
        if self.namespace == Namespace::Actuators
            && let Some(existing) = self
                .entries
                .values()
                .find(|entry| entry.implementation.identity() == identity)
        {
            return Err(RegistryError::DuplicateImplementation {
                namespace: self.namespace,
                name,
                existing: existing.name.clone(),
            });
        }

        tracing::debug!(namespace = %self.namespace, name = %name, nsid = %nsid, "registered");

        self.by_identity
            .entry(identity)
            .or_insert_with(|| name.clone());
        self.by_nsid
            .entry(nsid.clone())
            .or_insert_with(|| name.clone());
        self.entries.insert(
            name.clone(),
            Entry {
                name,
                nsid,
                implementation,
            },
        );

        Ok(())
    }

    /// Returns the implementation registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<&Implementation, RegistryError> {
        self.entry(name)
            .map(Entry::implementation)
            .ok_or_else(|| RegistryError::UnknownName {
                namespace: self.namespace,
                name: name.to_string(),
            })
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the name `implementation` was first registered under.
    pub fn resolve(&self, implementation: &Implementation) -> Result<&str, RegistryError> {
        self.by_identity
            .get(&implementation.identity())
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownImplementation {
                namespace: self.namespace,
                implementation: implementation.to_string(),
            })
    }

    /// Returns the name a target kind was first registered under.
    pub fn resolve_target(&self, kind: &TargetType<'_>) -> Result<&str, RegistryError> {
        self.resolve(&Implementation::Target(kind.clone().into_owned()))
    }

    /// Returns the first entry registered with `nsid`.
    pub fn by_nsid(&self, nsid: &Nsid) -> Option<&Entry> {
        self.by_nsid.get(nsid).and_then(|name| self.entries.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The profiles, actuators and target types known to a process.
#[derive(Debug)]
pub struct Registry {
    profiles: Table,
    actuators: Table,
    targets: Table,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry with all three namespaces empty.
    pub fn new() -> Self {
        Self {
            profiles: Table::new(Namespace::Profiles),
            actuators: Table::new(Namespace::Actuators),
            targets: Table::new(Namespace::Targets),
        }
    }

    /// Creates a registry that already knows every target defined by the language itself.
    pub fn with_language_targets() -> Self {
        let mut registry = Self::new();
        for kind in TargetType::LANGUAGE {
            registry
                .register_target(kind)
                .expect("language target types are distinct");
        }
        registry
    }

    /// Register `implementation` under `name` in the namespace matching its kind.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        implementation: impl Into<Implementation>,
        nsid: Nsid,
    ) -> Result<(), RegistryError> {
        let implementation = implementation.into();
        self.table_mut(implementation.namespace())
            .insert(name.into(), implementation, nsid)
    }

    /// Register a target kind under its wire name, e.g. `ipv4_net` or `slpf/rule_number`.
    pub fn register_target(
        &mut self,
        kind: impl Into<TargetType<'static>>,
    ) -> Result<(), RegistryError> {
        let kind = kind.into();
        let nsid = match &kind {
            TargetType::ProfileDefined(ext) => ext.profile.clone().into_owned(),
            _ => Nsid::LANGUAGE,
        };
        self.register(kind.to_string(), kind, nsid)
    }

    /// Register a profile and every target type it declares.
    pub fn register_profile<P: Profile>(&mut self) -> Result<(), RegistryError> {
        let spec = P::spec();
        let targets = spec
            .targets()
            .map(|name| crate::target::ProfileTargetType::new(P::ns().clone(), name.to_string()))
            .collect::<Vec<_>>();
        self.register(P::name(), spec, P::ns().clone())?;
        for target in targets {
            self.register_target(TargetType::ProfileDefined(target))?;
        }
        Ok(())
    }

    pub fn lookup(&self, namespace: Namespace, name: &str) -> Result<&Implementation, RegistryError> {
        self.table(namespace).lookup(name)
    }

    pub fn resolve(&self, implementation: &Implementation) -> Result<&str, RegistryError> {
        self.table(implementation.namespace()).resolve(implementation)
    }

    pub fn table(&self, namespace: Namespace) -> &Table {
        match namespace {
            Namespace::Profiles => &self.profiles,
            Namespace::Actuators => &self.actuators,
            Namespace::Targets => &self.targets,
        }
    }

    fn table_mut(&mut self, namespace: Namespace) -> &mut Table {
        match namespace {
            Namespace::Profiles => &mut self.profiles,
            Namespace::Actuators => &mut self.actuators,
            Namespace::Targets => &mut self.targets,
        }
    }

    pub fn profiles(&self) -> &Table {
        &self.profiles
    }

    pub fn actuators(&self) -> &Table {
        &self.actuators
    }

    pub fn targets(&self) -> &Table {
        &self.targets
    }

    /// Returns the profile registered with namespace identifier `nsid`.
    pub fn profile_for(&self, nsid: &Nsid) -> Option<&ProfileSpec> {
        self.profiles
            .by_nsid(nsid)
            .and_then(|entry| entry.implementation.as_profile())
            .map(AsRef::as_ref)
    }

    /// The action-target pairs supported by all registered actuators.
    pub fn pairs(&self) -> ActionTargets {
        let mut pairs = ActionTargets::new();
        for actuator in self.actuators.iter().filter_map(|e| e.implementation.as_actuator()) {
            for (action, targets) in actuator.pairs() {
                pairs.entry(action).or_default().extend(targets);
            }
        }
        pairs
    }

    /// The namespace identifiers of the profiles spoken by registered actuators.
    pub fn profile_ids(&self) -> IndexSet<Nsid> {
        self.actuators
            .iter()
            .filter_map(|e| e.implementation.as_actuator())
            .map(|actuator| actuator.profile().clone())
            .collect()
    }
}
