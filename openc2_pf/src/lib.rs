//! OpenC2 Actuator Profile for Packet Filtering (PF)
//! Implements types and logic for the PF actuator profile as defined in the OASIS specification.
//!
//! Call [`register`] once at startup so that commands using PF targets and arguments pass
//! validation.

mod actuator;
mod args;
pub mod target;

pub use actuator::PacketFilter;
pub use args::*;
use openc2::{Nsid, Profile, ProfileSpec, Registry, RegistryError};
use strum::IntoEnumIterator;
pub use target::*;

pub static NS: &Nsid = &Nsid::PF;

/// The Packet Filtering profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketFiltering;

impl Profile for PacketFiltering {
    fn ns() -> &'static Nsid {
        NS
    }

    fn spec() -> ProfileSpec {
        ProfileSpec::new()
            .with_args(Args::NAMES)
            .with_targets(TargetType::iter().map(TargetType::as_str))
    }
}

/// Register the PF profile and its target types.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_profile::<PacketFiltering>()
}

#[cfg(test)]
mod tests {
    use openc2::{Namespace, Registry, TargetType, target::ProfileTargetType};

    use super::*;

    #[test]
    fn registers_profile_and_targets() {
        let mut registry = Registry::with_language_targets();
        register(&mut registry).unwrap();

        let spec = registry.profile_for(NS).unwrap();
        assert!(spec.declares_arg("drop_process"));
        assert!(!spec.declares_arg("account"));

        for name in ["rule_number", "adv_connection"] {
            let kind = TargetType::ProfileDefined(ProfileTargetType::new(NS, name));
            assert_eq!(
                registry.targets().resolve_target(&kind).unwrap(),
                format!("pf/{name}")
            );
        }

        assert!(registry.lookup(Namespace::Profiles, "pf").is_ok());
    }

    #[test]
    fn register_twice_fails() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        assert!(matches!(
            register(&mut registry),
            Err(RegistryError::DuplicateName { namespace: Namespace::Profiles, .. })
        ));
    }
}
