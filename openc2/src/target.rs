//! Types for declaring the object of an action.

use from_variants::FromVariants;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay, skip_serializing_none};
use std::{borrow::Cow, fmt, str::FromStr};

use crate::{
    CommandId, DomainName, Feature, FormatError, Hashes, Ipv4Net, Ipv6Net, Nsid, Port, Uri,
    Value, primitive::Choice,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromVariants)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Target<V> {
    Command(CommandId),
    Device(Device),
    #[from_variants(skip)]
    DomainName(DomainName),
    Features(Features),
    File(File),
    Ipv4Net(Ipv4Net),
    Ipv6Net(Ipv6Net),
    Ipv4Connection(Ipv4Connection),
    Ipv6Connection(Ipv6Connection),
    Uri(Uri),
    /// A target defined by an actuator profile, keyed by the profile's namespace identifier
    /// and then by the target's name within that profile.
    #[serde(untagged)]
    #[from_variants(skip)]
    ProfileDefined(Choice<Cow<'static, Nsid>, Choice<Cow<'static, str>, V>>),
}

impl<V> Target<V> {
    pub fn kind(&self) -> TargetType<'_> {
        self.into()
    }

    pub fn profile_defined(
        profile: impl Into<Cow<'static, Nsid>>,
        type_name: impl Into<Cow<'static, str>>,
        value: V,
    ) -> Self {
        Self::ProfileDefined(Choice::new(
            profile.into(),
            Choice::new(type_name.into(), value),
        ))
    }

    /// The profile that defines this target, or `None` for language-defined targets.
    pub fn profile(&self) -> Option<&Nsid> {
        match self {
            Target::ProfileDefined(ext) => Some(&*ext.key),
            _ => None,
        }
    }
}

impl<V: Value> Target<V> {
    /// Create a profile-defined target from a typed value.
    pub fn try_profile_defined(
        profile: impl Into<Cow<'static, Nsid>>,
        type_name: impl Into<Cow<'static, str>>,
        value: &impl Serialize,
    ) -> Result<Self, V::Error> {
        Ok(Self::profile_defined(profile, type_name, V::from_typed(value)?))
    }
}

impl<V> From<Vec<Feature>> for Target<V> {
    fn from(value: Vec<Feature>) -> Self {
        Self::Features(value.into_iter().collect())
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TargetType<'a> {
    Command,
    Device,
    DomainName,
    Features,
    File,
    Ipv4Net,
    Ipv6Net,
    Ipv4Connection,
    Ipv6Connection,
    Uri,
    #[serde(untagged)]
    #[strum(to_string = "{0}")]
    ProfileDefined(ProfileTargetType<'a>),
}

impl TargetType<'_> {
    /// Every target kind defined by the language itself.
    pub const LANGUAGE: [TargetType<'static>; 10] = [
        TargetType::Command,
        TargetType::Device,
        TargetType::DomainName,
        TargetType::Features,
        TargetType::File,
        TargetType::Ipv4Net,
        TargetType::Ipv6Net,
        TargetType::Ipv4Connection,
        TargetType::Ipv6Connection,
        TargetType::Uri,
    ];

    pub fn into_owned(self) -> TargetType<'static> {
        match self {
            TargetType::Command => TargetType::Command,
            TargetType::Device => TargetType::Device,
            TargetType::DomainName => TargetType::DomainName,
            TargetType::Features => TargetType::Features,
            TargetType::File => TargetType::File,
            TargetType::Ipv4Net => TargetType::Ipv4Net,
            TargetType::Ipv6Net => TargetType::Ipv6Net,
            TargetType::Ipv4Connection => TargetType::Ipv4Connection,
            TargetType::Ipv6Connection => TargetType::Ipv6Connection,
            TargetType::Uri => TargetType::Uri,
            TargetType::ProfileDefined(ext) => TargetType::ProfileDefined(ext.into_owned()),
        }
    }
}

impl<'a, V> From<&'a Target<V>> for TargetType<'a> {
    fn from(value: &'a Target<V>) -> Self {
        match value {
            Target::Command(_) => TargetType::Command,
            Target::Device(_) => TargetType::Device,
            Target::DomainName(_) => TargetType::DomainName,
            Target::Features(_) => TargetType::Features,
            Target::File(_) => TargetType::File,
            Target::Ipv4Net(_) => TargetType::Ipv4Net,
            Target::Ipv6Net(_) => TargetType::Ipv6Net,
            Target::Ipv4Connection(_) => TargetType::Ipv4Connection,
            Target::Ipv6Connection(_) => TargetType::Ipv6Connection,
            Target::Uri(_) => TargetType::Uri,
            Target::ProfileDefined(ext) => TargetType::ProfileDefined(ProfileTargetType::new(
                &*ext.key,
                &*ext.value.key,
            )),
        }
    }
}

impl<'a> From<ProfileTargetType<'a>> for TargetType<'a> {
    fn from(value: ProfileTargetType<'a>) -> Self {
        TargetType::ProfileDefined(value)
    }
}

/// A target type defined by a profile, written `nsid/name`.
#[derive(Clone, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileTargetType<'a> {
    pub profile: Cow<'a, Nsid>,
    pub name: Cow<'a, str>,
}

impl<'a> ProfileTargetType<'a> {
    pub fn new(profile: impl Into<Cow<'a, Nsid>>, name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            profile: profile.into(),
            name: name.into(),
        }
    }

    pub fn into_owned(self) -> ProfileTargetType<'static> {
        ProfileTargetType {
            profile: Cow::Owned(self.profile.into_owned()),
            name: Cow::Owned(self.name.into_owned()),
        }
    }
}

impl fmt::Debug for ProfileTargetType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for ProfileTargetType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.profile, self.name)
    }
}

impl FromStr for ProfileTargetType<'_> {
    type Err = FormatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (profile, name) = s.split_once('/').ok_or_else(|| {
            FormatError::new("profile_target_type", s, "must be in the format 'profile/name'")
        })?;
        Ok(Self::new(profile.parse::<Nsid>()?, name.to_string()))
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct File {
    pub name: Option<String>,
    pub hashes: Option<Hashes>,
    pub path: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Device {
    pub hostname: Option<String>,
    pub idn_hostname: Option<String>,
    pub device_id: Option<String>,
}

impl Device {
    pub fn with_device_id(value: impl Into<String>) -> Self {
        Self {
            device_id: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_hostname(value: impl Into<String>) -> Self {
        Self {
            hostname: Some(value.into()),
            ..Default::default()
        }
    }
}

/// The set of features queried in a `query` action.
pub type Features = IndexSet<Feature>;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Ipv4Connection {
    pub src_addr: Option<Ipv4Net>,
    pub src_port: Option<Port>,
    pub dst_addr: Option<Ipv4Net>,
    pub dst_port: Option<Port>,
    pub protocol: Option<L4Protocol>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Ipv6Connection {
    pub src_addr: Option<Ipv6Net>,
    pub src_port: Option<Port>,
    pub dst_addr: Option<Ipv6Net>,
    pub dst_port: Option<Port>,
    pub protocol: Option<L4Protocol>,
}

/// Layer 4 protocols, as named in the IANA protocol registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum L4Protocol {
    Icmp,
    Tcp,
    Udp,
    Sctp,
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use crate::{Nsid, TargetType, primitive::Choice, target::ProfileTargetType};

    use super::Target;
    use serde_json::{Value, from_value, json};

    #[test]
    fn ip_target() {
        let example: Target<Value> = from_value(json!(
            {
                "ipv4_net": "1.2.3.4/32"
            }
        ))
        .unwrap();

        assert_eq!(example, Target::Ipv4Net("1.2.3.4/32".parse().unwrap()));
    }

    #[test]
    fn uri_target_is_validated() {
        let ok: Target<Value> = from_value(json!({ "uri": "https://example.com/a" })).unwrap();
        assert_eq!(ok.kind(), TargetType::Uri);
        assert!(from_value::<Target<Value>>(json!({ "uri": "not a uri" })).is_err());
    }

    #[test]
    fn extension_target() {
        let example: Target<Value> = from_value(json!(
            {
                "slpf": {
                    "rule_number": 31
                }
            }
        ))
        .unwrap();

        assert!(matches!(example, Target::ProfileDefined(Choice { .. })));
        assert_eq!(example.profile(), Some(&Nsid::SLPF));
        assert_eq!(example.kind().to_string(), "slpf/rule_number");
    }

    #[test]
    fn target_type_display() {
        assert_eq!(TargetType::Ipv4Net.to_string(), "ipv4_net");
    }

    #[test]
    fn target_type_display_extended() {
        assert_eq!(
            TargetType::ProfileDefined(ProfileTargetType::new(Nsid::ER, "account")).to_string(),
            "er/account"
        );
    }

    #[test]
    fn profile_target_type_parse() {
        let parsed: ProfileTargetType = "pf/rule_number".parse().unwrap();
        assert_eq!(parsed, ProfileTargetType::new(Nsid::PF, "rule_number"));
        assert!("rule_number".parse::<ProfileTargetType>().is_err());
    }
}
