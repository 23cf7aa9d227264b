//! PF-specific targets for OpenC2

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use from_variants::FromVariants;
use openc2::{
    Ipv4Net, Ipv6Net, Port, RuleId, Value,
    primitive::Choice,
    target::{L4Protocol, ProfileTargetType},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::NS;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    RuleNumber(RuleId),
    AdvConnection(AdvancedConnection),
}

impl Target {
    pub fn kind(&self) -> TargetType {
        match self {
            Target::RuleNumber(_) => TargetType::RuleNumber,
            Target::AdvConnection(_) => TargetType::AdvConnection,
        }
    }

    /// Convert to a generic OpenC2 target.
    pub fn into_target<V: Value>(self) -> Result<openc2::Target<V>, V::Error> {
        let value = match &self {
            Target::RuleNumber(id) => V::from_typed(id)?,
            Target::AdvConnection(conn) => V::from_typed(conn)?,
        };
        Ok(openc2::Target::profile_defined(NS, self.kind().as_str(), value))
    }
}

impl<V> TryFrom<openc2::Target<V>> for Target
where
    V: Value,
    openc2::Error: From<V::Error>,
{
    type Error = openc2::Error;

    fn try_from(value: openc2::Target<V>) -> Result<Self, Self::Error> {
        let kind = value.kind().into_owned();
        let openc2::Target::ProfileDefined(ext) = value else {
            return Err(openc2::Error::invalid_target(kind));
        };
        if *ext.key != *NS {
            return Err(openc2::Error::invalid_target(kind));
        }

        let Choice { key: name, value } = ext.value;
        Ok(match name.parse::<TargetType>() {
            Ok(TargetType::RuleNumber) => Target::RuleNumber(value.to_typed()?),
            Ok(TargetType::AdvConnection) => Target::AdvConnection(value.to_typed()?),
            Err(_) => return Err(openc2::Error::invalid_target(kind)),
        })
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    RuleNumber,
    AdvConnection,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::RuleNumber => "rule_number",
            TargetType::AdvConnection => "adv_connection",
        }
    }
}

impl From<TargetType> for ProfileTargetType<'static> {
    fn from(value: TargetType) -> Self {
        ProfileTargetType::new(NS, value.as_str())
    }
}

impl From<TargetType> for openc2::TargetType<'static> {
    fn from(value: TargetType) -> Self {
        openc2::TargetType::ProfileDefined(value.into())
    }
}

/// Advanced connection type to support application layer firewalls.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdvancedConnection {
    pub src_addr: AdvAddr,
    pub src_port: Option<Port>,
    pub dst_addr: AdvAddr,
    pub dst_port: Option<Port>,
    pub protocol: Option<L4Protocol>,
    pub network: Option<String>,
    pub application: Option<String>,
}

impl AdvancedConnection {
    pub fn new(src_addr: impl Into<AdvAddr>, dst_addr: impl Into<AdvAddr>) -> Self {
        Self {
            src_addr: src_addr.into(),
            src_port: None,
            dst_addr: dst_addr.into(),
            dst_port: None,
            protocol: None,
            network: None,
            application: None,
        }
    }
}

/// Address type for advanced connections.
#[derive(
    Debug, Clone, PartialEq, Deserialize, Serialize, Eq, PartialOrd, Ord, Hash, FromVariants,
)]
pub enum AdvAddr {
    /// CIDR notation
    #[serde(rename = "v4addr")]
    V4Addr(Ipv4Net),
    /// CIDR notation
    #[serde(rename = "v6addr")]
    V6Addr(Ipv6Net),
    /// Network tag
    #[serde(rename = "net_tag")]
    #[from_variants(skip)]
    NetTag(String),
}

impl From<IpAddr> for AdvAddr {
    fn from(value: IpAddr) -> Self {
        match value {
            IpAddr::V4(v4) => AdvAddr::V4Addr(Ipv4Net::from(v4)),
            IpAddr::V6(v6) => AdvAddr::V6Addr(Ipv6Net::from(v6)),
        }
    }
}

impl From<Ipv4Addr> for AdvAddr {
    fn from(value: Ipv4Addr) -> Self {
        AdvAddr::V4Addr(Ipv4Net::from(value))
    }
}

impl From<Ipv6Addr> for AdvAddr {
    fn from(value: Ipv6Addr) -> Self {
        AdvAddr::V6Addr(Ipv6Net::from(value))
    }
}

impl PartialEq<Ipv4Net> for AdvAddr {
    fn eq(&self, other: &Ipv4Net) -> bool {
        matches!(self, AdvAddr::V4Addr(v4) if v4 == other)
    }
}

impl PartialEq<Ipv6Net> for AdvAddr {
    fn eq(&self, other: &Ipv6Net) -> bool {
        matches!(self, AdvAddr::V6Addr(v6) if v6 == other)
    }
}
