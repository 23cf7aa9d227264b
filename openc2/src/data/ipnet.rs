use std::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{FormatError, ValueKind};

/// Declares a CIDR network type over an address type with the given maximum prefix length.
///
/// A prefix equal to the address width is normalized away, so `1.2.3.4/32` and `1.2.3.4`
/// compare equal.
macro_rules! ip_net {
    ($(#[$meta:meta])* $name:ident, $addr:ty, $max:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
        )]
        pub struct $name {
            address: $addr,
            prefix_len: Option<u8>,
        }

        impl $name {
            pub fn new(address: $addr, prefix_len: Option<u8>) -> Result<Self, FormatError> {
                let prefix_len = match prefix_len {
                    Some(pf) if pf > $max => {
                        return Err(FormatError::new(
                            Self::KIND,
                            format!("{address}/{pf}"),
                            concat!("prefix length must be between 0 and ", $max),
                        ));
                    }
                    Some($max) | None => None,
                    Some(other) => Some(other),
                };
                Ok(Self { address, prefix_len })
            }

            pub fn address(&self) -> $addr {
                self.address
            }

            pub fn prefix_len(&self) -> u8 {
                self.prefix_len.unwrap_or($max)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{self}")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.prefix_len {
                    Some(prefix_len) => write!(f, "{}/{prefix_len}", self.address),
                    None => self.address.fmt(f),
                }
            }
        }

        impl FromStr for $name {
            type Err = FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (addr, prefix) = match s.split_once('/') {
                    Some((addr, prefix)) => (addr, Some(prefix)),
                    None => (s, None),
                };
                let address = addr
                    .parse()
                    .map_err(|e| FormatError::new(Self::KIND, s, format!("bad address: {e}")))?;
                let prefix_len = prefix
                    .map(|prefix| {
                        prefix.parse().map_err(|e| {
                            FormatError::new(Self::KIND, s, format!("bad prefix length: {e}"))
                        })
                    })
                    .transpose()?;
                Self::new(address, prefix_len)
            }
        }

        impl From<$addr> for $name {
            fn from(address: $addr) -> Self {
                Self {
                    address,
                    prefix_len: None,
                }
            }
        }

        impl ValueKind for $name {
            const KIND: &'static str = $kind;
        }
    };
}

ip_net!(
    /// An IPv4 address with an optional CIDR prefix.
    Ipv4Net,
    Ipv4Addr,
    32,
    "ipv4_net"
);

ip_net!(
    /// An IPv6 address with an optional CIDR prefix.
    Ipv6Net,
    Ipv6Addr,
    128,
    "ipv6_net"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_prefix_is_normalized() {
        let net: Ipv4Net = "1.2.3.4/32".parse().unwrap();
        assert_eq!(net, Ipv4Net::from(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(net.to_string(), "1.2.3.4");
        assert_eq!(net.prefix_len(), 32);
    }

    #[test]
    fn prefix_out_of_range() {
        let err = "10.0.0.0/33".parse::<Ipv4Net>().unwrap_err();
        assert_eq!(err.kind(), "ipv4_net");
        assert!("::1/129".parse::<Ipv6Net>().is_err());
    }

    #[test]
    fn v6_with_prefix() {
        let net: Ipv6Net = "2001:db8::/32".parse().unwrap();
        assert_eq!(net.to_string(), "2001:db8::/32");
    }
}
