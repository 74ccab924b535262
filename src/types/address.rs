//! Address family types and literal address classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Check whether `s` is a literal IPv4 address in dotted-quad form.
pub fn is_valid_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// Check whether `s` is a literal IPv6 address.
///
/// IPv4-mapped forms such as `::ffff:10.0.0.1` are IPv6 literals.
pub fn is_valid_ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}

/// A single IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    #[serde(rename = "ipv4")]
    V4,
    #[serde(rename = "ipv6")]
    V6,
}

impl AddressFamily {
    /// The family of an IP address.
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    /// Whether `ip` belongs to this family.
    pub fn matches(self, ip: &IpAddr) -> bool {
        Self::of(ip) == self
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// Which address families a hostname is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamilyPolicy {
    /// IPv4 only (A records).
    Ipv4,
    /// IPv6 only (AAAA records).
    Ipv6,
    /// Both families, IPv4 first.
    #[default]
    Both,
    /// Both families, but stop probing a host after its first live address.
    Any,
}

impl AddressFamilyPolicy {
    const V4_ONLY: &'static [AddressFamily] = &[AddressFamily::V4];
    const V6_ONLY: &'static [AddressFamily] = &[AddressFamily::V6];
    const ALL: &'static [AddressFamily] = &[AddressFamily::V4, AddressFamily::V6];

    /// Families to query, in query order.
    pub fn families(self) -> &'static [AddressFamily] {
        match self {
            Self::Ipv4 => Self::V4_ONLY,
            Self::Ipv6 => Self::V6_ONLY,
            Self::Both | Self::Any => Self::ALL,
        }
    }

    /// Whether this policy queries `family`.
    pub fn includes(self, family: AddressFamily) -> bool {
        self.families().contains(&family)
    }

    /// Whether probing a host stops at its first live address.
    pub fn stops_at_first_alive(self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for AddressFamilyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4 => write!(f, "ipv4"),
            Self::Ipv6 => write!(f, "ipv6"),
            Self::Both => write!(f, "both"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl FromStr for AddressFamilyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ipv4" | "4" | "inet" => Ok(Self::Ipv4),
            "ipv6" | "6" | "inet6" => Ok(Self::Ipv6),
            "both" | "all" => Ok(Self::Both),
            "any" => Ok(Self::Any),
            _ => Err(format!("unknown address family policy: {}", s)),
        }
    }
}

/// An address produced by hostname resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// The address in textual form.
    pub address: String,
    /// Family of the address.
    pub family: AddressFamily,
}

impl ResolvedAddress {
    /// Create a resolved address from its text and family.
    pub fn new(address: impl Into<String>, family: AddressFamily) -> Self {
        Self {
            address: address.into(),
            family,
        }
    }

    /// Create a resolved address from an `IpAddr`.
    pub fn from_ip(ip: IpAddr) -> Self {
        Self::new(ip.to_string(), AddressFamily::of(&ip))
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ipv4() {
        for addr in ["192.168.1.1", "127.0.0.1", "0.0.0.0", "255.255.255.255"] {
            assert!(is_valid_ipv4(addr), "{addr}");
        }
        for addr in ["2001:db8::1", "::1", "not-an-ip", "256.1.1.1", "1.2.3", "1.2.3.4.5", "example.com", ""] {
            assert!(!is_valid_ipv4(addr), "{addr}");
        }
    }

    #[test]
    fn test_valid_ipv6() {
        for addr in ["2001:db8::1", "::1", "::", "fe80::1:2:3:4", "::ffff:10.0.0.1"] {
            assert!(is_valid_ipv6(addr), "{addr}");
            assert!(!is_valid_ipv4(addr), "{addr}");
        }
        for addr in ["192.168.1.1", "not-an-ip", "2001:db8:::1", "example.com"] {
            assert!(!is_valid_ipv6(addr), "{addr}");
        }
    }

    #[test]
    fn test_policy_families() {
        assert_eq!(AddressFamilyPolicy::Ipv4.families(), &[AddressFamily::V4]);
        assert_eq!(AddressFamilyPolicy::Ipv6.families(), &[AddressFamily::V6]);
        assert_eq!(
            AddressFamilyPolicy::Both.families(),
            &[AddressFamily::V4, AddressFamily::V6]
        );
        assert_eq!(
            AddressFamilyPolicy::Any.families(),
            AddressFamilyPolicy::Both.families()
        );
        assert!(AddressFamilyPolicy::Any.stops_at_first_alive());
        assert!(!AddressFamilyPolicy::Both.stops_at_first_alive());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("ipv4".parse::<AddressFamilyPolicy>().unwrap(), AddressFamilyPolicy::Ipv4);
        assert_eq!("6".parse::<AddressFamilyPolicy>().unwrap(), AddressFamilyPolicy::Ipv6);
        assert_eq!("BOTH".parse::<AddressFamilyPolicy>().unwrap(), AddressFamilyPolicy::Both);
        assert_eq!("any".parse::<AddressFamilyPolicy>().unwrap(), AddressFamilyPolicy::Any);
        assert!("ipx".parse::<AddressFamilyPolicy>().is_err());
    }

    #[test]
    fn test_resolved_from_ip() {
        let addr = ResolvedAddress::from_ip("2001:db8::1".parse().unwrap());
        assert_eq!(addr.family, AddressFamily::V6);
        assert_eq!(addr.to_string(), "2001:db8::1");
    }
}
