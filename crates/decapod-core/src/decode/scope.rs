use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier namespace a protocol field is interpreted within.
///
/// Lookup keys are layer-scoped: IP protocol 47 (GRE) and ethertype 0x0800
/// live in different scopes and never collide in the registry.
///
/// # Examples
/// ```
/// use decapod_core::decode::Scope;
///
/// assert_ne!(Scope::EtherType, Scope::IpProto);
/// assert_eq!(Scope::ALL.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Capture link-layer types (pcap linktype numbers).
    Link,
    /// Ethernet ethertypes, also used by GRE/VLAN/MPLS payload selection.
    EtherType,
    /// IPv4 protocol / IPv6 next-header numbers.
    IpProto,
    /// PPP protocol field values.
    PppProto,
    /// Well-known UDP destination ports claimed by tunnel codecs.
    UdpPort,
}

impl Scope {
    /// Every scope the registry recognizes by default.
    pub const ALL: [Scope; 5] = [
        Scope::Link,
        Scope::EtherType,
        Scope::IpProto,
        Scope::PppProto,
        Scope::UdpPort,
    ];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Link => "link",
            Scope::EtherType => "ether-type",
            Scope::IpProto => "ip-proto",
            Scope::PppProto => "ppp-proto",
            Scope::UdpPort => "udp-port",
        };
        f.write_str(name)
    }
}

/// Numeric protocol identifier, meaningful only within its [`Scope`].
///
/// # Examples
/// ```
/// use decapod_core::decode::ProtocolId;
///
/// let id = ProtocolId::from(0x0800u16);
/// assert_eq!(id.0, 0x0800);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolId(pub u32);

impl From<u8> for ProtocolId {
    fn from(value: u8) -> Self {
        ProtocolId(value as u32)
    }
}

impl From<u16> for ProtocolId {
    fn from(value: u16) -> Self {
        ProtocolId(value as u32)
    }
}

impl From<u32> for ProtocolId {
    fn from(value: u32) -> Self {
        ProtocolId(value)
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `(scope, identifier)` pair: the registry lookup key.
///
/// # Examples
/// ```
/// use decapod_core::decode::{Claim, Scope};
///
/// let gre = Claim::new(Scope::IpProto, 47);
/// assert_eq!(gre.scope, Scope::IpProto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Namespace the identifier is interpreted within.
    pub scope: Scope,
    /// Identifier value inside that namespace.
    pub id: ProtocolId,
}

impl Claim {
    pub const fn new(scope: Scope, id: u32) -> Self {
        Claim {
            scope,
            id: ProtocolId(id),
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.id)
    }
}
