//! BGP message and path attribute structs for the embedded PDUs carried by
//! BMP route monitoring, route mirroring, peer up and peer down messages.
use crate::models::network::*;
use bitflags::bitflags;
use ipnet::IpNet;
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use std::net::{Ipv4Addr, Ipv6Addr};

/// BGP message type, RFC 4271 §4.1.
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BgpMessageType {
    Open = 1,
    Update = 2,
    Notification = 3,
    KeepAlive = 4,
}

/// One decoded BGP message.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BgpMessage {
    Open(BgpOpenMessage),
    Update(BgpUpdateMessage),
    Notification(BgpNotificationMessage),
    KeepAlive,
}

impl BgpMessage {
    pub fn msg_type(&self) -> BgpMessageType {
        match self {
            BgpMessage::Open(_) => BgpMessageType::Open,
            BgpMessage::Update(_) => BgpMessageType::Update,
            BgpMessage::Notification(_) => BgpMessageType::Notification,
            BgpMessage::KeepAlive => BgpMessageType::KeepAlive,
        }
    }
}

/// BGP OPEN message, RFC 4271 §4.2.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BgpOpenMessage {
    pub version: u8,
    pub asn: Asn,
    pub hold_time: u16,
    pub sender_ip: Ipv4Addr,
    pub opt_params: Vec<OptParam>,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptParam {
    pub param_type: u8,
    pub param_len: u8,
    pub param_value: ParamValue,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    /// Capabilities parameter (type 2), RFC 5492. One parameter may carry
    /// several capability triples.
    Capabilities(Vec<Capability>),
    Raw(Vec<u8>),
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capability {
    pub code: u8,
    pub value: Vec<u8>,
}

/// BGP NOTIFICATION message, RFC 4271 §4.5.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BgpNotificationMessage {
    pub error_code: u8,
    pub error_subcode: u8,
    pub data: Vec<u8>,
}

/// BGP UPDATE message, RFC 4271 §4.3.
///
/// The plain withdrawn/announced prefix lists outside the path attributes are
/// IPv4 only; IPv6 routes travel in the MP_REACH_NLRI / MP_UNREACH_NLRI
/// attributes.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BgpUpdateMessage {
    pub withdrawn_prefixes: Vec<IpNet>,
    pub attributes: Vec<Attribute>,
    pub announced_prefixes: Vec<IpNet>,
}

impl BgpUpdateMessage {
    /// Returns the value of the first attribute with the given type code.
    pub fn find_attribute(&self, attr_type: AttrType) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attr| attr.attr_type == attr_type)
            .map(|attr| &attr.value)
    }
}

bitflags! {
    /// BGP path attribute flags octet, RFC 4271 §4.3.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AttrFlags: u8 {
        const OPTIONAL = 0b1000_0000;
        const TRANSITIVE = 0b0100_0000;
        const PARTIAL = 0b0010_0000;
        const EXTENDED = 0b0001_0000;
    }
}

/// Path attribute type codes.
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2>
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AttrType {
    ORIGIN = 1,
    AS_PATH = 2,
    NEXT_HOP = 3,
    MULTI_EXIT_DISCRIMINATOR = 4,
    LOCAL_PREFERENCE = 5,
    ATOMIC_AGGREGATE = 6,
    AGGREGATOR = 7,
    COMMUNITIES = 8,
    /// <https://tools.ietf.org/html/rfc4456>
    ORIGINATOR_ID = 9,
    CLUSTER_LIST = 10,
    /// <https://tools.ietf.org/html/rfc4760>
    MP_REACHABLE_NLRI = 14,
    MP_UNREACHABLE_NLRI = 15,
    #[num_enum(catch_all)]
    UNKNOWN(u8),
}

/// BGP path attribute with its flags octet and decoded value.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub attr_type: AttrType,
    pub flags: AttrFlags,
    pub value: AttributeValue,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    Origin(Origin),
    AsPath(Vec<AsPathSegment>),
    NextHop(Ipv4Addr),
    MultiExitDisc(u32),
    LocalPref(u32),
    AtomicAggregate,
    Aggregator(Asn, Ipv4Addr),
    Communities(Vec<Community>),
    OriginatorId(Ipv4Addr),
    ClusterList(Vec<Ipv4Addr>),
    MpReachNlri(MpNlri),
    MpUnreachNlri(MpNlri),
    /// Attribute types without a typed decoder are retained as opaque bytes.
    Unknown(u8, Vec<u8>),
}

/// ORIGIN attribute value, RFC 4271 §5.1.1.
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Origin {
    Igp = 0,
    Egp = 1,
    Incomplete = 2,
}

#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AsPathSegmentType {
    AsSet = 1,
    AsSequence = 2,
    ConfedSequence = 3,
    ConfedSet = 4,
}

#[derive(Debug, PartialEq, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AsPathSegment {
    pub segment_type: AsPathSegmentType,
    pub asns: Vec<Asn>,
}

/// Plain BGP community, RFC 1997: the high 16 bits are conventionally an ASN.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Community(pub u32);

impl std::fmt::Display for Community {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.0 >> 16, self.0 & 0xFFFF)
    }
}

/// AFI/SAFI-qualified NLRI set carried by MP_REACH_NLRI and MP_UNREACH_NLRI,
/// RFC 4760.
///
/// The address family codes are kept raw: an unrecognized AFI/SAFI pair is
/// not an error, it decodes to an empty route list with the codes preserved.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MpNlri {
    pub afi: u16,
    pub safi: u8,
    pub next_hop: Option<NextHopAddress>,
    pub prefixes: Vec<IpNet>,
}

impl MpNlri {
    /// The typed address family, when recognized.
    pub fn address_family(&self) -> Option<Afi> {
        Afi::try_from(self.afi).ok()
    }

    /// The typed subsequent address family, when recognized.
    pub fn sub_address_family(&self) -> Option<Safi> {
        Safi::try_from(self.safi).ok()
    }
}

/// Next hop address carried in MP_REACH_NLRI.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NextHopAddress {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Ipv6LinkLocal(Ipv6Addr, Ipv6Addr),
}
