use bitflags::bitflags;
use bytes::{Buf, Bytes};
use chrono::{DateTime, Utc};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::BmpParserError;
use crate::models::{Afi, Asn, AsnLength};
use crate::parser::utils::ReadUtils;

/// BMP message type enum.
///
/// ```text
///    o  Message Type (1 byte): This identifies the type of the BMP
///       message.
///
///       *  Type = 0: Route Monitoring
///       *  Type = 1: Statistics Report
///       *  Type = 2: Peer Down Notification
///       *  Type = 3: Peer Up Notification
///       *  Type = 4: Initiation Message
///       *  Type = 5: Termination Message
///       *  Type = 6: Route Mirroring Message
/// ```
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BmpMsgType {
    RouteMonitoring = 0,
    StatisticsReport = 1,
    PeerDownNotification = 2,
    PeerUpNotification = 3,
    InitiationMessage = 4,
    TerminationMessage = 5,
    RouteMirroringMessage = 6,
}

/// BMP Common Header
///
/// ```text
///       0                   1                   2                   3
///       0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///      +-+-+-+-+-+-+-+-+
///      |    Version    |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |                        Message Length                         |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |   Msg. Type   |
///      +---------------+
/// ```
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BmpCommonHeader {
    pub version: u8,
    /// Total message length in bytes, including the common header itself.
    pub msg_len: u32,
    pub msg_type: BmpMsgType,
}

impl BmpCommonHeader {
    pub const SIZE: usize = 6;
}

pub fn parse_bmp_common_header(data: &mut Bytes) -> Result<BmpCommonHeader, BmpParserError> {
    let version = data.read_u8()?;
    if version != 3 {
        // has to be 3 per RFC 7854
        return Err(BmpParserError::UnsupportedVersion(version));
    }

    let msg_len = data.read_u32()?;
    if (msg_len as usize) < BmpCommonHeader::SIZE {
        // a message cannot be shorter than its own header
        return Err(BmpParserError::Malformed(format!(
            "declared message length {} shorter than the common header",
            msg_len
        )));
    }

    let type_byte = data.read_u8()?;
    let msg_type = BmpMsgType::try_from(type_byte)
        .map_err(|_| BmpParserError::UnsupportedMessageType(type_byte))?;

    Ok(BmpCommonHeader {
        version,
        msg_len,
        msg_type,
    })
}

/// BMP peer type, RFC 7854 §4.2 and RFC 9069.
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BmpPeerType {
    Global = 0,
    RdInstance = 1,
    Local = 2,
    LocRib = 3,
}

bitflags! {
    /// Per-peer header flags octet.
    ///
    /// Bit 7 selects the address family of the 16-byte peer address field;
    /// bit 6 marks post-policy Adj-RIB data; bit 5 marks the legacy 2-byte
    /// AS_PATH encoding inside embedded updates; bit 4 marks filtered data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PeerFlags: u8 {
        const ADDRESS_IPV6 = 0b1000_0000;
        const POST_POLICY = 0b0100_0000;
        const LEGACY_AS_PATH = 0b0010_0000;
        const FILTERED = 0b0001_0000;
    }
}

/// BMP Per-peer Header
///
/// ```text
///       0                   1                   2                   3
///       0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |   Peer Type   |  Peer Flags   |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |         Peer Distinguisher (present based on peer type)       |
///      |                                                               |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |                 Peer Address (16 bytes)                       |
///      ~                                                               ~
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |                           Peer AS                             |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |                         Peer BGP ID                           |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |                    Timestamp (seconds)                        |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      |                  Timestamp (microseconds)                     |
///      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BmpPerPeerHeader {
    pub peer_type: BmpPeerType,
    pub peer_flags: PeerFlags,
    /// Raw 8-byte distinguisher; its interpretation depends on `peer_type`.
    pub peer_distinguisher: u64,
    pub peer_address: IpAddr,
    pub peer_asn: Asn,
    pub peer_bgp_id: Ipv4Addr,
    pub timestamp_secs: u32,
    pub timestamp_micros: u32,
}

impl BmpPerPeerHeader {
    pub const SIZE: usize = 42;

    /// Address family of the peer address, selected by the flags octet.
    pub fn afi(&self) -> Afi {
        match self.peer_flags.contains(PeerFlags::ADDRESS_IPV6) {
            true => Afi::Ipv6,
            false => Afi::Ipv4,
        }
    }

    /// ASN encoding used by the AS_PATH attribute of embedded BGP updates.
    pub fn asn_length(&self) -> AsnLength {
        match self.peer_flags.contains(PeerFlags::LEGACY_AS_PATH) {
            true => AsnLength::Bits16,
            false => AsnLength::Bits32,
        }
    }

    /// Timestamp of the route or event, or `None` when both timestamp fields
    /// are zero, which the protocol uses to mean "no timestamp available".
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if self.timestamp_secs == 0 && self.timestamp_micros == 0 {
            return None;
        }
        let nanos = self.timestamp_micros.checked_mul(1000)?;
        DateTime::from_timestamp(self.timestamp_secs as i64, nanos)
    }
}

pub fn parse_per_peer_header(data: &mut Bytes) -> Result<BmpPerPeerHeader, BmpParserError> {
    data.has_n_remaining(BmpPerPeerHeader::SIZE)?;

    let peer_type = BmpPeerType::try_from(data.get_u8())?;
    let peer_flags = PeerFlags::from_bits_retain(data.get_u8());
    let peer_distinguisher = data.get_u64();

    let peer_address = if peer_flags.contains(PeerFlags::ADDRESS_IPV6) {
        IpAddr::V6(Ipv6Addr::from(data.get_u128()))
    } else {
        // IPv4 is right-justified in the 16-byte field
        data.advance(12);
        IpAddr::V4(Ipv4Addr::from(data.get_u32()))
    };

    let peer_asn = Asn::new_32bit(data.get_u32());
    let peer_bgp_id = Ipv4Addr::from(data.get_u32());
    let timestamp_secs = data.get_u32();
    let timestamp_micros = data.get_u32();

    Ok(BmpPerPeerHeader {
        peer_type,
        peer_flags,
        peer_distinguisher,
        peer_address,
        peer_asn,
        peer_bgp_id,
        timestamp_secs,
        timestamp_micros,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_parse_bmp_common_header() {
        let mut data = Bytes::from_static(&[0x03, 0x00, 0x00, 0x00, 0x06, 0x04]);
        let header = parse_bmp_common_header(&mut data).unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.msg_len, 6);
        assert_eq!(header.msg_type, BmpMsgType::InitiationMessage);
    }

    #[test]
    fn test_unsupported_version() {
        let mut data = Bytes::from_static(&[0x02, 0x00, 0x00, 0x00, 0x06, 0x04]);
        assert!(matches!(
            parse_bmp_common_header(&mut data),
            Err(BmpParserError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_unsupported_message_type() {
        let mut data = Bytes::from_static(&[0x03, 0x00, 0x00, 0x00, 0x06, 0x07]);
        assert!(matches!(
            parse_bmp_common_header(&mut data),
            Err(BmpParserError::UnsupportedMessageType(7))
        ));
    }

    #[test]
    fn test_length_shorter_than_header() {
        let mut data = Bytes::from_static(&[0x03, 0x00, 0x00, 0x00, 0x05, 0x04]);
        assert!(matches!(
            parse_bmp_common_header(&mut data),
            Err(BmpParserError::Malformed(_))
        ));
    }

    fn peer_header_bytes(flags: u8, address: &[u8; 16]) -> BytesMut {
        let mut data = BytesMut::new();
        data.put_u8(0); // peer type: global
        data.put_u8(flags);
        data.put_u64(0); // distinguisher
        data.put_slice(address);
        data.put_u32(64512); // peer as
        data.put_slice(&[192, 0, 2, 1]); // bgp id
        data.put_u32(1_600_000_000);
        data.put_u32(250_000);
        data
    }

    #[test]
    fn test_parse_per_peer_header_ipv4() {
        let mut data = peer_header_bytes(0, &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 10, 1, 1, 1])
            .freeze();
        let header = parse_per_peer_header(&mut data).unwrap();
        assert_eq!(header.peer_type, BmpPeerType::Global);
        assert_eq!(header.afi(), Afi::Ipv4);
        assert_eq!(header.peer_address, "10.1.1.1".parse::<IpAddr>().unwrap());
        assert_eq!(header.peer_asn, 64512u32);
        assert_eq!(header.peer_bgp_id, Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(header.asn_length(), AsnLength::Bits32);
        assert_eq!(data.remaining(), 0);
    }

    #[test]
    fn test_parse_per_peer_header_ipv6() {
        let mut data = peer_header_bytes(
            0b1000_0000,
            &[0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        )
        .freeze();
        let header = parse_per_peer_header(&mut data).unwrap();
        assert_eq!(header.afi(), Afi::Ipv6);
        assert_eq!(
            header.peer_address,
            "2001:db8::1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_legacy_as_path_flag() {
        let mut data = peer_header_bytes(0b0010_0000, &[0; 16]).freeze();
        let header = parse_per_peer_header(&mut data).unwrap();
        assert_eq!(header.asn_length(), AsnLength::Bits16);
        assert!(header.peer_flags.contains(PeerFlags::LEGACY_AS_PATH));
    }

    #[test]
    fn test_timestamp() {
        let mut data = peer_header_bytes(0, &[0; 16]).freeze();
        let header = parse_per_peer_header(&mut data).unwrap();
        let ts = header.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1_600_000_000);
        assert_eq!(ts.timestamp_subsec_micros(), 250_000);

        // both fields zero means no timestamp, not an error
        let header = BmpPerPeerHeader {
            timestamp_secs: 0,
            timestamp_micros: 0,
            ..header
        };
        assert_eq!(header.timestamp(), None);
    }

    #[test]
    fn test_truncated_per_peer_header() {
        let mut data = Bytes::from_static(&[0x00, 0x00, 0x00]);
        assert!(matches!(
            parse_per_peer_header(&mut data),
            Err(BmpParserError::IncompleteMessage { .. })
        ));
    }
}
