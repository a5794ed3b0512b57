use bytes::{Buf, Bytes};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::error::BmpParserError;
use crate::models::BgpMessage;
use crate::parser::bgp::parse_bgp_message;
use crate::parser::bmp::messages::headers::BmpPerPeerHeader;
use crate::parser::utils::ReadUtils;

/// BMP route mirroring message: verbatim duplicates of messages received
/// from the peer, RFC 7854 §4.7.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMirroring {
    pub tlvs: Vec<RouteMirroringTlv>,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMirroringTlv {
    pub info_len: u16,
    pub value: RouteMirroringValue,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteMirroringValue {
    /// A mirrored BGP PDU (TLV type 0).
    BgpMessage(BgpMessage),
    /// An information code (TLV type 1), e.g. signalling truncation.
    Information(RouteMirroringInfo),
    /// Unknown TLV types are retained as opaque bytes.
    Unknown(u16, Vec<u8>),
}

#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum RouteMirroringInfo {
    ErroredPdu = 0,
    MessagesLost = 1,
    #[num_enum(catch_all)]
    Unknown(u16),
}

pub fn parse_route_mirroring(
    data: &mut Bytes,
    peer_header: &BmpPerPeerHeader,
) -> Result<RouteMirroring, BmpParserError> {
    let mut tlvs = vec![];

    while data.remaining() > 0 {
        let tlv_type = data.read_u16()?;
        let info_len = data.read_u16()?;
        if data.remaining() < info_len as usize {
            return Err(BmpParserError::Malformed(format!(
                "route mirroring TLV length {} exceeds remaining {} bytes",
                info_len,
                data.remaining()
            )));
        }
        let mut value_data = data.split_to(info_len as usize);

        let value = match tlv_type {
            0 => {
                let msg = parse_bgp_message(&mut value_data, peer_header.asn_length())?;
                if value_data.has_remaining() {
                    return Err(BmpParserError::Malformed(format!(
                        "mirrored BGP PDU left {} TLV bytes unconsumed",
                        value_data.remaining()
                    )));
                }
                RouteMirroringValue::BgpMessage(msg)
            }
            1 => {
                if info_len != 2 {
                    return Err(BmpParserError::Malformed(format!(
                        "route mirroring information TLV has length {}, expected 2",
                        info_len
                    )));
                }
                RouteMirroringValue::Information(RouteMirroringInfo::from(value_data.get_u16()))
            }
            t => {
                debug!("retaining unknown route mirroring TLV type {}", t);
                let bytes_left = value_data.remaining();
                RouteMirroringValue::Unknown(t, value_data.read_n_bytes(bytes_left)?)
            }
        };
        tlvs.push(RouteMirroringTlv { info_len, value });
    }

    Ok(RouteMirroring { tlvs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::bmp::messages::headers::parse_per_peer_header;
    use bytes::{BufMut, BytesMut};

    fn peer_header() -> BmpPerPeerHeader {
        let mut data = BytesMut::new();
        data.put_u8(0);
        data.put_u8(0);
        data.put_u64(0);
        data.put_slice(&[0; 16]);
        data.put_u32(65001);
        data.put_u32(0);
        data.put_u64(0);
        parse_per_peer_header(&mut data.freeze()).unwrap()
    }

    #[test]
    fn test_parse_route_mirroring() {
        // a mirrored empty UPDATE followed by a "messages lost" information TLV
        let mut pdu = BytesMut::new();
        pdu.put_slice(&[0xFF; 16]);
        pdu.put_u16(23);
        pdu.put_u8(2); // UPDATE
        pdu.put_u16(0); // withdrawn routes length
        pdu.put_u16(0); // total path attribute length

        let mut data = BytesMut::new();
        data.put_u16(0); // BGP message TLV
        data.put_u16(pdu.len() as u16);
        data.put_slice(&pdu.freeze());
        data.put_u16(1); // information TLV
        data.put_u16(2);
        data.put_u16(1); // messages lost

        let msg = parse_route_mirroring(&mut data.freeze(), &peer_header()).unwrap();
        assert_eq!(msg.tlvs.len(), 2);
        assert!(matches!(
            msg.tlvs[0].value,
            RouteMirroringValue::BgpMessage(BgpMessage::Update(_))
        ));
        assert_eq!(
            msg.tlvs[1].value,
            RouteMirroringValue::Information(RouteMirroringInfo::MessagesLost)
        );
    }

    #[test]
    fn test_unknown_mirroring_tlv_retained() {
        let mut data = BytesMut::new();
        data.put_u16(9);
        data.put_u16(3);
        data.put_slice(&[1, 2, 3]);

        let msg = parse_route_mirroring(&mut data.freeze(), &peer_header()).unwrap();
        assert_eq!(
            msg.tlvs[0].value,
            RouteMirroringValue::Unknown(9, vec![1, 2, 3])
        );
    }

    #[test]
    fn test_mirroring_tlv_length_overrun() {
        let mut data = BytesMut::new();
        data.put_u16(1);
        data.put_u16(50);
        data.put_u16(0);

        assert!(matches!(
            parse_route_mirroring(&mut data.freeze(), &peer_header()),
            Err(BmpParserError::Malformed(_))
        ));
    }
}
