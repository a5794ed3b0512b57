use bytes::{Buf, Bytes};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};
use std::net::IpAddr;

use crate::error::BmpParserError;
use crate::models::{BgpMessage, BgpOpenMessage};
use crate::parser::bgp::parse_bgp_message;
use crate::parser::bmp::messages::headers::BmpPerPeerHeader;
use crate::parser::utils::ReadUtils;

/// BMP peer up notification, RFC 7854 §4.10.
///
/// The OPEN captures are optional: an exporter that never recorded the
/// session establishment sends the fixed fields only, which yields empty
/// capability data rather than an error.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerUpNotification {
    pub local_addr: IpAddr,
    pub local_port: u16,
    pub remote_port: u16,
    pub sent_open: Option<BgpOpenMessage>,
    pub received_open: Option<BgpOpenMessage>,
    pub tlvs: Vec<PeerUpTlv>,
}

/// Type-Length-Value Type
///
/// <https://www.iana.org/assignments/bmp-parameters/bmp-parameters.xhtml#initiation-peer-up-tlvs>
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum PeerUpTlvType {
    String = 0,
    SysDescr = 1,
    SysName = 2,
    VrTableName = 3,
    AdminLabel = 4,
    #[num_enum(catch_all)]
    Unknown(u16),
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerUpTlv {
    pub info_type: PeerUpTlvType,
    pub info_len: u16,
    pub info: String,
}

pub fn parse_peer_up_notification(
    data: &mut Bytes,
    peer_header: &BmpPerPeerHeader,
) -> Result<PeerUpNotification, BmpParserError> {
    let local_addr = data.read_16b_address(peer_header.afi())?;
    let local_port = data.read_u16()?;
    let remote_port = data.read_u16()?;

    let mut sent_open = None;
    let mut received_open = None;
    if data.has_remaining() {
        sent_open = Some(parse_open_capture(data, peer_header)?);
    }
    if data.has_remaining() {
        received_open = Some(parse_open_capture(data, peer_header)?);
    }

    let mut tlvs = vec![];
    while data.remaining() > 0 {
        let info_type = PeerUpTlvType::from(data.read_u16()?);
        let info_len = data.read_u16()?;
        if data.remaining() < info_len as usize {
            return Err(BmpParserError::Malformed(format!(
                "peer up TLV length {} exceeds remaining {} bytes",
                info_len,
                data.remaining()
            )));
        }
        let info = data.read_n_bytes_to_string(info_len as usize)?;
        if let PeerUpTlvType::Unknown(t) = info_type {
            debug!("retaining unknown peer up TLV type {}", t);
        }
        tlvs.push(PeerUpTlv {
            info_type,
            info_len,
            info,
        });
    }

    Ok(PeerUpNotification {
        local_addr,
        local_port,
        remote_port,
        sent_open,
        received_open,
        tlvs,
    })
}

fn parse_open_capture(
    data: &mut Bytes,
    peer_header: &BmpPerPeerHeader,
) -> Result<BgpOpenMessage, BmpParserError> {
    match parse_bgp_message(data, peer_header.asn_length())? {
        BgpMessage::Open(open) => Ok(open),
        other => Err(BmpParserError::Malformed(format!(
            "expected BGP OPEN capture in peer up notification, got {:?}",
            other.msg_type()
        ))),
    }
}
