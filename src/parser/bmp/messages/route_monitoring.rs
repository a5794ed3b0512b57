use bytes::Bytes;

use crate::error::BmpParserError;
use crate::models::{BgpMessage, BgpUpdateMessage};
use crate::parser::bgp::parse_bgp_message;
use crate::parser::bmp::messages::headers::BmpPerPeerHeader;

/// BMP route monitoring message: one embedded BGP UPDATE, RFC 7854 §4.6.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMonitoring {
    pub bgp_update: BgpUpdateMessage,
}

pub fn parse_route_monitoring(
    data: &mut Bytes,
    peer_header: &BmpPerPeerHeader,
) -> Result<RouteMonitoring, BmpParserError> {
    match parse_bgp_message(data, peer_header.asn_length())? {
        BgpMessage::Update(bgp_update) => Ok(RouteMonitoring { bgp_update }),
        other => Err(BmpParserError::Malformed(format!(
            "route monitoring must carry a BGP UPDATE, got {:?}",
            other.msg_type()
        ))),
    }
}
