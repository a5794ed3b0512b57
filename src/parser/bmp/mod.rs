/*!
BMP message decoding, RFC 7854.

The entry point is [`parse_bmp_msg`], which consumes exactly one framed BMP
message from the front of a [`Bytes`] buffer and returns a typed, immutable
[`BmpMessage`]. Use [`parse_bmp_msg_with_peers`] to also resolve peer
metadata through a [`PeerAccessor`].
*/
pub mod messages;
pub mod peer;
pub mod visitor;

use bytes::{Buf, Bytes};

use crate::error::BmpParserError;
use crate::parser::bmp::messages::*;
use crate::parser::bmp::peer::{NoPeerInfo, PeerAccessor, PeerInfo};
use crate::parser::utils::ReadUtils;

/// A fully decoded BMP message.
///
/// `per_peer_header` and `peer_info` are `None` for the message kinds that
/// carry no per-peer header (initiation and termination).
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BmpMessage {
    pub common_header: BmpCommonHeader,
    pub per_peer_header: Option<BmpPerPeerHeader>,
    pub peer_info: Option<PeerInfo>,
    pub message_body: MessageBody,
}

/// Typed body of a BMP message, one variant per message type.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageBody {
    RouteMonitoring(RouteMonitoring),
    StatsReport(StatsReport),
    PeerDownNotification(PeerDownNotification),
    PeerUpNotification(PeerUpNotification),
    InitiationMessage(InitiationMessage),
    TerminationMessage(TerminationMessage),
    RouteMirroring(RouteMirroring),
}

/// Parse one BMP message from the buffer without peer resolution.
///
/// The buffer is advanced past the message on success. An
/// [`BmpParserError::IncompleteMessage`] error means the buffer ends before
/// the message does; retry once more bytes have arrived.
pub fn parse_bmp_msg(data: &mut Bytes) -> Result<BmpMessage, BmpParserError> {
    parse_bmp_msg_with_peers(data, &NoPeerInfo)
}

/// Parse one BMP message and resolve its peer through `peers`.
///
/// Only the message kinds with a per-peer header are resolved; failure to
/// resolve is not an error and leaves `peer_info` as `None`.
pub fn parse_bmp_msg_with_peers(
    data: &mut Bytes,
    peers: &(impl PeerAccessor + ?Sized),
) -> Result<BmpMessage, BmpParserError> {
    data.has_n_remaining(BmpCommonHeader::SIZE)?;
    let mut header_data = data.slice(0..BmpCommonHeader::SIZE);
    let common_header = parse_bmp_common_header(&mut header_data)?;

    // the buffer is only advanced once the whole frame is present, so an
    // incomplete read can be retried after more bytes arrive
    data.has_n_remaining(common_header.msg_len as usize)?;
    data.advance(BmpCommonHeader::SIZE);
    let mut payload = data.split_to(common_header.msg_len as usize - BmpCommonHeader::SIZE);

    // from here on the payload slice is exactly the declared size, so any
    // shortage is a lying inner length, not missing input
    let (per_peer_header, message_body) = parse_payload(&mut payload, common_header.msg_type)
        .map_err(BmpParserError::into_payload_error)?;

    if payload.has_remaining() {
        return Err(BmpParserError::Malformed(format!(
            "message left {} payload bytes unconsumed",
            payload.remaining()
        )));
    }

    let peer_info = per_peer_header
        .as_ref()
        .and_then(|header| peers.peer_info(header));

    Ok(BmpMessage {
        common_header,
        per_peer_header,
        peer_info,
        message_body,
    })
}

fn parse_payload(
    data: &mut Bytes,
    msg_type: BmpMsgType,
) -> Result<(Option<BmpPerPeerHeader>, MessageBody), BmpParserError> {
    match msg_type {
        BmpMsgType::RouteMonitoring => {
            let peer_header = parse_per_peer_header(data)?;
            let body = parse_route_monitoring(data, &peer_header)?;
            Ok((Some(peer_header), MessageBody::RouteMonitoring(body)))
        }
        BmpMsgType::StatisticsReport => {
            let peer_header = parse_per_peer_header(data)?;
            let body = parse_stats_report(data)?;
            Ok((Some(peer_header), MessageBody::StatsReport(body)))
        }
        BmpMsgType::PeerDownNotification => {
            let peer_header = parse_per_peer_header(data)?;
            let body = parse_peer_down_notification(data)?;
            Ok((Some(peer_header), MessageBody::PeerDownNotification(body)))
        }
        BmpMsgType::PeerUpNotification => {
            let peer_header = parse_per_peer_header(data)?;
            let body = parse_peer_up_notification(data, &peer_header)?;
            Ok((Some(peer_header), MessageBody::PeerUpNotification(body)))
        }
        BmpMsgType::InitiationMessage => {
            let body = parse_initiation_message(data)?;
            Ok((None, MessageBody::InitiationMessage(body)))
        }
        BmpMsgType::TerminationMessage => {
            let body = parse_termination_message(data)?;
            Ok((None, MessageBody::TerminationMessage(body)))
        }
        BmpMsgType::RouteMirroringMessage => {
            let peer_header = parse_per_peer_header(data)?;
            let body = parse_route_mirroring(data, &peer_header)?;
            Ok((Some(peer_header), MessageBody::RouteMirroring(body)))
        }
    }
}
