use bytes::{Buf, Bytes};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::BmpParserError;
use crate::parser::utils::ReadUtils;

/// Reason code of a peer down notification, RFC 7854 §4.9.
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PeerDownReason {
    /// The local system closed the session; a BGP NOTIFICATION that would
    /// have been sent to the peer follows.
    LocalNotification = 1,
    /// The local system closed the session without a notification; a 2-byte
    /// FSM event code follows (0 meaning no relevant event is defined).
    LocalFsmEvent = 2,
    /// The remote system closed the session; the received BGP NOTIFICATION
    /// follows.
    RemoteNotification = 3,
    /// The remote system closed the session without a notification.
    RemoteClosed = 4,
    /// The peer was de-configured and will no longer be reported on.
    PeerDeconfigured = 5,
}

/// BMP peer down notification.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerDownNotification {
    pub reason: PeerDownReason,
    /// Raw bytes of the captured BGP NOTIFICATION PDU, present for the
    /// local/remote notification reasons.
    pub notification: Option<Vec<u8>>,
    /// FSM event code, present for the local-FSM-event reason.
    pub fsm_event_code: Option<u16>,
    /// Trailing TLVs, e.g. the VRF/table name of RFC 9069. Only the reasons
    /// without a notification capture can carry them.
    pub tlvs: Vec<PeerDownTlv>,
}

/// Trailing peer down TLV, kept raw.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerDownTlv {
    pub info_type: u16,
    pub info_len: u16,
    pub value: Vec<u8>,
}

pub fn parse_peer_down_notification(
    data: &mut Bytes,
) -> Result<PeerDownNotification, BmpParserError> {
    let reason = PeerDownReason::try_from(data.read_u8()?)?;

    let mut notification = None;
    let mut fsm_event_code = None;
    match reason {
        PeerDownReason::LocalNotification | PeerDownReason::RemoteNotification => {
            let bytes_left = data.remaining();
            notification = Some(data.read_n_bytes(bytes_left)?);
        }
        PeerDownReason::LocalFsmEvent => {
            fsm_event_code = Some(data.read_u16()?);
        }
        PeerDownReason::RemoteClosed | PeerDownReason::PeerDeconfigured => {}
    }

    let mut tlvs = vec![];
    while data.remaining() > 0 {
        let info_type = data.read_u16()?;
        let info_len = data.read_u16()?;
        if data.remaining() < info_len as usize {
            return Err(BmpParserError::Malformed(format!(
                "peer down TLV length {} exceeds remaining {} bytes",
                info_len,
                data.remaining()
            )));
        }
        tlvs.push(PeerDownTlv {
            info_type,
            info_len,
            value: data.read_n_bytes(info_len as usize)?,
        });
    }

    Ok(PeerDownNotification {
        reason,
        notification,
        fsm_event_code,
        tlvs,
    })
}
