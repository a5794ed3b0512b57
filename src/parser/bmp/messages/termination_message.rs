use bytes::{Buf, Bytes};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::error::BmpParserError;
use crate::parser::utils::ReadUtils;

/// BMP termination message: TLVs explaining why the monitored router is
/// closing the session, RFC 7854 §4.5.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminationMessage {
    pub tlvs: Vec<TerminationTlv>,
}

#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum TerminationTlvType {
    String = 0,
    Reason = 1,
    #[num_enum(catch_all)]
    Unknown(u16),
}

#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum TerminationReason {
    AdministrativelyClosed = 0,
    UnspecifiedReason = 1,
    OutOfResources = 2,
    RedundantConnection = 3,
    PermanentlyClosed = 4,
    #[num_enum(catch_all)]
    Unknown(u16),
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminationTlv {
    pub info_type: TerminationTlvType,
    pub info_len: u16,
    pub value: TerminationTlvValue,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationTlvValue {
    String(String),
    Reason(TerminationReason),
    /// Unknown info types are retained as opaque bytes.
    Unknown(Vec<u8>),
}

pub fn parse_termination_message(data: &mut Bytes) -> Result<TerminationMessage, BmpParserError> {
    let mut tlvs = vec![];

    while data.remaining() > 0 {
        let info_type = TerminationTlvType::from(data.read_u16()?);
        let info_len = data.read_u16()?;
        if data.remaining() < info_len as usize {
            return Err(BmpParserError::Malformed(format!(
                "termination TLV length {} exceeds remaining {} bytes",
                info_len,
                data.remaining()
            )));
        }
        let value = match info_type {
            TerminationTlvType::String => {
                TerminationTlvValue::String(data.read_n_bytes_to_string(info_len as usize)?)
            }
            TerminationTlvType::Reason => {
                if info_len != 2 {
                    return Err(BmpParserError::Malformed(format!(
                        "termination reason TLV has length {}, expected 2",
                        info_len
                    )));
                }
                TerminationTlvValue::Reason(TerminationReason::from(data.read_u16()?))
            }
            TerminationTlvType::Unknown(t) => {
                debug!("retaining unknown termination TLV type {}", t);
                TerminationTlvValue::Unknown(data.read_n_bytes(info_len as usize)?)
            }
        };
        tlvs.push(TerminationTlv {
            info_type,
            info_len,
            value,
        });
    }

    Ok(TerminationMessage { tlvs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_parse_termination_message() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(1); // reason
        buffer.put_u16(2);
        buffer.put_u16(0); // administratively closed
        buffer.put_u16(0); // string
        buffer.put_u16(8);
        buffer.put_slice(b"shutdown");

        let msg = parse_termination_message(&mut buffer.freeze()).unwrap();
        assert_eq!(
            msg.tlvs,
            vec![
                TerminationTlv {
                    info_type: TerminationTlvType::Reason,
                    info_len: 2,
                    value: TerminationTlvValue::Reason(TerminationReason::AdministrativelyClosed),
                },
                TerminationTlv {
                    info_type: TerminationTlvType::String,
                    info_len: 8,
                    value: TerminationTlvValue::String("shutdown".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_termination_tlv_retained() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(7);
        buffer.put_u16(3);
        buffer.put_slice(&[1, 2, 3]);

        let msg = parse_termination_message(&mut buffer.freeze()).unwrap();
        assert_eq!(msg.tlvs[0].info_type, TerminationTlvType::Unknown(7));
        assert_eq!(
            msg.tlvs[0].value,
            TerminationTlvValue::Unknown(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_bad_reason_length() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(1);
        buffer.put_u16(4);
        buffer.put_u32(0);

        assert!(matches!(
            parse_termination_message(&mut buffer.freeze()),
            Err(BmpParserError::Malformed(_))
        ));
    }
}
