use bytes::{Buf, Bytes};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::error::BmpParserError;
use crate::parser::utils::ReadUtils;

/// BMP initiation message: informational TLVs announcing the monitored
/// router, RFC 7854 §4.3.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiationMessage {
    pub tlvs: Vec<InitiationTlv>,
}

/// Type-Length-Value Type
///
/// <https://www.iana.org/assignments/bmp-parameters/bmp-parameters.xhtml#initiation-peer-up-tlvs>
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum InitiationTlvType {
    String = 0,
    SysDescr = 1,
    SysName = 2,
    /// These messages are informational strings; unknown info types are
    /// retained rather than dropped.
    #[num_enum(catch_all)]
    Unknown(u16),
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiationTlv {
    pub info_type: InitiationTlvType,
    pub info_len: u16,
    pub info: String,
}

/// Parse BMP initiation message
///
/// <https://www.rfc-editor.org/rfc/rfc7854#section-4.3>
pub fn parse_initiation_message(data: &mut Bytes) -> Result<InitiationMessage, BmpParserError> {
    let mut tlvs = vec![];

    while data.remaining() > 0 {
        let info_type = InitiationTlvType::from(data.read_u16()?);
        let info_len = data.read_u16()?;
        if data.remaining() < info_len as usize {
            return Err(BmpParserError::Malformed(format!(
                "initiation TLV length {} exceeds remaining {} bytes",
                info_len,
                data.remaining()
            )));
        }
        let info = data.read_n_bytes_to_string(info_len as usize)?;
        if let InitiationTlvType::Unknown(t) = info_type {
            debug!("retaining unknown initiation TLV type {}", t);
        }
        tlvs.push(InitiationTlv {
            info_type,
            info_len,
            info,
        });
    }

    Ok(InitiationMessage { tlvs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_parse_initiation_message() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(2); // sysName
        buffer.put_u16(4);
        buffer.put_slice(b"bmp1");
        buffer.put_u16(1); // sysDescr
        buffer.put_u16(9);
        buffer.put_slice(b"router-os");

        let mut bytes = buffer.freeze();
        let msg = parse_initiation_message(&mut bytes).unwrap();
        assert_eq!(
            msg.tlvs,
            vec![
                InitiationTlv {
                    info_type: InitiationTlvType::SysName,
                    info_len: 4,
                    info: "bmp1".to_string(),
                },
                InitiationTlv {
                    info_type: InitiationTlvType::SysDescr,
                    info_len: 9,
                    info: "router-os".to_string(),
                },
            ]
        );
        assert_eq!(bytes.remaining(), 0);
    }

    #[test]
    fn test_empty_initiation_message() {
        let mut bytes = Bytes::new();
        let msg = parse_initiation_message(&mut bytes).unwrap();
        assert!(msg.tlvs.is_empty());
    }

    #[test]
    fn test_unknown_tlv_type_retained() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(999);
        buffer.put_u16(2);
        buffer.put_slice(b"ok");

        let msg = parse_initiation_message(&mut buffer.freeze()).unwrap();
        assert_eq!(msg.tlvs[0].info_type, InitiationTlvType::Unknown(999));
        assert_eq!(msg.tlvs[0].info, "ok");
    }

    #[test]
    fn test_tlv_length_overrun() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(2);
        buffer.put_u16(10); // declares 10 bytes, supplies 2
        buffer.put_slice(b"ok");

        assert!(matches!(
            parse_initiation_message(&mut buffer.freeze()),
            Err(BmpParserError::Malformed(_))
        ));
    }
}
