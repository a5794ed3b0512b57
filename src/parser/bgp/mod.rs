/*!
Decoders for the BGP PDUs embedded in BMP messages: the OPEN captures of a
peer up notification and the UPDATE carried by route monitoring and route
mirroring.
*/
pub mod attributes;

use bytes::{Buf, Bytes};

use crate::error::BmpParserError;
use crate::models::*;
use crate::parser::utils::{parse_nlri_list, ReadUtils};

/// Size of the fixed BGP message header: 16-byte marker, length, type.
pub const BGP_HEADER_SIZE: usize = 19;

/// Parse one BGP message off the front of `data`.
///
/// Format (RFC 4271 §4.1):
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                           Marker                              |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Length               |      Type     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The declared length bounds the body slice exactly; a body decoder that
/// leaves bytes unconsumed makes the whole message malformed.
pub fn parse_bgp_message(
    data: &mut Bytes,
    asn_len: AsnLength,
) -> Result<BgpMessage, BmpParserError> {
    data.has_n_remaining(BGP_HEADER_SIZE)?;
    data.advance(16); // marker carries no information, RFC 4271 §4.1
    let length = data.get_u16() as usize;
    if !(BGP_HEADER_SIZE..=4096).contains(&length) {
        return Err(BmpParserError::Malformed(format!(
            "invalid BGP message length {}",
            length
        )));
    }
    let msg_type = BgpMessageType::try_from(data.get_u8())?;

    let body_len = length - BGP_HEADER_SIZE;
    data.has_n_remaining(body_len)?;
    let mut body = data.split_to(body_len);

    let msg = match msg_type {
        BgpMessageType::Open => BgpMessage::Open(parse_bgp_open_message(&mut body)?),
        BgpMessageType::Update => BgpMessage::Update(parse_bgp_update_message(&mut body, asn_len)?),
        BgpMessageType::Notification => {
            BgpMessage::Notification(parse_bgp_notification_message(&mut body)?)
        }
        BgpMessageType::KeepAlive => BgpMessage::KeepAlive,
    };

    if body.has_remaining() {
        return Err(BmpParserError::Malformed(format!(
            "BGP {:?} message left {} bytes unconsumed",
            msg_type,
            body.remaining()
        )));
    }
    Ok(msg)
}

pub fn parse_bgp_open_message(data: &mut Bytes) -> Result<BgpOpenMessage, BmpParserError> {
    let version = data.read_u8()?;
    let asn = Asn::new_16bit(data.read_u16()?);
    let hold_time = data.read_u16()?;
    let sender_ip = data.read_ipv4_address()?;

    let opt_params_len = data.read_u8()? as usize;
    data.has_n_remaining(opt_params_len)?;
    let mut params_data = data.split_to(opt_params_len);

    let mut opt_params = vec![];
    while params_data.remaining() > 0 {
        let param_type = params_data.read_u8()?;
        let param_len = params_data.read_u8()?;
        params_data.has_n_remaining(param_len as usize)?;
        let mut value = params_data.split_to(param_len as usize);

        // https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-11
        let param_value = match param_type {
            2 => {
                let mut capabilities = vec![];
                while value.remaining() > 0 {
                    let code = value.read_u8()?;
                    let len = value.read_u8()? as usize;
                    capabilities.push(Capability {
                        code,
                        value: value.read_n_bytes(len)?,
                    });
                }
                ParamValue::Capabilities(capabilities)
            }
            _ => ParamValue::Raw(value.read_n_bytes(param_len as usize)?),
        };
        opt_params.push(OptParam {
            param_type,
            param_len,
            param_value,
        });
    }

    Ok(BgpOpenMessage {
        version,
        asn,
        hold_time,
        sender_ip,
        opt_params,
    })
}

pub fn parse_bgp_notification_message(
    data: &mut Bytes,
) -> Result<BgpNotificationMessage, BmpParserError> {
    let error_code = data.read_u8()?;
    let error_subcode = data.read_u8()?;
    let bytes_left = data.remaining();
    let data = data.read_n_bytes(bytes_left)?;
    Ok(BgpNotificationMessage {
        error_code,
        error_subcode,
        data,
    })
}

/// Parse a BGP UPDATE body: withdrawn routes, path attributes, and reachable
/// NLRI, each bounded by its own declared length.
pub fn parse_bgp_update_message(
    data: &mut Bytes,
    asn_len: AsnLength,
) -> Result<BgpUpdateMessage, BmpParserError> {
    // prefixes outside the attributes are IPv4 only
    let withdrawn_len = data.read_u16()? as usize;
    if data.remaining() < withdrawn_len {
        return Err(BmpParserError::Malformed(format!(
            "withdrawn routes length {} exceeds remaining {} bytes",
            withdrawn_len,
            data.remaining()
        )));
    }
    let withdrawn_prefixes = parse_nlri_list(data.split_to(withdrawn_len), Afi::Ipv4)?;

    let attr_len = data.read_u16()? as usize;
    if data.remaining() < attr_len {
        return Err(BmpParserError::Malformed(format!(
            "path attribute length {} exceeds remaining {} bytes",
            attr_len,
            data.remaining()
        )));
    }
    let attributes = attributes::parse_attributes(data.split_to(attr_len), asn_len)?;

    let announced_prefixes = parse_nlri_list(data.split_to(data.remaining()), Afi::Ipv4)?;

    Ok(BgpUpdateMessage {
        withdrawn_prefixes,
        attributes,
        announced_prefixes,
    })
}
