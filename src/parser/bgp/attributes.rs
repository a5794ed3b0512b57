//! BGP path attribute decoding, including the multiprotocol NLRI attributes
//! (RFC 4760) used to carry IPv6 and other address families.
use bytes::{Buf, Bytes};
use log::{debug, warn};

use crate::error::BmpParserError;
use crate::models::*;
use crate::parser::utils::{parse_nlri_list, ReadUtils};

/// Parse the path attribute section of a BGP UPDATE.
///
/// Each attribute is `{flags, type, length, value}` with a 1-byte length, or
/// a 2-byte length when the extended-length flag bit is set. The declared
/// length bounds the value slice exactly, regardless of how many bytes remain
/// in the section.
pub fn parse_attributes(
    mut data: Bytes,
    asn_len: AsnLength,
) -> Result<Vec<Attribute>, BmpParserError> {
    let mut attributes = vec![];

    while data.remaining() > 0 {
        let flags = AttrFlags::from_bits_retain(data.read_u8()?);
        let type_code = data.read_u8()?;
        let length = match flags.contains(AttrFlags::EXTENDED) {
            true => data.read_u16()? as usize,
            false => data.read_u8()? as usize,
        };
        if data.remaining() < length {
            return Err(BmpParserError::Malformed(format!(
                "attribute type {} claims {} bytes with only {} remaining",
                type_code,
                length,
                data.remaining()
            )));
        }
        let mut attr_data = data.split_to(length);

        let attr_type = AttrType::from(type_code);
        let value = match attr_type {
            AttrType::ORIGIN => AttributeValue::Origin(Origin::try_from(attr_data.read_u8()?)?),
            AttrType::AS_PATH => AttributeValue::AsPath(parse_as_path(&mut attr_data, asn_len)?),
            AttrType::NEXT_HOP => AttributeValue::NextHop(attr_data.read_ipv4_address()?),
            AttrType::MULTI_EXIT_DISCRIMINATOR => {
                AttributeValue::MultiExitDisc(attr_data.read_u32()?)
            }
            AttrType::LOCAL_PREFERENCE => AttributeValue::LocalPref(attr_data.read_u32()?),
            AttrType::ATOMIC_AGGREGATE => AttributeValue::AtomicAggregate,
            AttrType::AGGREGATOR => {
                let asn = attr_data.read_asn(asn_len)?;
                let addr = attr_data.read_ipv4_address()?;
                AttributeValue::Aggregator(asn, addr)
            }
            AttrType::COMMUNITIES => {
                let mut communities = vec![];
                while attr_data.remaining() > 0 {
                    communities.push(Community(attr_data.read_u32()?));
                }
                AttributeValue::Communities(communities)
            }
            AttrType::ORIGINATOR_ID => AttributeValue::OriginatorId(attr_data.read_ipv4_address()?),
            AttrType::CLUSTER_LIST => {
                let mut cluster_ids = vec![];
                while attr_data.remaining() > 0 {
                    cluster_ids.push(attr_data.read_ipv4_address()?);
                }
                AttributeValue::ClusterList(cluster_ids)
            }
            AttrType::MP_REACHABLE_NLRI => {
                AttributeValue::MpReachNlri(parse_mp_nlri(&mut attr_data, true)?)
            }
            AttrType::MP_UNREACHABLE_NLRI => {
                AttributeValue::MpUnreachNlri(parse_mp_nlri(&mut attr_data, false)?)
            }
            AttrType::UNKNOWN(code) => {
                let bytes_left = attr_data.remaining();
                AttributeValue::Unknown(code, attr_data.read_n_bytes(bytes_left)?)
            }
        };

        if attr_data.has_remaining() {
            return Err(BmpParserError::Malformed(format!(
                "attribute type {} has {} trailing bytes after its value",
                type_code,
                attr_data.remaining()
            )));
        }

        attributes.push(Attribute {
            attr_type,
            flags,
            value,
        });
    }

    Ok(attributes)
}

fn parse_as_path(
    data: &mut Bytes,
    asn_len: AsnLength,
) -> Result<Vec<AsPathSegment>, BmpParserError> {
    let mut segments = vec![];
    while data.remaining() > 0 {
        let segment_type = AsPathSegmentType::try_from(data.read_u8()?)?;
        let count = data.read_u8()? as usize;
        let mut asns = Vec::with_capacity(count);
        for _ in 0..count {
            asns.push(data.read_asn(asn_len)?);
        }
        segments.push(AsPathSegment {
            segment_type,
            asns,
        });
    }
    Ok(segments)
}

/// Parse an MP_REACH_NLRI or MP_UNREACH_NLRI attribute value.
///
/// The attribute's declared length is the only consumption bound. A
/// zero-length NLRI set decodes to an empty route list; so does an
/// unrecognized AFI/SAFI pair, whose NLRI bytes are skipped rather than
/// interpreted.
///
/// Format (RFC 4760 §3, §4):
/// ```text
/// +---------------------------------------------------------+
/// | Address Family Identifier (2 octets)                    |
/// +---------------------------------------------------------+
/// | Subsequent Address Family Identifier (1 octet)          |
/// +---------------------------------------------------------+
/// | Length of Next Hop Network Address (1 octet)  [reach]   |
/// +---------------------------------------------------------+
/// | Network Address of Next Hop (variable)        [reach]   |
/// +---------------------------------------------------------+
/// | Reserved (1 octet)                            [reach]   |
/// +---------------------------------------------------------+
/// | Network Layer Reachability Information (variable)       |
/// +---------------------------------------------------------+
/// ```
fn parse_mp_nlri(data: &mut Bytes, reachable: bool) -> Result<MpNlri, BmpParserError> {
    if !data.has_remaining() {
        // nothing to interpret in an empty attribute
        return Ok(MpNlri {
            afi: 0,
            safi: 0,
            next_hop: None,
            prefixes: vec![],
        });
    }

    let afi_code = data.read_u16()?;
    let safi_code = data.read_u8()?;

    let mut next_hop = None;
    if reachable {
        let next_hop_len = data.read_u8()? as usize;
        if data.remaining() < next_hop_len {
            return Err(BmpParserError::Malformed(format!(
                "next hop length {} exceeds remaining {} attribute bytes",
                next_hop_len,
                data.remaining()
            )));
        }
        next_hop = parse_mp_next_hop(data.split_to(next_hop_len))?;
        if data.read_u8()? != 0 {
            warn!("MP_REACH_NLRI reserved byte not 0");
        }
    }

    let nlri_data = data.split_to(data.remaining());
    let prefixes = match Afi::try_from(afi_code) {
        Ok(afi) if Safi::try_from(safi_code).is_ok() => parse_nlri_list(nlri_data, afi)?,
        _ => {
            debug!(
                "unrecognized AFI/SAFI {}/{} in multiprotocol attribute, keeping empty route list",
                afi_code, safi_code
            );
            vec![]
        }
    };

    Ok(MpNlri {
        afi: afi_code,
        safi: safi_code,
        next_hop,
        prefixes,
    })
}

fn parse_mp_next_hop(mut data: Bytes) -> Result<Option<NextHopAddress>, BmpParserError> {
    let next_hop = match data.remaining() {
        0 => None,
        4 => Some(NextHopAddress::Ipv4(data.read_ipv4_address()?)),
        16 => Some(NextHopAddress::Ipv6(data.read_ipv6_address()?)),
        32 => Some(NextHopAddress::Ipv6LinkLocal(
            data.read_ipv6_address()?,
            data.read_ipv6_address()?,
        )),
        len => {
            return Err(BmpParserError::Malformed(format!(
                "invalid next hop length {}",
                len
            )))
        }
    };
    Ok(next_hop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};
    use ipnet::IpNet;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_basic_attributes() {
        let mut data = BytesMut::new();
        data.put_slice(&[0x40, 0x01, 0x01, 0x00]); // ORIGIN: IGP
        data.put_slice(&[0x40, 0x03, 0x04, 10, 0, 0, 1]); // NEXT_HOP: 10.0.0.1
        data.put_slice(&[0x80, 0x04, 0x04, 0x00, 0x00, 0x00, 0x64]); // MED: 100
        // COMMUNITIES: 65000:123
        data.put_slice(&[0xC0, 0x08, 0x04]);
        data.put_u32((65000 << 16) | 123);

        let attributes = parse_attributes(data.freeze(), AsnLength::Bits32).unwrap();
        assert_eq!(attributes.len(), 4);
        assert_eq!(attributes[0].value, AttributeValue::Origin(Origin::Igp));
        assert_eq!(attributes[0].flags, AttrFlags::TRANSITIVE);
        assert_eq!(
            attributes[1].value,
            AttributeValue::NextHop(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(attributes[2].value, AttributeValue::MultiExitDisc(100));
        assert_eq!(
            attributes[3].value,
            AttributeValue::Communities(vec![Community((65000 << 16) | 123)])
        );
    }

    #[test]
    fn test_parse_as_path_attribute() {
        // AS_SEQUENCE of 65001, 65002 with 4-byte ASNs
        let mut data = BytesMut::new();
        data.put_slice(&[0x40, 0x02, 0x0A, 0x02, 0x02]);
        data.put_u32(65001);
        data.put_u32(65002);

        let attributes = parse_attributes(data.freeze(), AsnLength::Bits32).unwrap();
        assert_eq!(
            attributes[0].value,
            AttributeValue::AsPath(vec![AsPathSegment {
                segment_type: AsPathSegmentType::AsSequence,
                asns: vec![Asn::new_32bit(65001), Asn::new_32bit(65002)],
            }])
        );

        // the same path in the legacy 2-byte encoding
        let mut data = BytesMut::new();
        data.put_slice(&[0x40, 0x02, 0x06, 0x02, 0x02]);
        data.put_u16(65001);
        data.put_u16(65002);

        let attributes = parse_attributes(data.freeze(), AsnLength::Bits16).unwrap();
        assert_eq!(
            attributes[0].value,
            AttributeValue::AsPath(vec![AsPathSegment {
                segment_type: AsPathSegmentType::AsSequence,
                asns: vec![Asn::new_16bit(65001), Asn::new_16bit(65002)],
            }])
        );
    }

    #[test]
    fn test_parse_mp_reach_nlri() {
        let mut data = BytesMut::new();
        data.put_slice(&[0x80, 0x0E, 0x1A]); // optional, MP_REACH_NLRI, 26 bytes
        data.put_u16(2); // afi: IPv6
        data.put_u8(1); // safi: unicast
        data.put_u8(16); // next hop length
        data.put_slice(&[
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
        ]);
        data.put_u8(0); // reserved
        data.put_slice(&[32, 0x20, 0x01, 0x0d, 0xb8]); // 2001:db8::/32

        let attributes = parse_attributes(data.freeze(), AsnLength::Bits32).unwrap();
        let nlri = match &attributes[0].value {
            AttributeValue::MpReachNlri(nlri) => nlri,
            other => panic!("expected MP_REACH_NLRI, got {:?}", other),
        };
        assert_eq!(nlri.address_family(), Some(Afi::Ipv6));
        assert_eq!(
            nlri.next_hop,
            Some(NextHopAddress::Ipv6("2001:db8::1".parse().unwrap()))
        );
        assert_eq!(
            nlri.prefixes,
            vec!["2001:db8::/32".parse::<IpNet>().unwrap()]
        );
    }

    #[test]
    fn test_parse_mp_unreach_nlri_empty_set() {
        // MP_UNREACH_NLRI carrying AFI/SAFI but zero NLRI bytes decodes to an
        // empty route list, not an error
        let data = Bytes::from_static(&[0x80, 0x0F, 0x03, 0x00, 0x02, 0x01]);
        let attributes = parse_attributes(data, AsnLength::Bits32).unwrap();
        assert_eq!(
            attributes[0].value,
            AttributeValue::MpUnreachNlri(MpNlri {
                afi: 2,
                safi: 1,
                next_hop: None,
                prefixes: vec![],
            })
        );
    }

    #[test]
    fn test_parse_mp_nlri_unrecognized_afi_safi() {
        // BGP-LS style AFI 16388 / SAFI 71 with opaque NLRI bytes: skipped,
        // codes preserved, no routes
        let data = Bytes::from_static(&[
            0x80, 0x0F, 0x07, 0x40, 0x04, 0x47, 0xDE, 0xAD, 0xBE, 0xEF,
        ]);
        let attributes = parse_attributes(data, AsnLength::Bits32).unwrap();
        assert_eq!(
            attributes[0].value,
            AttributeValue::MpUnreachNlri(MpNlri {
                afi: 16388,
                safi: 71,
                next_hop: None,
                prefixes: vec![],
            })
        );
    }

    #[test]
    fn test_unknown_attribute_kept_opaque() {
        // LARGE_COMMUNITIES has no typed decoder here and stays raw
        let mut data = BytesMut::new();
        data.put_slice(&[0xC0, 0x20, 0x0C]);
        data.put_slice(&[0x00, 0x00, 0xFD, 0xE8, 0, 0, 0, 1, 0, 0, 0, 2]);

        let attributes = parse_attributes(data.freeze(), AsnLength::Bits32).unwrap();
        assert_eq!(attributes[0].attr_type, AttrType::UNKNOWN(32));
        assert_eq!(
            attributes[0].value,
            AttributeValue::Unknown(
                32,
                vec![0x00, 0x00, 0xFD, 0xE8, 0, 0, 0, 1, 0, 0, 0, 2]
            )
        );
    }

    #[test]
    fn test_attribute_length_overruns_section() {
        // attribute claims 200 bytes, section has 4
        let data = Bytes::from_static(&[0x40, 0x01, 200, 0x00]);
        let result = parse_attributes(data, AsnLength::Bits32);
        assert!(matches!(result, Err(BmpParserError::Malformed(_))));
    }

    #[test]
    fn test_attribute_with_trailing_bytes() {
        // ORIGIN declared with 2 bytes of value
        let data = Bytes::from_static(&[0x40, 0x01, 0x02, 0x00, 0x00]);
        let result = parse_attributes(data, AsnLength::Bits32);
        assert!(matches!(result, Err(BmpParserError::Malformed(_))));
    }

    #[test]
    fn test_extended_length_attribute() {
        let mut data = BytesMut::new();
        data.put_slice(&[0x50, 0x01]); // transitive + extended length, ORIGIN
        data.put_u16(1);
        data.put_u8(2); // INCOMPLETE

        let attributes = parse_attributes(data.freeze(), AsnLength::Bits32).unwrap();
        assert_eq!(
            attributes[0].value,
            AttributeValue::Origin(Origin::Incomplete)
        );
        assert!(attributes[0].flags.contains(AttrFlags::EXTENDED));
    }
}
