/*!
Provides IO utility functions for reading bytes of different lengths and
converting them to the corresponding structs.

Every read checks the remaining length of the buffer first; the decoders
never read past the slice they were handed.
*/
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, Bytes};
use ipnet::IpNet;

use crate::error::BmpParserError;
use crate::models::{Afi, Asn, AsnLength};

impl ReadUtils for Bytes {}

/// Bounds-checked reads over a [Buf].
pub trait ReadUtils: Buf {
    #[inline]
    fn has_n_remaining(&self, n: usize) -> Result<(), BmpParserError> {
        if self.remaining() < n {
            Err(BmpParserError::IncompleteMessage {
                needed: n,
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, BmpParserError> {
        self.has_n_remaining(1)?;
        Ok(self.get_u8())
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, BmpParserError> {
        self.has_n_remaining(2)?;
        Ok(self.get_u16())
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, BmpParserError> {
        self.has_n_remaining(4)?;
        Ok(self.get_u32())
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64, BmpParserError> {
        self.has_n_remaining(8)?;
        Ok(self.get_u64())
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, BmpParserError> {
        let addr = self.read_u32()?;
        Ok(Ipv4Addr::from(addr))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, BmpParserError> {
        self.has_n_remaining(16)?;
        Ok(Ipv6Addr::from(self.get_u128()))
    }

    /// Reads a 16-byte address field, interpreted per `afi`. IPv4 addresses
    /// are right-justified in the field with the leading 12 bytes zero-padded.
    fn read_16b_address(&mut self, afi: Afi) -> Result<IpAddr, BmpParserError> {
        self.has_n_remaining(16)?;
        match afi {
            Afi::Ipv4 => {
                self.advance(12);
                Ok(IpAddr::V4(Ipv4Addr::from(self.get_u32())))
            }
            Afi::Ipv6 => Ok(IpAddr::V6(Ipv6Addr::from(self.get_u128()))),
        }
    }

    #[inline]
    fn read_asn(&mut self, as_length: AsnLength) -> Result<Asn, BmpParserError> {
        match as_length {
            AsnLength::Bits16 => self.read_u16().map(Asn::new_16bit),
            AsnLength::Bits32 => self.read_u32().map(Asn::new_32bit),
        }
    }

    /// Reads one NLRI entry: a prefix-length octet followed by
    /// `ceil(prefix_len / 8)` prefix octets, zero-padded to the address width.
    fn read_nlri_prefix(&mut self, afi: Afi) -> Result<IpNet, BmpParserError> {
        let bit_len = self.read_u8()?;
        let byte_len = (bit_len as usize + 7) / 8;

        let addr: IpAddr = match afi {
            Afi::Ipv4 => {
                if byte_len > 4 {
                    return Err(BmpParserError::Malformed(format!(
                        "invalid IPv4 prefix length {}",
                        bit_len
                    )));
                }
                self.has_n_remaining(byte_len)?;
                let mut buff = [0u8; 4];
                self.copy_to_slice(&mut buff[..byte_len]);
                IpAddr::V4(Ipv4Addr::from(buff))
            }
            Afi::Ipv6 => {
                if byte_len > 16 {
                    return Err(BmpParserError::Malformed(format!(
                        "invalid IPv6 prefix length {}",
                        bit_len
                    )));
                }
                self.has_n_remaining(byte_len)?;
                let mut buff = [0u8; 16];
                self.copy_to_slice(&mut buff[..byte_len]);
                IpAddr::V6(Ipv6Addr::from(buff))
            }
        };

        IpNet::new(addr, bit_len).map_err(BmpParserError::from)
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, BmpParserError> {
        self.has_n_remaining(n_bytes)?;
        Ok(self.copy_to_bytes(n_bytes).into())
    }

    fn read_n_bytes_to_string(&mut self, n_bytes: usize) -> Result<String, BmpParserError> {
        let buffer = self.read_n_bytes(n_bytes)?;
        Ok(buffer.into_iter().map(|x: u8| x as char).collect::<String>())
    }
}

/// Reads NLRI entries until the input slice is exhausted.
pub fn parse_nlri_list(mut input: Bytes, afi: Afi) -> Result<Vec<IpNet>, BmpParserError> {
    let mut prefixes = vec![];
    while input.remaining() > 0 {
        prefixes.push(input.read_nlri_prefix(afi)?);
    }
    Ok(prefixes)
}
