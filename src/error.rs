/*!
error module defines the error types used in bmp-parser.
*/
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use thiserror::Error;

/// Errors produced while decoding a single BMP message.
///
/// No variant is fatal to the surrounding byte stream: the caller decides
/// whether to resynchronize, skip bytes, or drop the connection.
#[derive(Debug, Error)]
pub enum BmpParserError {
    /// The common header carries a version other than 3 (RFC 7854).
    #[error("unsupported BMP version {0}")]
    UnsupportedVersion(u8),
    /// The common header carries a message type code outside 0..=6.
    #[error("unsupported BMP message type {0}")]
    UnsupportedMessageType(u8),
    /// The declared message length exceeds the bytes available. When reading
    /// from a streaming transport this means "need more input", not
    /// corruption.
    #[error("incomplete message: needed {needed} bytes, {remaining} available")]
    IncompleteMessage { needed: usize, remaining: usize },
    /// An inner length field is inconsistent with the enclosing slice, or a
    /// decoder left declared bytes unconsumed.
    #[error("malformed message: {0}")]
    Malformed(String),
    /// An address mask is larger than the length of the address it applies to.
    #[error("invalid network prefix mask")]
    InvalidPrefixLength(#[from] ipnet::PrefixLenError),
    /// A strict wire enumeration received a value it does not define.
    #[error("unrecognized value {value} for {type_name}")]
    UnrecognizedEnumVariant { type_name: &'static str, value: u64 },
}

impl<T> From<TryFromPrimitiveError<T>> for BmpParserError
where
    T: TryFromPrimitive,
    T::Primitive: Into<u64>,
{
    #[inline]
    fn from(value: TryFromPrimitiveError<T>) -> Self {
        BmpParserError::UnrecognizedEnumVariant {
            type_name: T::NAME,
            value: value.number.into(),
        }
    }
}

impl BmpParserError {
    /// Reclassifies a byte shortage raised inside an exactly-sized payload
    /// slice. Once the payload slice has been cut to the header's declared
    /// length, running out of bytes means an inner length field lied, not
    /// that more input is coming.
    pub(crate) fn into_payload_error(self) -> Self {
        match self {
            BmpParserError::IncompleteMessage { needed, remaining } => {
                BmpParserError::Malformed(format!(
                    "inner length field exceeds enclosing slice: needed {} bytes, {} remaining",
                    needed, remaining
                ))
            }
            err => err,
        }
    }
}
