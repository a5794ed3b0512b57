/*!
bmp-parser is a library for decoding BGP Monitoring Protocol (BMP, RFC 7854)
messages from raw bytes.

The decoder is a pure function of bytes: it manages no connections, keeps no
state between calls, and never writes messages back out. One call to
[parse_bmp_msg] consumes exactly one complete BMP message from the front of a
[bytes::Bytes] buffer and returns a strongly-typed, immutable [BmpMessage],
or an error scoped to that single message.

```
use bmp_parser::{parse_bmp_msg, MessageBody};
use bytes::Bytes;

// An initiation message with no TLVs: version 3, total length 6, type 4.
let mut data = Bytes::from_static(&[0x03, 0x00, 0x00, 0x00, 0x06, 0x04]);
let msg = parse_bmp_msg(&mut data).unwrap();
assert!(matches!(msg.message_body, MessageBody::InitiationMessage(_)));
```

Peer metadata can be resolved during decoding by passing a [PeerAccessor] to
[parse_bmp_msg_with_peers]; decoded messages can be dispatched by variant
through the [BmpMessageVisitor] trait.
*/
pub mod error;
pub mod models;
pub mod parser;

pub use crate::error::BmpParserError;
pub use crate::parser::bmp::peer::{NoPeerInfo, PeerAccessor, PeerInfo};
pub use crate::parser::bmp::visitor::BmpMessageVisitor;
pub use crate::parser::bmp::{parse_bmp_msg, parse_bmp_msg_with_peers, BmpMessage, MessageBody};
