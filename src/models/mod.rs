/*!
Data models shared between the BMP decoders and the embedded BGP sub-decoder.
*/
mod bgp;
mod network;

pub use bgp::*;
pub use network::*;
