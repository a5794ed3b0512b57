/*!
Wire-format decoders: bounds-checked read utilities, the embedded BGP
sub-decoder, and the BMP message decoders.
*/
pub mod bgp;
pub mod bmp;
pub mod utils;

pub use utils::{parse_nlri_list, ReadUtils};
