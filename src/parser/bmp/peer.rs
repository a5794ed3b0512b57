//! Peer metadata lookup.
//!
//! A [`PeerAccessor`] lets callers enrich decoded messages with information
//! gathered outside the message itself, typically the sysName/sysDescr TLVs
//! seen in the exporter's initiation message. Resolution is best-effort: a
//! peer that cannot be resolved simply yields `None`.

use crate::parser::bmp::messages::BmpPerPeerHeader;

/// Descriptive information about the monitored router a message came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerInfo {
    pub sys_name: Option<String>,
    pub sys_desc: Option<String>,
}

/// Resolves the per-peer header of a message to [`PeerInfo`].
pub trait PeerAccessor {
    fn peer_info(&self, peer_header: &BmpPerPeerHeader) -> Option<PeerInfo>;
}

/// Accessor that resolves nothing. Used when the caller keeps no peer state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeerInfo;

impl PeerAccessor for NoPeerInfo {
    fn peer_info(&self, _peer_header: &BmpPerPeerHeader) -> Option<PeerInfo> {
        None
    }
}
