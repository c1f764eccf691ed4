//! Error types for the protocol layer.

use crate::types::PacketKind;

/// Errors that can occur while encoding or decoding packets.
///
/// Decode errors are always local to one packet: the caller (a connection
/// handler) closes the offending connection and the process carries on.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The byte stream is truncated or internally inconsistent: a field
    /// ran past the end of the buffer, a string held invalid UTF-8, or
    /// bytes trailed a complete body.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// The decoded type tag has no registered variant. Either the peer
    /// registered packets in a different order or the stream is corrupt.
    #[error("unknown packet type tag {0}")]
    UnknownType(u16),

    /// Tried to encode a variant the registry does not know about.
    /// Can only happen with a hand-built partial registry.
    #[error("packet kind {0} is not registered")]
    Unregistered(PacketKind),
}
