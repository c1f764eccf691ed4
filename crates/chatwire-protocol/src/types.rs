//! Packet types: the typed units of communication between client and server.
//!
//! Every message on the wire is one [`Packet`] variant. The source that
//! chatwire descends from modeled these as an open class hierarchy with
//! virtual serialize/deserialize; here the set is closed, so a plain enum
//! carries the payloads and a registry table (see
//! [`registry`](crate::registry)) maps wire tags to body decoders.
//!
//! A packet is immutable once constructed for sending and freshly
//! allocated when decoded.

use std::fmt;

use crate::codec::{ByteReader, ByteWriter};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PacketKind
// ---------------------------------------------------------------------------

/// Discriminates packet variants without carrying their payloads.
///
/// Used as the registry key when mapping a variant to its wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// A line of chat text.
    Chat,
    /// The client's nickname claim.
    AuthRequest,
    /// The server's verdict on a nickname claim.
    AuthResponse,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chat => "Chat",
            Self::AuthRequest => "AuthRequest",
            Self::AuthResponse => "AuthResponse",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// One self-describing unit of protocol data.
///
/// Body layouts (the tag itself is written by the registry, before the
/// body, in the variant's registration order):
///
/// ```text
/// Chat         := text:string
/// AuthRequest  := username:string
/// AuthResponse := success:bool | message:string
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// A chat line. Server-bound packets carry the raw user text;
    /// client-bound packets carry the relayed `"<nick>: <text>"` form.
    Chat { text: String },

    /// Client → Server: "I would like to be known as `username`."
    /// The first — and only — legal packet on an unauthenticated
    /// connection.
    AuthRequest { username: String },

    /// Server → Client: verdict on an [`AuthRequest`](Self::AuthRequest).
    /// On success `message` echoes the granted nickname; on failure it
    /// carries a machine-readable reason such as `NickInUse:<nick>`.
    AuthResponse { success: bool, message: String },
}

impl Packet {
    /// Returns which variant this packet is.
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Chat { .. } => PacketKind::Chat,
            Self::AuthRequest { .. } => PacketKind::AuthRequest,
            Self::AuthResponse { .. } => PacketKind::AuthResponse,
        }
    }

    /// Writes this variant's fields, in declared order, to `w`.
    ///
    /// The wire tag is not written here; the registry owns tag
    /// assignment and prepends it.
    pub fn encode_body(&self, w: &mut ByteWriter) {
        match self {
            Self::Chat { text } => {
                w.put_string(text);
            }
            Self::AuthRequest { username } => {
                w.put_string(username);
            }
            Self::AuthResponse { success, message } => {
                w.put_bool(*success);
                w.put_string(message);
            }
        }
    }

    /// Decodes a [`Packet::Chat`] body.
    pub fn decode_chat(r: &mut ByteReader<'_>) -> Result<Packet, ProtocolError> {
        let text = r.read_string()?;
        Ok(Packet::Chat { text })
    }

    /// Decodes a [`Packet::AuthRequest`] body.
    pub fn decode_auth_request(
        r: &mut ByteReader<'_>,
    ) -> Result<Packet, ProtocolError> {
        let username = r.read_string()?;
        Ok(Packet::AuthRequest { username })
    }

    /// Decodes a [`Packet::AuthResponse`] body. Field order matches
    /// `encode_body`: success flag first, then the message.
    pub fn decode_auth_response(
        r: &mut ByteReader<'_>,
    ) -> Result<Packet, ProtocolError> {
        let success = r.read_bool()?;
        let message = r.read_string()?;
        Ok(Packet::AuthResponse { success, message })
    }
}

// =========================================================================
// Tests
// =========================================================================
