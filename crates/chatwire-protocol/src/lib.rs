//! Wire protocol for chatwire.
//!
//! This crate defines the "language" that the chat client and server speak:
//!
//! - **Codec** ([`ByteWriter`], [`ByteReader`]) — primitive values to and
//!   from bytes, with an explicit, versionable layout.
//! - **Types** ([`Packet`], [`PacketKind`]) — the typed packet variants
//!   that travel on the wire.
//! - **Registry** ([`PacketRegistry`]) — the tag table that reconstructs
//!   typed packets from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (framed raw bytes) and
//! session (who a connection is). It knows nothing about sockets or
//! nicknames — only how to turn packets into bytes and back.
//!
//! ```text
//! Transport (frames) → Protocol (Packet) → Session (auth state) → Relay
//! ```

mod codec;
mod error;
mod registry;
mod types;

pub use codec::{ByteReader, ByteWriter};
pub use error::ProtocolError;
pub use registry::{BodyDecoder, PacketRegistry};
pub use types::{Packet, PacketKind};
