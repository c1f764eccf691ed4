//! Packet registry: the table that turns wire tags back into typed packets.
//!
//! The registry replaces the original system's process-global packet
//! builder with an explicit value: it is constructed once during startup
//! (before any socket is opened), handed by reference to whoever encodes
//! or decodes, and never mutated afterward.
//!
//! Tags are assigned by registration order. Both peers must register the
//! same variants in the same order; [`PacketRegistry::with_defaults`] is
//! the reference assignment (Chat = 0, AuthRequest = 1, AuthResponse = 2)
//! and the one both shipped binaries use.

use std::collections::HashMap;

use crate::codec::{ByteReader, ByteWriter};
use crate::types::{Packet, PacketKind};
use crate::ProtocolError;

/// Decodes one variant's body from a reader positioned just past the tag.
pub type BodyDecoder = fn(&mut ByteReader<'_>) -> Result<Packet, ProtocolError>;

/// Maps wire tags to packet variants and back.
///
/// Read-only after construction; share it with `&PacketRegistry`, or
/// clone it when a task needs ownership (cloning copies two small maps).
#[derive(Debug, Clone)]
pub struct PacketRegistry {
    decoders: HashMap<u16, BodyDecoder>,
    tags: HashMap<PacketKind, u16>,
    next_tag: u16,
}

impl PacketRegistry {
    /// Creates an empty registry. Most callers want
    /// [`with_defaults`](Self::with_defaults) instead.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
            tags: HashMap::new(),
            next_tag: 0,
        }
    }

    /// Creates the reference registry: Chat, AuthRequest, AuthResponse,
    /// in that order, yielding tags 0, 1 and 2.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PacketKind::Chat, Packet::decode_chat);
        registry.register(PacketKind::AuthRequest, Packet::decode_auth_request);
        registry.register(PacketKind::AuthResponse, Packet::decode_auth_response);
        registry
    }

    /// Registers a variant and returns the tag it was assigned.
    ///
    /// # Panics
    ///
    /// Panics if the variant is already registered. Registration happens
    /// once at startup; a duplicate is a programming error and must fail
    /// fast rather than silently remap a tag.
    pub fn register(&mut self, kind: PacketKind, decoder: BodyDecoder) -> u16 {
        assert!(
            !self.tags.contains_key(&kind),
            "packet kind {kind} registered twice"
        );
        let tag = self.next_tag;
        self.next_tag += 1;
        self.tags.insert(kind, tag);
        self.decoders.insert(tag, decoder);
        tag
    }

    /// Returns the wire tag for a variant, if registered.
    pub fn tag_of(&self, kind: PacketKind) -> Option<u16> {
        self.tags.get(&kind).copied()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no variants are registered.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Encodes a packet: tag first, then the variant body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Unregistered`] if the packet's variant was
    /// never registered (only possible with a hand-built partial registry).
    pub fn encode(&self, packet: &Packet) -> Result<Vec<u8>, ProtocolError> {
        let kind = packet.kind();
        let tag = self
            .tag_of(kind)
            .ok_or(ProtocolError::Unregistered(kind))?;
        let mut w = ByteWriter::new();
        w.put_u16(tag);
        packet.encode_body(&mut w);
        Ok(w.into_bytes())
    }

    /// Decodes a packet: reads the tag, dispatches to the registered body
    /// decoder, and requires the body to consume the buffer exactly.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::UnknownType`] — the tag has no registered variant.
    /// - [`ProtocolError::MalformedPacket`] — the buffer is exhausted
    ///   before a field completes, or bytes trail the decoded body.
    pub fn decode(&self, bytes: &[u8]) -> Result<Packet, ProtocolError> {
        let mut r = ByteReader::new(bytes);
        let tag = r.read_u16()?;
        let decoder = self
            .decoders
            .get(&tag)
            .ok_or(ProtocolError::UnknownType(tag))?;
        let packet = decoder(&mut r)?;
        r.finish()?;
        Ok(packet)
    }
}

impl Default for PacketRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// =========================================================================
// Tests
// =========================================================================
