//! Primitive value codec: the byte-level building blocks of the wire format.
//!
//! Every packet body is a sequence of primitives — strings, booleans,
//! fixed-width integers — written by [`ByteWriter`] and read back by
//! [`ByteReader`]. The two are exact inverses: a reader consumes precisely
//! the bytes its matching writer produced, field by field.
//!
//! Layout rules (all integers big-endian):
//!
//! ```text
//! string := length:u32 | bytes:UTF-8[length]
//! bool   := byte (0 = false, nonzero = true; writer emits only 0 or 1)
//! u16    := 2 bytes
//! u32    := 4 bytes
//! ```
//!
//! `ByteReader` never reads out of bounds: every read checks the remaining
//! length first and fails with [`ProtocolError::MalformedPacket`] on a
//! truncated buffer.

use bytes::{Buf, BufMut, BytesMut};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// Appends primitive values to a growable byte buffer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: BytesMut,
}

impl ByteWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a length-prefixed UTF-8 string. The empty string is a valid
    /// value and encodes as a zero length prefix with no payload bytes.
    ///
    /// The length prefix is a `u32`; strings longer than `u32::MAX` bytes
    /// cannot be represented on the wire (the frame cap rejects anything
    /// this large long before it reaches the codec).
    pub fn put_string(&mut self, s: &str) {
        debug_assert!(
            s.len() <= u32::MAX as usize,
            "string of {} bytes exceeds the u32 length prefix",
            s.len()
        );
        self.buf.put_u32(s.len() as u32);
        self.buf.put_slice(s.as_bytes());
    }

    /// Writes a boolean as a single canonical byte: 1 for true, 0 for false.
    pub fn put_bool(&mut self, b: bool) {
        self.buf.put_u8(u8::from(b));
    }

    /// Writes a big-endian `u16`.
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Writes a big-endian `u32`.
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    /// Consumes the writer and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.freeze().to_vec()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Reads primitive values back out of a byte slice, front to back.
///
/// Borrows the input; decoded strings are freshly allocated.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Creates a reader over the given bytes.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize, what: &str) -> Result<(), ProtocolError> {
        if self.buf.remaining() < n {
            return Err(ProtocolError::MalformedPacket(format!(
                "buffer exhausted reading {what}: need {n} bytes, have {}",
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        self.need(2, "u16")?;
        Ok(self.buf.get_u16())
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        self.need(4, "u32")?;
        Ok(self.buf.get_u32())
    }

    /// Reads a one-byte boolean: 0 is false, any nonzero byte is true.
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        self.need(1, "bool")?;
        Ok(self.buf.get_u8() != 0)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_u32()? as usize;
        self.need(len, "string payload")?;
        let mut raw = vec![0u8; len];
        self.buf.copy_to_slice(&mut raw);
        String::from_utf8(raw).map_err(|e| {
            ProtocolError::MalformedPacket(format!("invalid UTF-8 in string: {e}"))
        })
    }

    /// Asserts that the reader consumed the whole input.
    ///
    /// A well-formed packet body accounts for every byte it was framed
    /// with; leftovers mean the sender and receiver disagree on the layout.
    pub fn finish(self) -> Result<(), ProtocolError> {
        if self.buf.has_remaining() {
            return Err(ProtocolError::MalformedPacket(format!(
                "{} trailing bytes after packet body",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
