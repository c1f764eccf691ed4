//! Length-prefixed frame codec for the TCP transport.
//!
//! TCP is a byte stream; packets need boundaries. Each frame on the wire
//! is a big-endian `u32` byte count followed by that many payload bytes:
//!
//! ```text
//! frame := length:u32 | payload[length]
//! ```
//!
//! The payload is opaque here — the protocol layer decodes it. Frames
//! larger than the configured cap are rejected with `InvalidData`, which
//! the connection surfaces as a receive error; a peer announcing a bogus
//! multi-gigabyte length must not make us buffer it.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Byte length of the frame header.
const HEADER_LEN: usize = 4;

/// Default cap on a single frame's payload (64 KiB). Chat packets are a
/// few hundred bytes at most; anything near this cap is garbage.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// A [`Decoder`]/[`Encoder`] pair handling the u32 length prefix.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_bytes: usize,
}

impl FrameCodec {
    /// Creates a codec with the given payload size cap.
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl Decoder for FrameCodec {
    type Item = Vec<u8>;
    type Error = std::io::Error;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if len > self.max_frame_bytes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("frame of {len} bytes exceeds cap of {} bytes", self.max_frame_bytes),
            ));
        }

        if src.len() < HEADER_LEN + len {
            // Wait for the rest of the frame.
            src.reserve(HEADER_LEN + len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        Ok(Some(src.split_to(len).to_vec()))
    }
}

impl Encoder<Vec<u8>> for FrameCodec {
    type Error = std::io::Error;

    fn encode(
        &mut self,
        item: Vec<u8>,
        dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_bytes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "refusing to send frame of {} bytes (cap is {} bytes)",
                    item.len(),
                    self.max_frame_bytes
                ),
            ));
        }
        dst.reserve(HEADER_LEN + item.len());
        dst.put_u32(item.len() as u32);
        dst.put_slice(&item);
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
