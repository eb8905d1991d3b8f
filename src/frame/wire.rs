//! Bit-exact encoding of a single frame.
//!
//! ```text
//! Frame := size:u8 id:u8 body:u8[size - 1]
//! ```
//!
//! `size` counts the id byte plus the body, so a frame is always
//! `size + 1` bytes long on the wire.

use bytes::{BufMut, Bytes, BytesMut};

use super::{FrameError, MessageId};

/// Largest frame the legacy peer accepts in one characteristic write.
pub const MAX_FRAME_SIZE: usize = 20;
/// Per-frame overhead: the `size` byte and the `id` byte.
pub const FRAME_HEADER_LEN: usize = 2;
/// Largest body carried by a [`MAX_FRAME_SIZE`] frame.
pub const MAX_PAYLOAD: usize = MAX_FRAME_SIZE - FRAME_HEADER_LEN;
/// Value of `size` for a frame with an empty body.
pub const MSG_BASE_SIZE: usize = 1;

/// Compute the `size` byte announcing a body of `body_len` bytes.
///
/// Only the low byte is kept. Single frames never exceed 255 here; the
/// header embedded in a multipart stream may, and the peer ignores it.
#[must_use]
pub fn size_byte(body_len: usize) -> u8 { (MSG_BASE_SIZE + body_len).to_le_bytes()[0] }

/// An owned frame whose body fits the configured limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    id: MessageId,
    body: Bytes,
}

impl Frame {
    /// Build a frame that fits in [`MAX_FRAME_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::BodyTooLarge`] when `body` exceeds
    /// [`MAX_PAYLOAD`].
    pub fn new(id: MessageId, body: impl Into<Bytes>) -> Result<Self, FrameError> {
        Self::with_limit(id, body, MAX_FRAME_SIZE)
    }

    /// Build a frame checked against a custom `max_frame_size`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::BodyTooLarge`] when the encoded frame would
    /// exceed `max_frame_size` bytes.
    pub fn with_limit(
        id: MessageId,
        body: impl Into<Bytes>,
        max_frame_size: usize,
    ) -> Result<Self, FrameError> {
        let body = body.into();
        let max = max_frame_size.saturating_sub(FRAME_HEADER_LEN);
        if body.len() > max {
            return Err(FrameError::BodyTooLarge {
                len: body.len(),
                max,
            });
        }
        Ok(Self { id, body })
    }

    /// Build a frame without checking its length.
    ///
    /// Used for the `[size, id, payload..]` header a multipart stream
    /// embeds, and for chunks already cut to fit the link.
    pub(crate) fn unchecked(id: MessageId, body: Bytes) -> Self { Self { id, body } }

    /// Message id byte.
    #[must_use]
    pub const fn id(&self) -> MessageId { self.id }

    /// Frame body without the header.
    #[must_use]
    pub fn body(&self) -> &[u8] { &self.body }

    /// Value of the `size` byte: id plus body length.
    #[must_use]
    pub fn size(&self) -> u8 { size_byte(self.body.len()) }

    /// Total encoded length including the `size` byte.
    #[must_use]
    pub fn encoded_len(&self) -> usize { FRAME_HEADER_LEN + self.body.len() }

    /// Append the wire representation to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_u8(self.size());
        dst.put_u8(self.id.get());
        dst.put_slice(&self.body);
    }

    /// Encode into a fresh buffer.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

/// Borrowed view over a received frame.
///
/// Parsing only checks for the two-byte header. The announced `size` is kept
/// for diagnostics but the body is always everything after the header, which
/// is how the peer reads frames too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame<'a> {
    declared_size: u8,
    id: MessageId,
    body: &'a [u8],
}

impl<'a> RawFrame<'a> {
    /// Parse a frame received from the link.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooShort`] for inputs under two bytes.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FrameError> {
        match bytes {
            [declared_size, id, body @ ..] => Ok(Self {
                declared_size: *declared_size,
                id: MessageId::new(*id),
                body,
            }),
            _ => Err(FrameError::TooShort { len: bytes.len() }),
        }
    }

    /// The `size` byte as transmitted.
    #[must_use]
    pub const fn declared_size(&self) -> u8 { self.declared_size }

    /// Message id byte.
    #[must_use]
    pub const fn id(&self) -> MessageId { self.id }

    /// Body bytes following the header.
    #[must_use]
    pub const fn body(&self) -> &'a [u8] { self.body }

    /// Whether `size` matches the actual body length.
    #[must_use]
    pub fn is_consistent(&self) -> bool { self.declared_size == size_byte(self.body.len()) }
}
