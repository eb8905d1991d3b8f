//! Outbound helper that splits messages into link-sized frames.
//!
//! A message whose encoded form `[size, id, payload..]` fits in one frame is
//! sent as is. Anything larger is sliced, header included, into chunks of
//! `max_frame_size - 2` bytes, and each chunk is wrapped in its own
//! `[size, multipart id]` header. The peer firmware expects this nesting, so
//! the first multipart frame always starts with the original `size` and `id`.

use bytes::{Bytes, BytesMut};

use crate::frame::{
    FRAME_HEADER_LEN,
    Frame,
    MAX_FRAME_SIZE,
    MessageId,
    MultipartIds,
    MultipartKind,
};

/// Smallest frame that still carries one body byte.
pub const MIN_FRAME_SIZE: usize = FRAME_HEADER_LEN + 1;
/// Largest frame whose `size` byte cannot overflow.
pub const MAX_FRAME_SIZE_LIMIT: usize = 256;

/// Splits outbound messages into encoded frames.
#[derive(Clone, Copy, Debug)]
pub struct Fragmenter {
    ids: MultipartIds,
    max_frame_size: usize,
}

impl Fragmenter {
    /// Create a fragmenter for the legacy 20-byte frame limit.
    #[must_use]
    pub const fn new(ids: MultipartIds) -> Self {
        Self {
            ids,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Create a fragmenter for a negotiated frame limit.
    ///
    /// Returns `None` unless `max_frame_size` lies in
    /// [`MIN_FRAME_SIZE`]`..=`[`MAX_FRAME_SIZE_LIMIT`].
    #[must_use]
    pub fn with_max_frame_size(ids: MultipartIds, max_frame_size: usize) -> Option<Self> {
        (MIN_FRAME_SIZE..=MAX_FRAME_SIZE_LIMIT)
            .contains(&max_frame_size)
            .then_some(Self {
                ids,
                max_frame_size,
            })
    }

    /// Multipart ids stamped on fragments.
    #[must_use]
    pub const fn ids(&self) -> MultipartIds { self.ids }

    /// Maximum encoded frame length.
    #[must_use]
    pub const fn max_frame_size(&self) -> usize { self.max_frame_size }

    /// Maximum body carried by one frame.
    #[must_use]
    pub const fn max_payload(&self) -> usize { self.max_frame_size - FRAME_HEADER_LEN }

    /// Whether a payload of `payload_len` bytes must be split.
    #[must_use]
    pub const fn needs_fragmentation(&self, payload_len: usize) -> bool {
        FRAME_HEADER_LEN + payload_len > self.max_frame_size
    }

    /// Encode `payload` for `message_id` into one or more frames.
    ///
    /// # Examples
    ///
    /// ```
    /// use bleframe::fragment::Fragmenter;
    /// use bleframe::frame::{MessageId, MultipartIds};
    ///
    /// let fragmenter = Fragmenter::new(MultipartIds::CENTRAL_TO_PERIPHERAL);
    /// let batch = fragmenter.fragment(MessageId::new(0x94), [0_u8; 48]);
    /// assert_eq!(batch.len(), 3);
    /// assert_eq!(batch.frames()[0][1], 0xF0);
    /// assert_eq!(batch.frames()[2][1], 0xF2);
    /// ```
    #[must_use]
    pub fn fragment(&self, message_id: MessageId, payload: impl AsRef<[u8]>) -> FragmentBatch {
        let payload = Bytes::copy_from_slice(payload.as_ref());
        let logical = match Frame::with_limit(message_id, payload.clone(), self.max_frame_size) {
            Ok(frame) => return FragmentBatch::new(message_id, vec![frame.encode()]),
            Err(_) => Frame::unchecked(message_id, payload).encode(),
        };

        let chunk_len = self.max_payload();
        let count = logical.len().div_ceil(chunk_len);
        let mut buf = BytesMut::with_capacity(logical.len() + count * FRAME_HEADER_LEN);
        let mut frames = Vec::with_capacity(count);
        for index in 0..count {
            let kind = if index == 0 {
                MultipartKind::Start
            } else if index + 1 == count {
                MultipartKind::Final
            } else {
                MultipartKind::Continue
            };
            let start = index * chunk_len;
            let chunk = logical.slice(start..logical.len().min(start + chunk_len));
            Frame::unchecked(self.ids.id_for(kind), chunk).encode_into(&mut buf);
            frames.push(buf.split().freeze());
        }

        FragmentBatch::new(message_id, frames)
    }
}

/// Encoded frames produced for a single message, in transmission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    message_id: MessageId,
    frames: Vec<Bytes>,
}

impl FragmentBatch {
    fn new(message_id: MessageId, frames: Vec<Bytes>) -> Self {
        debug_assert!(!frames.is_empty(), "fragment batches must not be empty");
        Self { message_id, frames }
    }

    /// The id of the message these frames carry.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Encoded frames as a slice.
    #[must_use]
    pub fn frames(&self) -> &[Bytes] { self.frames.as_slice() }

    /// Number of frames in the batch.
    #[expect(
        clippy::len_without_is_empty,
        reason = "batches are guaranteed non-empty"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether the message needed the multipart envelope.
    #[must_use]
    pub fn is_fragmented(&self) -> bool { self.len() > 1 }

    /// Consume the batch, returning the frames.
    #[must_use]
    pub fn into_frames(self) -> Vec<Bytes> { self.frames }
}

impl IntoIterator for FragmentBatch {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter { self.frames.into_iter() }
}
