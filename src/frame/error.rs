//! Errors raised while building or parsing individual frames.

use thiserror::Error;

/// Errors produced by [`Frame`](crate::frame::Frame) and
/// [`RawFrame`](crate::frame::RawFrame).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than the two-byte `size`/`id` header.
    #[error("frame too short: {len} bytes, need at least 2")]
    TooShort { len: usize },
    /// The body does not fit in one frame.
    #[error("frame body of {len} bytes exceeds the {max} byte limit")]
    BodyTooLarge { len: usize, max: usize },
}
