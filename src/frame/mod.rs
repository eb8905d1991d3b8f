//! Wire frames and message identifiers.

pub mod error;
pub mod ids;
pub mod wire;

pub use error::FrameError;
pub use ids::{MessageId, MultipartIds, MultipartKind, Role};
pub use wire::{
    FRAME_HEADER_LEN,
    Frame,
    MAX_FRAME_SIZE,
    MAX_PAYLOAD,
    MSG_BASE_SIZE,
    RawFrame,
    size_byte,
};
