#![doc(html_root_url = "https://docs.rs/bleframe/latest")]
//! Public API for the `bleframe` library.
//!
//! This crate frames messages for constrained links such as a 20-byte BLE
//! characteristic: a `[size, id, body..]` wire format, multipart
//! fragmentation and reassembly for larger payloads, and a paced outbound
//! queue that writes one frame per tick.

pub mod config;
pub mod error;
/// Result type alias re-exported for convenience when calling the transport.
pub use error::Result;
pub mod fragment;
pub mod frame;
pub mod hooks;
pub mod metrics;
pub mod transport;

pub use config::{ConfigError, TransportConfig, TransportConfigBuilder};
pub use error::{DropReason, TransportError};
pub use fragment::{
    FragmentBatch,
    Fragmenter,
    OrphanPolicy,
    ReassembledMessage,
    Reassembler,
    ReassemblyError,
    ReassemblyState,
};
pub use frame::{Frame, FrameError, MessageId, MultipartIds, MultipartKind, RawFrame, Role};
pub use hooks::TransportHooks;
pub use metrics::{Direction, FRAMES_DROPPED, FRAMES_TOTAL, MESSAGES_REASSEMBLED};
pub use transport::{FrameSink, FrameTransport, TransportActor, TransportHandle};
