//! Multipart fragmentation and reassembly.
//!
//! Messages too large for one frame travel as a start fragment, zero or more
//! continue fragments and a final fragment. [`Fragmenter`] produces that
//! sequence; [`Reassembler`] consumes it one fragment at a time.

pub mod error;
pub mod fragmenter;
pub mod reassembler;

pub use error::ReassemblyError;
pub use fragmenter::{FragmentBatch, Fragmenter, MAX_FRAME_SIZE_LIMIT, MIN_FRAME_SIZE};
pub use reassembler::{
    OrphanPolicy,
    ReassembledMessage,
    Reassembler,
    ReassemblyState,
    ReassemblyStatus,
};

#[cfg(test)]
mod tests;
