//! FIFO of encoded frames awaiting a pacing tick.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::metrics;

/// Encoded frames in the order `send` produced them.
///
/// Enqueueing never blocks and never fails; the queue grows until the
/// pacing tick drains it.
#[derive(Debug, Default)]
pub struct OutgoingQueue {
    frames: VecDeque<Bytes>,
}

impl OutgoingQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append frames to the back of the queue.
    pub fn extend(&mut self, frames: impl IntoIterator<Item = Bytes>) {
        self.frames.extend(frames);
        metrics::set_queue_depth(self.frames.len());
    }

    /// Pop the oldest frame.
    pub fn pop(&mut self) -> Option<Bytes> {
        let frame = self.frames.pop_front()?;
        metrics::set_queue_depth(self.frames.len());
        Some(frame)
    }

    /// Frames waiting to be written.
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Drop every queued frame, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.frames.len();
        self.frames.clear();
        metrics::set_queue_depth(0);
        discarded
    }
}
