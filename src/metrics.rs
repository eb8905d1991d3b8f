//! Metric helpers for `bleframe`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate.

use metrics::{counter, gauge};

use crate::error::DropReason;

/// Name of the counter tracking frames read from or written to the link.
pub const FRAMES_TOTAL: &str = "bleframe_frames_total";
/// Name of the counter tracking discarded frames and partial messages.
pub const FRAMES_DROPPED: &str = "bleframe_frames_dropped_total";
/// Name of the counter tracking completed multipart messages.
pub const MESSAGES_REASSEMBLED: &str = "bleframe_messages_reassembled_total";
/// Name of the counter tracking failed link writes.
pub const WRITE_ERRORS: &str = "bleframe_write_errors_total";
/// Name of the gauge tracking frames waiting for a pacing tick.
pub const QUEUE_DEPTH: &str = "bleframe_queue_depth";

/// Direction of frame processing.
#[derive(Clone, Copy)]
pub enum Direction {
    /// Frames received from the link.
    Inbound,
    /// Frames written to the link.
    Outbound,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a frame for the given direction.
pub fn inc_frames(direction: Direction) {
    counter!(FRAMES_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Record a silent drop.
pub fn inc_dropped(reason: DropReason) {
    counter!(FRAMES_DROPPED, "reason" => reason.label()).increment(1);
}

/// Record a completed multipart message.
pub fn inc_reassembled() { counter!(MESSAGES_REASSEMBLED).increment(1); }

/// Record a failed link write.
pub fn inc_write_errors() { counter!(WRITE_ERRORS).increment(1); }

/// Publish the current outgoing queue length.
#[expect(
    clippy::cast_precision_loss,
    reason = "queue depth is far below f64 precision limits"
)]
pub fn set_queue_depth(depth: usize) { gauge!(QUEUE_DEPTH).set(depth as f64); }
