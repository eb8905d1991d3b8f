//! Helpers for wiring transports back to back without an actor.

use std::sync::{Arc, Mutex};

use bleframe::{FrameTransport, MessageId};
use bytes::Bytes;

/// Payloads delivered to a handler, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct Captured {
    inner: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Captured {
    /// Remove and return everything captured so far.
    #[must_use]
    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(
            &mut *self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }

    fn push(&self, payload: &[u8]) {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(payload.to_vec());
    }
}

/// Register a handler for `id` that records every payload.
///
/// # Panics
///
/// Panics if `id` cannot take a handler on `transport`.
pub fn capture(transport: &mut FrameTransport, id: MessageId) -> Captured {
    let captured = Captured::default();
    let sink = captured.clone();
    transport
        .register_handler(id, move |payload| sink.push(payload))
        .expect("handler registration");
    captured
}

/// Pop every queued frame from `transport`.
pub fn drain(transport: &mut FrameTransport) -> Vec<Bytes> {
    std::iter::from_fn(|| transport.poll_outgoing()).collect()
}

/// Move every queued frame of `from` into the receive path of `to`,
/// returning the number of frames moved.
pub fn pump(from: &mut FrameTransport, to: &mut FrameTransport) -> usize {
    let frames = drain(from);
    for frame in &frames {
        to.on_frame_received(frame);
    }
    frames.len()
}

/// Deterministic payload of `len` bytes that never repeats within 251 bytes.
#[must_use]
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 251).unwrap_or_default())
        .collect()
}
