//! Bidirectional frame transport.
//!
//! [`FrameTransport`] is the synchronous core: `send` fragments and queues
//! messages, [`poll_outgoing`](FrameTransport::poll_outgoing) pops one frame
//! per pacing tick, and
//! [`on_frame_received`](FrameTransport::on_frame_received) reassembles and
//! dispatches inbound frames. It owns its queue, reassembler and handlers
//! exclusively and performs no I/O, so one task (usually a
//! [`TransportActor`]) must own it for the lifetime of a link.
//!
//! Wire anomalies are never returned as errors. Each one is logged, counted
//! in `bleframe_frames_dropped_total` and passed to
//! [`TransportHooks::on_drop`](crate::hooks::TransportHooks).

use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, trace};

pub mod actor;
mod handlers;
pub mod queue;
pub mod sink;

pub use actor::{TransportActor, TransportHandle};
pub use handlers::{DefaultHandler, Handler};
pub use queue::OutgoingQueue;
pub use sink::FrameSink;

use self::handlers::HandlerRegistry;
use crate::{
    config::TransportConfig,
    error::{DropReason, TransportError},
    fragment::{Fragmenter, Reassembler, ReassemblyState, ReassemblyStatus},
    frame::{MessageId, MultipartKind, RawFrame},
    hooks::TransportHooks,
    metrics::{self, Direction},
};

/// Frame codec, pacing queue and reassembly state for one link.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use bleframe::{frame::{MessageId, Role}, config::TransportConfig, transport::FrameTransport};
///
/// let mut central = FrameTransport::new(TransportConfig::for_role(Role::Central));
/// let mut robot = FrameTransport::new(TransportConfig::for_role(Role::Peripheral));
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// robot
///     .register_handler(MessageId::new(0x94), move |payload| {
///         sink.lock().expect("lock").extend_from_slice(payload);
///     })
///     .expect("id is free");
///
/// central.send(MessageId::new(0x94), b"echo hello from a long command line");
/// while let Some(frame) = central.poll_outgoing() {
///     robot.on_frame_received(&frame);
/// }
/// assert_eq!(seen.lock().expect("lock").as_slice(), b"echo hello from a long command line");
/// ```
#[derive(Debug)]
pub struct FrameTransport {
    config: TransportConfig,
    fragmenter: Fragmenter,
    reassembler: Reassembler,
    queue: OutgoingQueue,
    handlers: HandlerRegistry,
    hooks: TransportHooks,
}

impl Default for FrameTransport {
    fn default() -> Self { Self::new(TransportConfig::default()) }
}

impl FrameTransport {
    /// Create a transport for a validated configuration.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        let ids = config.outbound_ids();
        let fragmenter = Fragmenter::with_max_frame_size(ids, config.max_frame_size())
            .unwrap_or_else(|| Fragmenter::new(ids));
        let reassembler = Reassembler::new(config.orphan_policy())
            .with_max_message_size(config.max_message_size())
            .with_timeout(config.reassembly_timeout());
        Self {
            config,
            fragmenter,
            reassembler,
            queue: OutgoingQueue::new(),
            handlers: HandlerRegistry::default(),
            hooks: TransportHooks::default(),
        }
    }

    /// Configuration the transport was built with.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig { &self.config }

    /// Register the handler for payloads carrying `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ReservedId`] if `id` is an inbound multipart
    /// id and [`TransportError::DuplicateHandler`] if `id` already has a
    /// handler.
    pub fn register_handler<F>(&mut self, id: MessageId, handler: F) -> Result<(), TransportError>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.register_boxed(id, Box::new(handler))
    }

    pub(crate) fn register_boxed(
        &mut self,
        id: MessageId,
        handler: Handler,
    ) -> Result<(), TransportError> {
        if self.config.inbound_ids().contains(id) {
            return Err(TransportError::ReservedId(id));
        }
        self.handlers.insert(id, handler)?;
        debug!(id = %id, "handler registered");
        Ok(())
    }

    /// Remove the handler for `id`, returning whether one was registered.
    pub fn unregister_handler(&mut self, id: MessageId) -> bool { self.handlers.remove(id) }

    /// Whether a dedicated handler exists for `id`.
    #[must_use]
    pub fn has_handler(&self, id: MessageId) -> bool { self.handlers.contains(id) }

    /// Route ids without a dedicated handler to `handler` instead of
    /// dropping them.
    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: FnMut(MessageId, &[u8]) + Send + 'static,
    {
        self.handlers.set_fallback(Some(Box::new(handler)));
    }

    /// Go back to dropping ids without a dedicated handler.
    pub fn clear_default_handler(&mut self) { self.handlers.set_fallback(None); }

    /// Replace the diagnostic hooks.
    pub fn set_hooks(&mut self, hooks: TransportHooks) { self.hooks = hooks; }

    /// Fragment `payload` and queue the resulting frames.
    ///
    /// Never blocks and accepts payloads of any length. Returns the number of
    /// frames queued.
    pub fn send(&mut self, id: MessageId, payload: impl AsRef<[u8]>) -> usize {
        let payload = payload.as_ref();
        let batch = self.fragmenter.fragment(id, payload);
        let frames = batch.len();
        debug!(id = %id, len = payload.len(), frames, "message queued");
        self.queue.extend(batch);
        frames
    }

    /// Pop the next frame to write. Call once per pacing tick.
    pub fn poll_outgoing(&mut self) -> Option<Bytes> { self.queue.pop() }

    /// Frames waiting for a pacing tick.
    #[must_use]
    pub fn queued_frames(&self) -> usize { self.queue.len() }

    /// Reassembly progress.
    #[must_use]
    pub fn reassembly_state(&self) -> ReassemblyState { self.reassembler.state() }

    /// Process one frame delivered by the link.
    pub fn on_frame_received(&mut self, frame: &[u8]) {
        self.on_frame_received_at(frame, Instant::now());
    }

    /// Process one frame using an explicit clock reading for the
    /// reassembly timeout.
    pub fn on_frame_received_at(&mut self, frame: &[u8], now: Instant) {
        metrics::inc_frames(Direction::Inbound);
        if let Some(fragments) = self.reassembler.purge_expired_at(now) {
            self.dropped(DropReason::Expired { fragments });
        }

        let Ok(raw) = RawFrame::parse(frame) else {
            self.dropped(DropReason::Malformed { len: frame.len() });
            return;
        };
        if !raw.is_consistent() {
            trace!(
                id = %raw.id(),
                declared = raw.declared_size(),
                body_len = raw.body().len(),
                "size byte disagrees with frame length"
            );
        }

        match self.config.inbound_ids().classify(raw.id()) {
            Some(kind) => self.on_fragment(kind, raw.body(), now),
            None => self.dispatch(raw.id(), raw.body()),
        }
    }

    /// Discard queued frames and any partial message.
    ///
    /// Returns the number of queued frames discarded.
    pub fn reset(&mut self) -> usize {
        if let Some(fragments) = self.reassembler.reset() {
            self.dropped(DropReason::Abandoned { fragments });
        }
        self.queue.clear()
    }

    pub(crate) fn notify_disconnected(&mut self) { self.hooks.disconnected(); }

    fn on_fragment(&mut self, kind: MultipartKind, body: &[u8], now: Instant) {
        match self.reassembler.push_at(kind, body, now) {
            Ok(ReassemblyStatus::Started { abandoned }) => {
                if let Some(fragments) = abandoned {
                    self.dropped(DropReason::Abandoned { fragments });
                }
                trace!(len = body.len(), "multipart message started");
            }
            Ok(ReassemblyStatus::Incomplete) => {
                trace!(%kind, len = body.len(), "multipart fragment buffered");
            }
            Ok(ReassemblyStatus::Complete(message)) => {
                metrics::inc_reassembled();
                debug!(
                    id = %message.message_id(),
                    len = message.payload().len(),
                    fragments = message.fragments(),
                    "multipart message reassembled"
                );
                self.dispatch(message.message_id(), message.payload());
            }
            Err(err) => {
                if let Some(fragments) = err.abandoned() {
                    self.dropped(DropReason::Abandoned { fragments });
                }
                self.dropped(err.into());
            }
        }
    }

    fn dispatch(&mut self, id: MessageId, payload: &[u8]) {
        if self.handlers.dispatch(id, payload) {
            trace!(id = %id, len = payload.len(), "message dispatched");
        } else {
            self.dropped(DropReason::Unhandled { id });
        }
    }

    fn dropped(&mut self, reason: DropReason) {
        debug!(reason = %reason, "inbound data dropped");
        metrics::inc_dropped(reason);
        self.hooks.dropped(&reason);
    }
}

#[cfg(test)]
mod tests;
