//! Inbound state machine that stitches multipart frames back together.
//!
//! Only one message is reassembled at a time. The machine has two states:
//!
//! | state          | start                 | continue            | final                      |
//! |----------------|-----------------------|---------------------|----------------------------|
//! | `Idle`         | begin, `Reassembling` | orphan (see policy) | orphan (see policy)        |
//! | `Reassembling` | discard partial, begin| append              | append, complete, `Idle`   |
//!
//! The completed buffer still holds the `[size, id]` header the sender
//! embedded before slicing; [`ReassembledMessage`] strips it so callers get
//! the original id and payload directly.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use bytes::{Bytes, BytesMut};

use super::ReassemblyError;
use crate::frame::{FRAME_HEADER_LEN, MessageId, MultipartKind};

/// What to do with a continue or final fragment that has no start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Drop the fragment and stay idle.
    #[default]
    Discard,
    /// Treat the fragment as if a start had opened an empty message.
    Tolerate,
}

/// Observable state of a [`Reassembler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReassemblyState {
    /// No multipart message in flight.
    Idle,
    /// A multipart message is partially buffered.
    Reassembling {
        /// Fragments received so far.
        fragments: usize,
        /// Body bytes buffered so far.
        buffered: usize,
    },
}

/// Result of feeding one multipart fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReassemblyStatus {
    /// A new message began.
    Started {
        /// Fragment count of a partial message that the start discarded.
        abandoned: Option<usize>,
    },
    /// The message still expects more fragments.
    Incomplete,
    /// The fragment completed the message.
    Complete(ReassembledMessage),
}

#[derive(Debug)]
struct PartialMessage {
    buffer: BytesMut,
    fragments: usize,
    started_at: Instant,
}

impl PartialMessage {
    fn new(started_at: Instant) -> Self {
        Self {
            buffer: BytesMut::new(),
            fragments: 0,
            started_at,
        }
    }

    fn push(&mut self, body: &[u8]) {
        self.buffer.extend_from_slice(body);
        self.fragments += 1;
    }

    fn len(&self) -> usize { self.buffer.len() }
}

#[derive(Debug)]
enum State {
    Idle,
    Reassembling(PartialMessage),
}

/// A fully reassembled multipart message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledMessage {
    declared_size: u8,
    message_id: MessageId,
    payload: Bytes,
    fragments: usize,
}

impl ReassembledMessage {
    fn from_buffer(buffer: BytesMut, fragments: usize) -> Result<Self, ReassemblyError> {
        if buffer.len() < FRAME_HEADER_LEN {
            return Err(ReassemblyError::Truncated { len: buffer.len() });
        }
        let mut payload = buffer.freeze();
        let header = payload.split_to(FRAME_HEADER_LEN);
        Ok(Self {
            declared_size: header[0],
            message_id: MessageId::new(header[1]),
            payload,
            fragments,
        })
    }

    /// Id of the original message.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// The `size` byte the sender embedded; only its low byte survives.
    #[must_use]
    pub const fn declared_size(&self) -> u8 { self.declared_size }

    /// Reassembled payload without the embedded header.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Number of frames the message arrived in.
    #[must_use]
    pub const fn fragments(&self) -> usize { self.fragments }

    /// Consume the message, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Rebuild the legacy `[size, id, payload..]` buffer.
    #[must_use]
    pub fn to_frame_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&[self.declared_size, self.message_id.get()]);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }
}

/// Single-slot multipart reassembler.
#[derive(Debug)]
pub struct Reassembler {
    orphan_policy: OrphanPolicy,
    max_message_size: Option<NonZeroUsize>,
    timeout: Option<Duration>,
    state: State,
}

impl Default for Reassembler {
    fn default() -> Self { Self::new(OrphanPolicy::default()) }
}

impl Reassembler {
    /// Create an unbounded reassembler without a timeout.
    #[must_use]
    pub const fn new(orphan_policy: OrphanPolicy) -> Self {
        Self {
            orphan_policy,
            max_message_size: None,
            timeout: None,
            state: State::Idle,
        }
    }

    /// Cap the reassembled size in bytes, embedded header included.
    #[must_use]
    pub const fn with_max_message_size(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.max_message_size = limit;
        self
    }

    /// Evict partial messages older than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ReassemblyState {
        match &self.state {
            State::Idle => ReassemblyState::Idle,
            State::Reassembling(partial) => ReassemblyState::Reassembling {
                fragments: partial.fragments,
                buffered: partial.len(),
            },
        }
    }

    /// Whether a partial message is buffered.
    #[must_use]
    pub fn is_reassembling(&self) -> bool { matches!(self.state, State::Reassembling(_)) }

    /// Feed a fragment body using the current time.
    ///
    /// # Errors
    ///
    /// See [`Reassembler::push_at`].
    pub fn push(
        &mut self,
        kind: MultipartKind,
        body: impl AsRef<[u8]>,
    ) -> Result<ReassemblyStatus, ReassemblyError> {
        self.push_at(kind, body, Instant::now())
    }

    /// Feed the body of a multipart fragment (its two-byte header already
    /// stripped), using an explicit clock reading for new messages.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Orphan`] for a continue or final fragment
    /// while idle under [`OrphanPolicy::Discard`],
    /// [`ReassemblyError::MessageTooLarge`] when the cap is exceeded (noting
    /// any partial message a start fragment replaced), and
    /// [`ReassemblyError::Truncated`] when a completed message is shorter
    /// than its embedded header. Every error leaves the machine idle.
    pub fn push_at(
        &mut self,
        kind: MultipartKind,
        body: impl AsRef<[u8]>,
        now: Instant,
    ) -> Result<ReassemblyStatus, ReassemblyError> {
        let body = body.as_ref();
        match kind {
            MultipartKind::Start => {
                let abandoned = match std::mem::replace(
                    &mut self.state,
                    State::Reassembling(PartialMessage::new(now)),
                ) {
                    State::Reassembling(previous) => Some(previous.fragments),
                    State::Idle => None,
                };
                self.append(body).map_err(|err| err.replacing(abandoned))?;
                Ok(ReassemblyStatus::Started { abandoned })
            }
            MultipartKind::Continue => {
                self.ensure_open(kind, now)?;
                self.append(body)?;
                Ok(ReassemblyStatus::Incomplete)
            }
            MultipartKind::Final => {
                self.ensure_open(kind, now)?;
                self.append(body)?;
                match std::mem::replace(&mut self.state, State::Idle) {
                    State::Reassembling(partial) => {
                        ReassembledMessage::from_buffer(partial.buffer, partial.fragments)
                            .map(ReassemblyStatus::Complete)
                    }
                    State::Idle => Err(ReassemblyError::Orphan { kind }),
                }
            }
        }
    }

    /// Drop a partial message that has outlived the configured timeout.
    ///
    /// Returns the number of fragments discarded.
    pub fn purge_expired_at(&mut self, now: Instant) -> Option<usize> {
        let timeout = self.timeout?;
        let State::Reassembling(partial) = &self.state else {
            return None;
        };
        if now.saturating_duration_since(partial.started_at) < timeout {
            return None;
        }
        let fragments = partial.fragments;
        self.state = State::Idle;
        Some(fragments)
    }

    /// Forget any partial message.
    ///
    /// Returns the number of fragments discarded.
    pub fn reset(&mut self) -> Option<usize> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Reassembling(partial) => Some(partial.fragments),
            State::Idle => None,
        }
    }

    fn ensure_open(&mut self, kind: MultipartKind, now: Instant) -> Result<(), ReassemblyError> {
        if self.is_reassembling() {
            return Ok(());
        }
        match self.orphan_policy {
            OrphanPolicy::Discard => Err(ReassemblyError::Orphan { kind }),
            OrphanPolicy::Tolerate => {
                self.state = State::Reassembling(PartialMessage::new(now));
                Ok(())
            }
        }
    }

    fn append(&mut self, body: &[u8]) -> Result<(), ReassemblyError> {
        let limit = self.max_message_size;
        let State::Reassembling(partial) = &mut self.state else {
            return Ok(());
        };
        if let Some(limit) = limit {
            let attempted = partial.len().saturating_add(body.len());
            if attempted > limit.get() {
                self.state = State::Idle;
                return Err(ReassemblyError::MessageTooLarge {
                    attempted,
                    limit,
                    abandoned: None,
                });
            }
        }
        partial.push(body);
        Ok(())
    }
}
