//! Canonical error types for the crate.
//!
//! [`TransportError`] is returned to callers of the transport API.
//! [`DropReason`] never is: it names the silent drops the receive path
//! performs so hooks, logs and metrics can observe them.

use thiserror::Error;

use crate::{
    fragment::ReassemblyError,
    frame::{MessageId, MultipartKind},
};

/// Errors surfaced by the transport API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Handlers cannot claim an inbound multipart id.
    #[error("message id {0} is reserved for multipart fragments")]
    ReservedId(MessageId),
    /// A handler for the id is already registered.
    #[error("a handler for message id {0} is already registered")]
    DuplicateHandler(MessageId),
    /// The transport task has stopped.
    #[error("transport closed")]
    Closed,
}

/// Why an inbound frame or partial message was discarded.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DropReason {
    /// The frame was shorter than its two-byte header.
    #[error("malformed frame of {len} bytes")]
    Malformed { len: usize },
    /// No handler is registered for the id.
    #[error("no handler for message id {id}")]
    Unhandled { id: MessageId },
    /// A continue or final fragment arrived while idle.
    #[error("multipart {kind} fragment without a start")]
    Orphan { kind: MultipartKind },
    /// A completed multipart message lacked its embedded header.
    #[error("reassembled message of {len} bytes lacks a header")]
    Truncated { len: usize },
    /// A partial message exceeded the configured size cap.
    #[error("reassembled message would reach {attempted} bytes")]
    TooLarge { attempted: usize },
    /// A new start fragment replaced a partial message.
    #[error("partial message of {fragments} fragments abandoned")]
    Abandoned { fragments: usize },
    /// A partial message outlived the reassembly timeout.
    #[error("partial message of {fragments} fragments expired")]
    Expired { fragments: usize },
}

impl DropReason {
    /// Short label used for metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::Unhandled { .. } => "unhandled",
            Self::Orphan { .. } => "orphan",
            Self::Truncated { .. } => "truncated",
            Self::TooLarge { .. } => "too_large",
            Self::Abandoned { .. } => "abandoned",
            Self::Expired { .. } => "expired",
        }
    }
}

impl From<ReassemblyError> for DropReason {
    fn from(error: ReassemblyError) -> Self {
        match error {
            ReassemblyError::Orphan { kind } => Self::Orphan { kind },
            ReassemblyError::MessageTooLarge { attempted, .. } => Self::TooLarge { attempted },
            ReassemblyError::Truncated { len } => Self::Truncated { len },
        }
    }
}

/// Result alias used by transport APIs.
pub type Result<T> = std::result::Result<T, TransportError>;
