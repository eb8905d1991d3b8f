//! Errors emitted by the reassembly state machine.
//!
//! None of these ever reach the wire. The transport turns them into silent
//! drops and reports them through logs, metrics and hooks.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::frame::MultipartKind;

/// Errors produced by [`Reassembler`](crate::fragment::Reassembler).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// A continue or final fragment arrived with no message in progress.
    #[error("multipart {kind} fragment without a preceding start")]
    Orphan { kind: MultipartKind },
    /// The partial message grew beyond the configured cap.
    ///
    /// `abandoned` counts the fragments of an earlier partial message that a
    /// start fragment replaced before its own body broke the cap.
    #[error("reassembled message of {attempted} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        attempted: usize,
        limit: NonZeroUsize,
        abandoned: Option<usize>,
    },
    /// The completed buffer is too short to hold the embedded `size`/`id` header.
    #[error("reassembled message of {len} bytes lacks an embedded header")]
    Truncated { len: usize },
}

impl ReassemblyError {
    /// Fragments of a replaced partial message discarded along with this error.
    #[must_use]
    pub const fn abandoned(&self) -> Option<usize> {
        match self {
            Self::MessageTooLarge { abandoned, .. } => *abandoned,
            Self::Orphan { .. } | Self::Truncated { .. } => None,
        }
    }

    pub(crate) const fn replacing(self, fragments: Option<usize>) -> Self {
        match self {
            Self::MessageTooLarge {
                attempted, limit, ..
            } => Self::MessageTooLarge {
                attempted,
                limit,
                abandoned: fragments,
            },
            other => other,
        }
    }
}
