//! Transport configuration.
//!
//! [`TransportConfig`] gathers the link limits and reassembly policy a
//! [`FrameTransport`](crate::transport::FrameTransport) runs with. Defaults
//! match the robot firmware: 20-byte frames paced every 10 ms, no reassembly
//! timeout and no size cap.

use std::{num::NonZeroUsize, time::Duration};

use thiserror::Error;

use crate::{
    fragment::{MAX_FRAME_SIZE_LIMIT, MIN_FRAME_SIZE, OrphanPolicy},
    frame::{MAX_FRAME_SIZE, MultipartIds, Role},
};

/// Default period of the outbound pacing tick.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_millis(10);

/// Errors returned by [`TransportConfigBuilder::build`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The frame size cannot hold a header plus one byte, or overflows `size`.
    #[error(
        "invalid max frame size {0}; must be between {min} and {max}",
        min = MIN_FRAME_SIZE,
        max = MAX_FRAME_SIZE_LIMIT
    )]
    InvalidFrameSize(usize),
    /// The pacing tick must have a non-zero period.
    #[error("pacing interval must be non-zero")]
    ZeroPacingInterval,
    /// Reassembly timeouts must be non-zero when set.
    #[error("reassembly timeout must be non-zero")]
    ZeroReassemblyTimeout,
    /// A multipart id set reuses the same id for two fragment kinds.
    #[error("multipart ids must be three distinct values")]
    OverlappingMultipartIds,
}

/// Validated settings for a transport instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    max_frame_size: usize,
    pacing_interval: Duration,
    outbound_ids: MultipartIds,
    inbound_ids: MultipartIds,
    orphan_policy: OrphanPolicy,
    reassembly_timeout: Option<Duration>,
    max_message_size: Option<NonZeroUsize>,
}

impl Default for TransportConfig {
    fn default() -> Self { Self::for_role(Role::default()) }
}

impl TransportConfig {
    /// Defaults for the given end of the link.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
            pacing_interval: DEFAULT_PACING_INTERVAL,
            outbound_ids: role.outbound_ids(),
            inbound_ids: role.inbound_ids(),
            orphan_policy: OrphanPolicy::Discard,
            reassembly_timeout: None,
            max_message_size: None,
        }
    }

    /// Start building a configuration from the central defaults.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder { TransportConfigBuilder::default() }

    /// Largest encoded frame written to the link.
    #[must_use]
    pub const fn max_frame_size(&self) -> usize { self.max_frame_size }

    /// Period of the outbound pacing tick.
    #[must_use]
    pub const fn pacing_interval(&self) -> Duration { self.pacing_interval }

    /// Multipart ids stamped on outbound fragments.
    #[must_use]
    pub const fn outbound_ids(&self) -> MultipartIds { self.outbound_ids }

    /// Multipart ids recognised on inbound frames.
    #[must_use]
    pub const fn inbound_ids(&self) -> MultipartIds { self.inbound_ids }

    /// Handling of continue/final fragments without a start.
    #[must_use]
    pub const fn orphan_policy(&self) -> OrphanPolicy { self.orphan_policy }

    /// Age after which a partial message is dropped, if any.
    #[must_use]
    pub const fn reassembly_timeout(&self) -> Option<Duration> { self.reassembly_timeout }

    /// Cap on the reassembled message size, if any.
    #[must_use]
    pub const fn max_message_size(&self) -> Option<NonZeroUsize> { self.max_message_size }
}

/// Builder for [`TransportConfig`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use bleframe::{config::TransportConfig, frame::Role};
///
/// let config = TransportConfig::builder()
///     .role(Role::Peripheral)
///     .max_frame_size(185)
///     .reassembly_timeout(Some(Duration::from_secs(5)))
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.max_frame_size(), 185);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Use the multipart ids of `role`.
    #[must_use]
    pub const fn role(mut self, role: Role) -> Self {
        self.config.outbound_ids = role.outbound_ids();
        self.config.inbound_ids = role.inbound_ids();
        self
    }

    /// Override the multipart ids for each direction.
    #[must_use]
    pub const fn multipart_ids(mut self, outbound: MultipartIds, inbound: MultipartIds) -> Self {
        self.config.outbound_ids = outbound;
        self.config.inbound_ids = inbound;
        self
    }

    /// Set the largest encoded frame, for links with a negotiated MTU.
    #[must_use]
    pub const fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the pacing tick period.
    #[must_use]
    pub const fn pacing_interval(mut self, interval: Duration) -> Self {
        self.config.pacing_interval = interval;
        self
    }

    /// Choose how orphan fragments are handled.
    #[must_use]
    pub const fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.config.orphan_policy = policy;
        self
    }

    /// Drop partial messages older than `timeout`; `None` keeps them forever.
    #[must_use]
    pub const fn reassembly_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.reassembly_timeout = timeout;
        self
    }

    /// Cap reassembled messages at `limit` bytes; `None` leaves them unbounded.
    #[must_use]
    pub const fn max_message_size(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.config.max_message_size = limit;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid setting.
    pub fn build(self) -> Result<TransportConfig, ConfigError> {
        let config = self.config;
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE_LIMIT).contains(&config.max_frame_size) {
            return Err(ConfigError::InvalidFrameSize(config.max_frame_size));
        }
        if config.pacing_interval.is_zero() {
            return Err(ConfigError::ZeroPacingInterval);
        }
        if config.reassembly_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroReassemblyTimeout);
        }
        if !config.outbound_ids.is_distinct() || !config.inbound_ids.is_distinct() {
            return Err(ConfigError::OverlappingMultipartIds);
        }
        Ok(config)
    }
}
