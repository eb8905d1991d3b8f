//! Test support for `bleframe`.
//!
//! Provides a recording [`FrameSink`](bleframe::FrameSink), helpers that wire
//! two transports back to back, log capture through `logtest` and counter
//! lookups for `metrics-util` snapshots.
//!
//! ```rust
//! use bleframe::{FrameTransport, MessageId, Role, TransportConfig};
//! use bleframe_testing::{capture, patterned, pump};
//!
//! let mut central = FrameTransport::new(TransportConfig::for_role(Role::Central));
//! let mut robot = FrameTransport::new(TransportConfig::for_role(Role::Peripheral));
//! let seen = capture(&mut robot, MessageId::new(0x94));
//!
//! central.send(MessageId::new(0x94), patterned(48));
//! assert_eq!(pump(&mut central, &mut robot), 3);
//! assert_eq!(seen.take(), vec![patterned(48)]);
//! ```

pub mod logging;
pub mod loopback;
pub mod metrics;
pub mod sink;

pub use logging::{LoggerHandle, logger};
pub use loopback::{Captured, capture, drain, patterned, pump};
pub use metrics::MetricsSnapshot;
pub use sink::RecordingSink;
