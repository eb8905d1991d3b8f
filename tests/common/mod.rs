//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use bleframe::{FrameTransport, MessageId, Role, TransportConfig};
use rstest::fixture;

/// Result type for fallible tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// `DEV_EXEC_CMD_LINE`, the id long shell commands travel under.
pub const CMD: MessageId = MessageId::new(0x94);
/// `CORE_PING_REQUEST`, a header-only message.
pub const PING: MessageId = MessageId::new(0x16);

/// Transport for the app side of the link.
#[fixture]
pub fn central() -> FrameTransport { FrameTransport::new(TransportConfig::for_role(Role::Central)) }

/// Transport for the robot side of the link.
#[fixture]
pub fn robot() -> FrameTransport {
    FrameTransport::new(TransportConfig::for_role(Role::Peripheral))
}
