//! Message identifiers carried in the second byte of every frame.
//!
//! The multipart envelope reserves three ids per direction. A central (the
//! phone or host side of the link) fragments with `0xF0..=0xF2` and receives
//! peripheral fragments tagged `0xF3..=0xF5`. [`Role`] captures which side a
//! transport plays so both ends can be exercised from one crate.

use derive_more::{Display, From, Into};

/// Identifier of a message type on the wire.
///
/// # Examples
///
/// ```
/// use bleframe::frame::MessageId;
/// let id = MessageId::new(0x16);
/// assert_eq!(id.get(), 0x16);
/// assert_eq!(id.to_string(), "0x16");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
#[display("{_0:#04x}")]
pub struct MessageId(u8);

impl MessageId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self { Self(value) }

    /// Return the raw id byte.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }
}

/// Position of a frame within a multipart message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum MultipartKind {
    /// First fragment; resets any partial message.
    #[display("start")]
    Start,
    /// Middle fragment.
    #[display("continue")]
    Continue,
    /// Last fragment; completes the message.
    #[display("final")]
    Final,
}

/// The three reserved ids used to tag fragments travelling in one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MultipartIds {
    start: MessageId,
    continue_: MessageId,
    final_: MessageId,
}

impl MultipartIds {
    /// Fragment ids used by a central writing to a peripheral.
    pub const CENTRAL_TO_PERIPHERAL: Self = Self::new(
        MessageId::new(0xF0),
        MessageId::new(0xF1),
        MessageId::new(0xF2),
    );
    /// Fragment ids used by a peripheral notifying a central.
    pub const PERIPHERAL_TO_CENTRAL: Self = Self::new(
        MessageId::new(0xF3),
        MessageId::new(0xF4),
        MessageId::new(0xF5),
    );

    /// Build a custom id set.
    #[must_use]
    pub const fn new(start: MessageId, continue_: MessageId, final_: MessageId) -> Self {
        Self {
            start,
            continue_,
            final_,
        }
    }

    /// Id tagging the first fragment.
    #[must_use]
    pub const fn start(&self) -> MessageId { self.start }

    /// Id tagging middle fragments.
    #[must_use]
    pub const fn continue_id(&self) -> MessageId { self.continue_ }

    /// Id tagging the last fragment.
    #[must_use]
    pub const fn final_id(&self) -> MessageId { self.final_ }

    /// Return the id for `kind`.
    #[must_use]
    pub const fn id_for(&self, kind: MultipartKind) -> MessageId {
        match kind {
            MultipartKind::Start => self.start,
            MultipartKind::Continue => self.continue_,
            MultipartKind::Final => self.final_,
        }
    }

    /// Classify `id`, returning `None` for ordinary message ids.
    #[must_use]
    pub fn classify(&self, id: MessageId) -> Option<MultipartKind> {
        if id == self.start {
            Some(MultipartKind::Start)
        } else if id == self.continue_ {
            Some(MultipartKind::Continue)
        } else if id == self.final_ {
            Some(MultipartKind::Final)
        } else {
            None
        }
    }

    /// Whether `id` is one of the three reserved ids.
    #[must_use]
    pub fn contains(&self, id: MessageId) -> bool { self.classify(id).is_some() }

    /// Whether all three ids are distinct.
    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.start != self.continue_ && self.start != self.final_ && self.continue_ != self.final_
    }
}

/// Which end of the link a transport represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// The connecting side (host or phone app).
    #[default]
    Central,
    /// The device side (the robot).
    Peripheral,
}

impl Role {
    /// Fragment ids this role writes.
    #[must_use]
    pub const fn outbound_ids(self) -> MultipartIds {
        match self {
            Role::Central => MultipartIds::CENTRAL_TO_PERIPHERAL,
            Role::Peripheral => MultipartIds::PERIPHERAL_TO_CENTRAL,
        }
    }

    /// Fragment ids this role expects to receive.
    #[must_use]
    pub const fn inbound_ids(self) -> MultipartIds {
        match self {
            Role::Central => MultipartIds::PERIPHERAL_TO_CENTRAL,
            Role::Peripheral => MultipartIds::CENTRAL_TO_PERIPHERAL,
        }
    }

    /// The role at the other end of the link.
    #[must_use]
    pub const fn peer(self) -> Self {
        match self {
            Role::Central => Role::Peripheral,
            Role::Peripheral => Role::Central,
        }
    }
}

/// Message ids understood by the robot firmware.
///
/// Only the names are recorded here; payload layouts belong to the callers
/// that register handlers for them.
pub mod known {
    use super::MessageId;

    pub const BTLE_DISCONNECT: MessageId = MessageId::new(0x0D);
    pub const CORE_PING_REQUEST: MessageId = MessageId::new(0x16);
    pub const CORE_PING_RESPONSE: MessageId = MessageId::new(0x17);
    pub const HEARTBEAT_REQUEST: MessageId = MessageId::new(0x18);
    pub const HEARTBEAT_RESPONSE: MessageId = MessageId::new(0x19);
    pub const WIFI_START: MessageId = MessageId::new(0x1A);
    pub const WIFI_STOP: MessageId = MessageId::new(0x1B);
    pub const DEV_PING_WITH_DATA_REQUEST: MessageId = MessageId::new(0x91);
    pub const DEV_PING_WITH_DATA_RESPONSE: MessageId = MessageId::new(0x92);
    pub const DEV_RESTART_ADBD: MessageId = MessageId::new(0x93);
    pub const DEV_EXEC_CMD_LINE: MessageId = MessageId::new(0x94);
    pub const DEV_EXEC_CMD_LINE_RESPONSE: MessageId = MessageId::new(0x95);
    pub const MULTIPART_START_TO_PERIPHERAL: MessageId = MessageId::new(0xF0);
    pub const MULTIPART_CONTINUE_TO_PERIPHERAL: MessageId = MessageId::new(0xF1);
    pub const MULTIPART_FINAL_TO_PERIPHERAL: MessageId = MessageId::new(0xF2);
    pub const MULTIPART_START_TO_CENTRAL: MessageId = MessageId::new(0xF3);
    pub const MULTIPART_CONTINUE_TO_CENTRAL: MessageId = MessageId::new(0xF4);
    pub const MULTIPART_FINAL_TO_CENTRAL: MessageId = MessageId::new(0xF5);

    pub(super) const TABLE: &[(&str, MessageId)] = &[
        ("btle-disconnect", BTLE_DISCONNECT),
        ("core-ping-request", CORE_PING_REQUEST),
        ("core-ping-response", CORE_PING_RESPONSE),
        ("heartbeat-request", HEARTBEAT_REQUEST),
        ("heartbeat-response", HEARTBEAT_RESPONSE),
        ("wifi-start", WIFI_START),
        ("wifi-stop", WIFI_STOP),
        ("dev-ping-with-data-request", DEV_PING_WITH_DATA_REQUEST),
        ("dev-ping-with-data-response", DEV_PING_WITH_DATA_RESPONSE),
        ("dev-restart-adbd", DEV_RESTART_ADBD),
        ("dev-exec-cmd-line", DEV_EXEC_CMD_LINE),
        ("dev-exec-cmd-line-response", DEV_EXEC_CMD_LINE_RESPONSE),
        ("multipart-start-to-peripheral", MULTIPART_START_TO_PERIPHERAL),
        ("multipart-continue-to-peripheral", MULTIPART_CONTINUE_TO_PERIPHERAL),
        ("multipart-final-to-peripheral", MULTIPART_FINAL_TO_PERIPHERAL),
        ("multipart-start-to-central", MULTIPART_START_TO_CENTRAL),
        ("multipart-continue-to-central", MULTIPART_CONTINUE_TO_CENTRAL),
        ("multipart-final-to-central", MULTIPART_FINAL_TO_CENTRAL),
    ];
}

/// Name of a known message id, if any.
///
/// ```
/// use bleframe::frame::{MessageId, ids};
/// assert_eq!(ids::name(MessageId::new(0x17)), Some("core-ping-response"));
/// assert_eq!(ids::name(MessageId::new(0x42)), None);
/// ```
#[must_use]
pub fn name(id: MessageId) -> Option<&'static str> {
    known::TABLE
        .iter()
        .find_map(|(name, known)| (*known == id).then_some(*name))
}

/// Resolve a known message name (case-insensitive, `_` and `-` interchangeable).
#[must_use]
pub fn lookup(name: &str) -> Option<MessageId> {
    let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
    known::TABLE
        .iter()
        .find_map(|(known, id)| (*known == wanted).then_some(*id))
}

/// Every known id with its name, in ascending id order.
#[must_use]
pub fn all() -> impl Iterator<Item = (&'static str, MessageId)> { known::TABLE.iter().copied() }
