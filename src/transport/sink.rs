//! The link the actor writes frames to.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;

/// Byte-oriented write side of the link, such as a BLE characteristic.
///
/// Implementations own the underlying connection. The actor calls
/// [`write_frame`](FrameSink::write_frame) at most once per pacing tick and
/// never concurrently.
#[async_trait]
pub trait FrameSink: Send {
    /// Write one encoded frame.
    ///
    /// # Errors
    ///
    /// Returns the link error. The actor logs it and moves on; the frame is
    /// not retried.
    async fn write_frame(&mut self, frame: Bytes) -> io::Result<()>;

    /// Ask the link to disconnect. Link loss is reported separately through
    /// the inbound stream ending or the shutdown token.
    fn disconnect(&mut self) {}
}

#[async_trait]
impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    async fn write_frame(&mut self, frame: Bytes) -> io::Result<()> {
        (**self).write_frame(frame).await
    }

    fn disconnect(&mut self) { (**self).disconnect(); }
}
