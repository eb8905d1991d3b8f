//! In-memory [`FrameSink`] that records every write.

use std::{
    io,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bleframe::FrameSink;
use bytes::Bytes;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Recorded {
    writes: Vec<(Instant, Bytes)>,
    disconnects: usize,
    failures_pending: usize,
}

/// Sink standing in for a BLE characteristic.
///
/// Clones share the same record, so a test can keep one clone while the
/// actor owns another. Write times come from `tokio::time`, which honours
/// paused test clocks.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Frames written so far with the time of each write.
    #[must_use]
    pub fn writes(&self) -> Vec<(Instant, Bytes)> { self.lock().writes.clone() }

    /// Frames written so far.
    #[must_use]
    pub fn frames(&self) -> Vec<Bytes> {
        self.lock()
            .writes
            .iter()
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    /// How many times the transport asked the link to disconnect.
    #[must_use]
    pub fn disconnects(&self) -> usize { self.lock().disconnects }

    /// Fail the next `count` writes with a broken pipe.
    pub fn fail_next(&self, count: usize) { self.lock().failures_pending = count; }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn write_frame(&mut self, frame: Bytes) -> io::Result<()> {
        let mut recorded = self.lock();
        if recorded.failures_pending > 0 {
            recorded.failures_pending -= 1;
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "characteristic write rejected",
            ));
        }
        recorded.writes.push((Instant::now(), frame));
        Ok(())
    }

    fn disconnect(&mut self) { self.lock().disconnects += 1; }
}
