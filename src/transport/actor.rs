//! Tokio task that paces outbound frames and feeds inbound ones.
//!
//! `TransportActor` owns a [`FrameTransport`] and is its only user, so the
//! queue and reassembly buffer need no locking. A `tokio::select!` loop
//! multiplexes the shutdown token, commands from [`TransportHandle`]s,
//! frames from the link and the pacing interval. Each tick writes at most
//! one frame.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use log::info;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::{FrameSink, FrameTransport, Handler};
use crate::{
    error::TransportError,
    frame::MessageId,
    metrics::{self, Direction},
};

enum Command {
    Send {
        id: MessageId,
        payload: Bytes,
    },
    Register {
        id: MessageId,
        handler: Handler,
        reply: oneshot::Sender<Result<(), TransportError>>,
    },
    Disconnect,
}

enum Event {
    Shutdown,
    Command(Option<Command>),
    Inbound(Option<Bytes>),
    Tick,
}

/// Cloneable handle for talking to a running [`TransportActor`].
#[derive(Clone, Debug)]
pub struct TransportHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl TransportHandle {
    /// Queue a message for transmission. Never waits.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the actor has stopped.
    pub fn send(&self, id: MessageId, payload: impl Into<Bytes>) -> Result<(), TransportError> {
        self.tx
            .send(Command::Send {
                id,
                payload: payload.into(),
            })
            .map_err(|_| TransportError::Closed)
    }

    /// Register a handler on the running transport.
    ///
    /// # Errors
    ///
    /// Returns the registration error from
    /// [`FrameTransport::register_handler`], or [`TransportError::Closed`]
    /// once the actor has stopped.
    pub async fn register_handler<F>(&self, id: MessageId, handler: F) -> Result<(), TransportError>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Register {
                id,
                handler: Box::new(handler),
                reply,
            })
            .map_err(|_| TransportError::Closed)?;
        response.await.map_err(|_| TransportError::Closed)?
    }

    /// Ask the link to disconnect.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the actor has stopped.
    pub fn disconnect(&self) -> Result<(), TransportError> {
        self.tx
            .send(Command::Disconnect)
            .map_err(|_| TransportError::Closed)
    }

    /// Whether the actor has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Send { id, payload } => f
                .debug_struct("Send")
                .field("id", id)
                .field("len", &payload.len())
                .finish(),
            Self::Register { id, .. } => f.debug_struct("Register").field("id", id).finish(),
            Self::Disconnect => f.write_str("Disconnect"),
        }
    }
}

/// Drives a [`FrameTransport`] against a link.
///
/// # Examples
///
/// ```no_run
/// use bleframe::{
///     frame::MessageId,
///     transport::{FrameSink, FrameTransport, TransportActor},
/// };
/// use bytes::Bytes;
/// use tokio_util::sync::CancellationToken;
///
/// struct Characteristic;
///
/// #[async_trait::async_trait]
/// impl FrameSink for Characteristic {
///     async fn write_frame(&mut self, _frame: Bytes) -> std::io::Result<()> { Ok(()) }
/// }
///
/// # async fn demo() {
/// let (_notify_tx, notify_rx) = futures::channel::mpsc::unbounded::<Bytes>();
/// let shutdown = CancellationToken::new();
/// let (actor, handle) =
///     TransportActor::new(FrameTransport::default(), Characteristic, notify_rx, shutdown);
/// let task = tokio::spawn(actor.run());
/// handle.send(MessageId::new(0x16), Bytes::new()).expect("actor running");
/// # drop(task);
/// # }
/// ```
pub struct TransportActor<S, I> {
    transport: FrameTransport,
    sink: S,
    inbound: I,
    commands: mpsc::UnboundedReceiver<Command>,
    commands_open: bool,
    shutdown: CancellationToken,
    pacing_interval: Duration,
}

impl<S, I> TransportActor<S, I>
where
    S: FrameSink,
    I: Stream<Item = Bytes> + Unpin + Send,
{
    /// Create an actor and the handle used to command it.
    ///
    /// Cancel `shutdown` when the link reports disconnection; the actor also
    /// stops when `inbound` ends.
    #[must_use]
    pub fn new(
        transport: FrameTransport,
        sink: S,
        inbound: I,
        shutdown: CancellationToken,
    ) -> (Self, TransportHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let pacing_interval = transport.config().pacing_interval();
        let actor = Self {
            transport,
            sink,
            inbound,
            commands,
            commands_open: true,
            shutdown,
            pacing_interval,
        };
        (actor, TransportHandle { tx })
    }

    /// Run until the shutdown token is cancelled or the inbound stream ends.
    ///
    /// Returns the transport and sink so callers can inspect them.
    pub async fn run(mut self) -> (FrameTransport, S) {
        if self.shutdown.is_cancelled() {
            info!("transport aborted before start");
            return self.finish();
        }

        let mut tick = time::interval(self.pacing_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "transport started: pacing_interval={:?}, max_frame_size={}",
            self.pacing_interval,
            self.transport.config().max_frame_size()
        );

        loop {
            match self.next_event(&mut tick).await {
                Event::Shutdown => {
                    info!("transport link lost");
                    break;
                }
                Event::Command(Some(command)) => self.on_command(command),
                Event::Command(None) => self.commands_open = false,
                Event::Inbound(Some(frame)) => self.transport.on_frame_received(&frame),
                Event::Inbound(None) => {
                    info!("transport inbound stream ended");
                    break;
                }
                Event::Tick => self.on_tick().await,
            }
        }
        self.finish()
    }

    #[expect(
        clippy::integer_division_remainder_used,
        reason = "tokio::select! expands to modulus operations internally"
    )]
    async fn next_event(&mut self, tick: &mut time::Interval) -> Event {
        tokio::select! {
            biased;

            () = self.shutdown.cancelled() => Event::Shutdown,
            command = self.commands.recv(), if self.commands_open => Event::Command(command),
            frame = self.inbound.next() => Event::Inbound(frame),
            _ = tick.tick() => Event::Tick,
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Send { id, payload } => {
                self.transport.send(id, payload);
            }
            Command::Register { id, handler, reply } => {
                let result = self.transport.register_boxed(id, handler);
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
            Command::Disconnect => {
                info!("transport disconnect requested");
                self.sink.disconnect();
            }
        }
    }

    async fn on_tick(&mut self) {
        let Some(frame) = self.transport.poll_outgoing() else {
            return;
        };
        let len = frame.len();
        match self.sink.write_frame(frame).await {
            Ok(()) => {
                metrics::inc_frames(Direction::Outbound);
                trace!(len, "frame written");
            }
            Err(err) => {
                metrics::inc_write_errors();
                warn!(error = %err, len, "frame write failed");
            }
        }
    }

    fn finish(mut self) -> (FrameTransport, S) {
        let discarded = self.transport.reset();
        self.transport.notify_disconnected();
        info!("transport stopped: discarded_frames={discarded}");
        (self.transport, self.sink)
    }
}
