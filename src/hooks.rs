//! Optional diagnostic callbacks invoked by the transport.
//!
//! Wire anomalies never surface as errors. [`TransportHooks`] lets an
//! application observe them anyway, alongside the logs and metrics the
//! transport always emits.

use crate::error::DropReason;

/// Type alias for the `on_drop` callback.
type OnDropHook = Box<dyn FnMut(&DropReason) + Send + 'static>;

/// Type alias for the `on_disconnect` callback.
type OnDisconnectHook = Box<dyn FnMut() + Send + 'static>;

/// Callbacks used by [`FrameTransport`](crate::transport::FrameTransport)
/// and the actor driving it.
#[derive(Default)]
pub struct TransportHooks {
    /// Invoked whenever an inbound frame or partial message is discarded.
    pub on_drop: Option<OnDropHook>,
    /// Invoked once when the actor stops because the link went away.
    pub on_disconnect: Option<OnDisconnectHook>,
}

impl TransportHooks {
    /// Hooks that only observe drops.
    #[must_use]
    pub fn on_drop(hook: impl FnMut(&DropReason) + Send + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(hook)),
            on_disconnect: None,
        }
    }

    /// Add an `on_disconnect` callback.
    #[must_use]
    pub fn with_on_disconnect(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_disconnect = Some(Box::new(hook));
        self
    }

    /// Run the `on_drop` hook if registered.
    pub fn dropped(&mut self, reason: &DropReason) {
        if let Some(hook) = &mut self.on_drop {
            hook(reason);
        }
    }

    /// Run the `on_disconnect` hook if registered.
    pub fn disconnected(&mut self) {
        if let Some(hook) = &mut self.on_disconnect {
            hook();
        }
    }
}

impl std::fmt::Debug for TransportHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportHooks")
            .field("on_drop", &self.on_drop.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .finish()
    }
}
