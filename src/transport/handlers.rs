//! Per-id payload handlers.

use std::collections::{HashMap, hash_map::Entry};

use crate::{error::TransportError, frame::MessageId};

/// Callback invoked with the payload of a message.
pub type Handler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Catch-all callback for ids without a dedicated handler.
pub type DefaultHandler = Box<dyn FnMut(MessageId, &[u8]) + Send + 'static>;

/// Routes dispatched messages to their handlers.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: HashMap<MessageId, Handler>,
    fallback: Option<DefaultHandler>,
}

impl HandlerRegistry {
    pub(crate) fn insert(&mut self, id: MessageId, handler: Handler) -> Result<(), TransportError> {
        match self.handlers.entry(id) {
            Entry::Occupied(_) => Err(TransportError::DuplicateHandler(id)),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    pub(crate) fn remove(&mut self, id: MessageId) -> bool { self.handlers.remove(&id).is_some() }

    pub(crate) fn set_fallback(&mut self, handler: Option<DefaultHandler>) { self.fallback = handler; }

    pub(crate) fn contains(&self, id: MessageId) -> bool { self.handlers.contains_key(&id) }

    /// Invoke the handler for `id`, returning `false` when nothing took it.
    pub(crate) fn dispatch(&mut self, id: MessageId, payload: &[u8]) -> bool {
        if let Some(handler) = self.handlers.get_mut(&id) {
            handler(payload);
            return true;
        }
        if let Some(fallback) = &mut self.fallback {
            fallback(id, payload);
            return true;
        }
        false
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.handlers.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("ids", &ids)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
