use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::events::NavEvent;

/// Host callback receiving `(event_name, payload)`.
pub type Emitter = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Single-slot relay from the navigation core to the host transport.
///
/// At most one emitter is live; `set_emitter` replaces any previous one.
/// Emission is synchronous, best-effort and never fails.
#[derive(Default)]
pub struct EventBridge {
    emitter: RwLock<Option<Emitter>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_emitter<F>(&self, emitter: F)
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        *self.emitter.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(emitter));
    }

    pub fn clear_emitter(&self) {
        *self.emitter.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_emitter(&self) -> bool {
        self.emitter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Deliver to the current emitter, or drop silently when none is set.
    pub fn emit(&self, event_name: &str, payload: &Value) {
        // Clone out of the lock so an emitter may call back into the bridge.
        let emitter = self
            .emitter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match emitter {
            Some(emit) => emit(event_name, payload),
            None => tracing::trace!(event = event_name, "no emitter registered; event dropped"),
        }
    }

    pub fn emit_event(&self, event: &NavEvent) {
        self.emit(event.name(), &event.payload());
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge")
            .field("has_emitter", &self.has_emitter())
            .finish()
    }
}
