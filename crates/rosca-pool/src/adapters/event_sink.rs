//! Event Sink Adapters
//!
//! `InMemoryEventSink` records events for inspection; `TracingEventSink`
//! renders them as JSON log lines.

use crate::events::PoolEvent;
use crate::ports::outbound::RoscaEventSink;
use parking_lot::Mutex;
use tracing::{info, warn};

/// Records every published event.
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<PoolEvent>>,
}

impl InMemoryEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far, oldest first.
    pub fn events(&self) -> Vec<PoolEvent> {
        self.events.lock().clone()
    }

    /// Names of the events published so far.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event.name()).collect()
    }

    /// Drop recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl RoscaEventSink for InMemoryEventSink {
    fn publish(&self, event: PoolEvent) {
        self.events.lock().push(event);
    }
}

/// Logs each event as JSON at `info`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl RoscaEventSink for TracingEventSink {
    fn publish(&self, event: PoolEvent) {
        match serde_json::to_string(&event.event) {
            Ok(json) => info!(
                pool_id = %event.pool_id,
                event = event.event.name(),
                "[rosca] {}",
                json
            ),
            Err(e) => warn!("[rosca] Failed to encode {}: {}", event.event.name(), e),
        }
    }
}
