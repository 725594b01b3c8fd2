//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits: in-process custody, clocks and
//! event sinks.

mod clock;
mod currency;
mod event_sink;

pub use clock::{ManualClock, SystemClock};
pub use currency::InMemoryCurrency;
pub use event_sink::{InMemoryEventSink, TracingEventSink};
