//! Eventos de ciclo de vida del wizard y sinks que los reciben.

mod sink;
mod types;

pub use sink::{EventSink, InMemoryEventSink, LoggingEventSink, ObserverSink};
pub use types::{WizardEvent, WizardEventKind};
