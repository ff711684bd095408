use chrono::Utc;
use log::info;

use crate::wizard::WizardId;

use super::{WizardEvent, WizardEventKind};

/// Receptor de eventos del engine.
pub trait EventSink {
    /// Registra un evento a partir de su kind y devuelve el evento completo
    /// (con seq y ts).
    fn emit(&mut self, wizard: &str, wizard_id: Option<WizardId>, kind: WizardEventKind) -> WizardEvent;
}

fn stamp(seq: &mut u64, wizard: &str, wizard_id: Option<WizardId>, kind: WizardEventKind) -> WizardEvent {
    let ev = WizardEvent { seq: *seq,
                           wizard: wizard.to_string(),
                           wizard_id,
                           kind,
                           ts: Utc::now() };
    *seq += 1;
    ev
}

/// Sink append-only en memoria (tests y CLI).
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    events: Vec<WizardEvent>,
    next_seq: u64,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[WizardEvent] {
        &self.events
    }

    pub fn list_for(&self, wizard_id: WizardId) -> Vec<WizardEvent> {
        self.events.iter().filter(|e| e.wizard_id == Some(wizard_id)).cloned().collect()
    }

    /// Nombres cortos de los eventos en orden de emisión.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.kind.name()).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for InMemoryEventSink {
    fn emit(&mut self, wizard: &str, wizard_id: Option<WizardId>, kind: WizardEventKind) -> WizardEvent {
        let ev = stamp(&mut self.next_seq, wizard, wizard_id, kind);
        self.events.push(ev.clone());
        ev
    }
}

/// Reenvía cada evento al logger (`log::info!`).
#[derive(Debug, Default)]
pub struct LoggingEventSink {
    next_seq: u64,
}

impl LoggingEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&mut self, wizard: &str, wizard_id: Option<WizardId>, kind: WizardEventKind) -> WizardEvent {
        let ev = stamp(&mut self.next_seq, wizard, wizard_id, kind);
        match ev.wizard_id {
            Some(id) => info!("[wizard-event] {} #{} {} {:?}", ev.wizard, id, ev.kind.name(), ev.kind),
            None => info!("[wizard-event] {} (new) {} {:?}", ev.wizard, ev.kind.name(), ev.kind),
        }
        ev
    }
}

type Observer = Box<dyn FnMut(&WizardEvent) + Send>;

/// Notifica a observadores registrados, en orden de suscripción.
#[derive(Default)]
pub struct ObserverSink {
    observers: Vec<Observer>,
    next_seq: u64,
}

impl ObserverSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F)
        where F: FnMut(&WizardEvent) + Send + 'static
    {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl EventSink for ObserverSink {
    fn emit(&mut self, wizard: &str, wizard_id: Option<WizardId>, kind: WizardEventKind) -> WizardEvent {
        let ev = stamp(&mut self.next_seq, wizard, wizard_id, kind);
        for observer in self.observers.iter_mut() {
            observer(&ev);
        }
        ev
    }
}
