//! Builder para `WizardEngine`.
//!
//! Parte de un repositorio y usa por defecto `InMemoryEventSink`,
//! `JsonResponseRenderer`, `RuleValidator` y `WizardConfig::default()`.
//! `events` y `renderer` cambian el tipo del builder.

use std::sync::Arc;

use crate::config::WizardConfig;
use crate::event::{EventSink, InMemoryEventSink};
use crate::render::{JsonResponseRenderer, ResponseRenderer};
use crate::repo::WizardRepository;
use crate::validation::{RuleValidator, Validator};

use super::WizardEngine;

pub struct EngineBuilder<R, E = InMemoryEventSink, V = JsonResponseRenderer> {
    repository: R,
    events: E,
    renderer: V,
    validator: Box<dyn Validator>,
    config: WizardConfig,
}

impl<R> EngineBuilder<R> where R: WizardRepository
{
    pub(crate) fn new(repository: R) -> Self {
        Self { repository,
               events: InMemoryEventSink::default(),
               renderer: JsonResponseRenderer,
               validator: Box::new(RuleValidator),
               config: WizardConfig::default() }
    }
}

impl<R, E, V> EngineBuilder<R, E, V>
    where R: WizardRepository,
          E: EventSink,
          V: ResponseRenderer
{
    pub fn events<E2>(self, events: E2) -> EngineBuilder<R, E2, V>
        where E2: EventSink
    {
        EngineBuilder { repository: self.repository,
                        events,
                        renderer: self.renderer,
                        validator: self.validator,
                        config: self.config }
    }

    pub fn renderer<V2>(self, renderer: V2) -> EngineBuilder<R, E, V2>
        where V2: ResponseRenderer
    {
        EngineBuilder { repository: self.repository,
                        events: self.events,
                        renderer,
                        validator: self.validator,
                        config: self.config }
    }

    pub fn validator<X>(mut self, validator: X) -> Self
        where X: Validator + 'static
    {
        self.validator = Box::new(validator);
        self
    }

    pub fn config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> WizardEngine<R, E, V> {
        WizardEngine::from_parts(self.repository,
                                 self.events,
                                 self.renderer,
                                 self.validator,
                                 Arc::new(self.config))
    }
}
