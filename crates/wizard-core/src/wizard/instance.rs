//! Estado de un wizard durante un request.
//!
//! Un `Wizard` se construye por request a partir de una definición compartida.
//! Mantiene:
//! - `id`: `None` hasta que el repositorio asigna uno,
//! - `data`: último snapshot persistido,
//! - `additional_data`: valores preparados en este request (`set_data`), que
//!   se mezclan en `data` al guardar y luego se descartan,
//! - el puntero al step actual (0 salvo que `show`/`update` resuelvan otro).

use std::sync::Arc;

use serde_json::Value;

use crate::config::WizardConfig;
use crate::step::StepRef;
use crate::DataMap;

use super::definition::WizardDefinition;
use super::summary::{StepSummary, WizardSummary};
use super::WizardId;

#[derive(Debug, Clone)]
pub struct Wizard<'d> {
    definition: &'d WizardDefinition,
    config: Arc<WizardConfig>,
    id: Option<WizardId>,
    data: DataMap,
    additional_data: DataMap,
    current_step: usize,
}

impl<'d> Wizard<'d> {
    pub fn new(definition: &'d WizardDefinition) -> Self {
        Self::with_config(definition, Arc::new(WizardConfig::default()))
    }

    pub fn with_config(definition: &'d WizardDefinition, config: Arc<WizardConfig>) -> Self {
        Self { definition,
               config,
               id: None,
               data: DataMap::new(),
               additional_data: DataMap::new(),
               current_step: 0 }
    }

    /// Reconstruye un wizard persistido.
    pub fn restore(definition: &'d WizardDefinition, config: Arc<WizardConfig>, id: WizardId, data: DataMap) -> Self {
        Self { id: Some(id),
               data,
               ..Self::with_config(definition, config) }
    }

    pub fn definition(&self) -> &'d WizardDefinition {
        self.definition
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<WizardId> {
        self.id
    }

    pub fn slug(&self) -> &'d str {
        self.definition.slug()
    }

    pub fn title(&self) -> &'d str {
        self.definition.title()
    }

    /// Datos persistidos mezclados con los adicionales (ganan los adicionales).
    pub fn data(&self) -> DataMap {
        let mut merged = self.data.clone();
        for (k, v) in &self.additional_data {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Valor de `key`: primero el preparado en este request, luego el
    /// persistido.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.additional_data.get(key).or_else(|| self.data.get(key))
    }

    pub fn value_or(&self, key: &str, default: Value) -> Value {
        self.value(key).cloned().unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Prepara un valor que se persistirá con el próximo guardado.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.additional_data.insert(key.into(), value.into());
    }

    pub fn stored_data(&self) -> &DataMap {
        &self.data
    }

    pub(crate) fn stored_data_mut(&mut self) -> &mut DataMap {
        &mut self.data
    }

    pub fn additional_data(&self) -> &DataMap {
        &self.additional_data
    }

    pub fn current_step(&self) -> StepRef<'d> {
        self.definition
            .step(self.current_step)
            .unwrap_or_else(|| self.definition.first_step())
    }

    pub fn current_index(&self) -> usize {
        self.current_step
    }

    pub(crate) fn set_current_step(&mut self, index: usize) {
        if index < self.definition.len() {
            self.current_step = index;
        }
    }

    /// Fija el resultado de un guardado: id asignado y snapshot persistido.
    pub(crate) fn commit(&mut self, id: WizardId, data: DataMap) {
        self.id = Some(id);
        self.data = data;
        self.additional_data.clear();
    }

    /// URL de un step; `None` si el wizard no está persistido.
    pub fn step_url(&self, step_slug: &str) -> Option<String> {
        self.id.map(|id| self.config.step_url(self.slug(), id, step_slug))
    }

    /// Destino de una redirección a `step`: la URL del step, o la de creación
    /// si todavía no hay id.
    pub fn url_for(&self, step: StepRef<'_>) -> String {
        self.step_url(step.slug())
            .unwrap_or_else(|| self.config.create_url(self.slug()))
    }

    /// URL post-borrado según los hooks del tipo.
    pub fn redirect_to(&self) -> String {
        self.definition.hooks().redirect_to(&self.config)
    }

    pub fn summary(&self) -> WizardSummary {
        let steps = self.definition
                        .steps()
                        .map(|step| StepSummary { slug: step.slug().to_string(),
                                                  is_complete: step.step().is_complete(self),
                                                  name: step.name().to_string(),
                                                  active: step.index() == self.current_step,
                                                  url: self.step_url(step.slug()) })
                        .collect();
        WizardSummary { id: self.id,
                        slug: self.slug().to_string(),
                        title: self.title().to_string(),
                        cancel_text: self.definition.hooks().cancel_text(),
                        steps }
    }
}
