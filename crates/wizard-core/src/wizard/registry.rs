use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{DefinitionError, WizardError};

use super::definition::WizardDefinition;

/// Catálogo de tipos de wizard indexado por slug (lo que resuelve la capa de
/// rutas antes de despachar una acción).
#[derive(Debug, Default, Clone)]
pub struct WizardRegistry {
    definitions: HashMap<String, Arc<WizardDefinition>>,
}

impl WizardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: WizardDefinition) -> Result<Arc<WizardDefinition>, DefinitionError> {
        let slug = definition.slug().to_string();
        if self.definitions.contains_key(&slug) {
            return Err(DefinitionError::DuplicateWizard(slug));
        }
        let definition = Arc::new(definition);
        self.definitions.insert(slug, Arc::clone(&definition));
        Ok(definition)
    }

    pub fn get(&self, slug: &str) -> Option<Arc<WizardDefinition>> {
        self.definitions.get(slug).cloned()
    }

    pub fn resolve(&self, slug: &str) -> Result<Arc<WizardDefinition>, WizardError> {
        self.get(slug).ok_or_else(|| WizardError::UnknownWizard(slug.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Slugs registrados, ordenados.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}
