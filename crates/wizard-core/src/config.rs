//! Configuración del core (independiente del origen: env, archivo, tests).

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REDIRECT_URL, DEFAULT_ROUTE_PREFIX};
use crate::wizard::WizardId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Destino tras eliminar (o completar) un wizard si el tipo no lo
    /// sobreescribe vía `WizardHooks::redirect_to`.
    pub default_redirect_url: String,
    /// Prefijo de las rutas públicas de wizards.
    pub route_prefix: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self { default_redirect_url: DEFAULT_REDIRECT_URL.to_string(),
               route_prefix: DEFAULT_ROUTE_PREFIX.to_string() }
    }
}

impl WizardConfig {
    pub fn new(default_redirect_url: impl Into<String>) -> Self {
        Self { default_redirect_url: default_redirect_url.into(),
               ..Self::default() }
    }

    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }

    fn prefix(&self) -> &str {
        self.route_prefix.trim_end_matches('/')
    }

    /// URL de un step de un wizard persistido.
    pub fn step_url(&self, wizard_slug: &str, id: WizardId, step_slug: &str) -> String {
        format!("{}/{}/{}/{}", self.prefix(), wizard_slug, id, step_slug)
    }

    /// URL de creación (wizard aún sin id).
    pub fn create_url(&self, wizard_slug: &str) -> String {
        format!("{}/{}", self.prefix(), wizard_slug)
    }
}
