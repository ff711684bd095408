//! Personalización por tipo de wizard.

use serde::{Deserialize, Serialize};

use crate::config::WizardConfig;
use crate::constants::DEFAULT_CANCEL_TEXT;
use crate::errors::WizardError;
use crate::DataMap;

use super::instance::Wizard;

/// Qué hacer cuando se completa el último step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AfterComplete {
    RedirectTo(String),
    Render { view: String, data: DataMap },
}

/// Puntos de extensión de un tipo de wizard. Todos tienen implementación por
/// defecto; `DefaultHooks` no sobreescribe ninguno.
pub trait WizardHooks: Send + Sync {
    /// Se invoca entre `WizardFinishing` y `WizardFinished`.
    fn on_after_complete(&self, wizard: &Wizard<'_>) -> AfterComplete {
        AfterComplete::RedirectTo(self.redirect_to(wizard.config()))
    }

    /// Destino tras eliminar (y, por defecto, tras completar) el wizard.
    fn redirect_to(&self, config: &WizardConfig) -> String {
        config.default_redirect_url.clone()
    }

    /// Antes de borrar el registro. Un error aborta el borrado.
    fn before_delete(&self, _wizard: &Wizard<'_>) -> Result<(), WizardError> {
        Ok(())
    }

    fn cancel_text(&self) -> String {
        DEFAULT_CANCEL_TEXT.to_string()
    }

    /// Datos comunes a todas las vistas de steps; `view_data` del step se
    /// mezcla encima.
    fn shared_data(&self, _wizard: &Wizard<'_>) -> DataMap {
        DataMap::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl WizardHooks for DefaultHooks {}
