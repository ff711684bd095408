use thiserror::Error;
use wizard_core::{DefinitionError, WizardError};
use wizard_persistence::PersistenceError;

/// Errores de la aplicación.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Ruta no reconocida: {method} {path}")]
    NoRoute { method: String, path: String },
    #[error("Error de configuración: {0}")]
    Config(String),
}

impl AppError {
    /// Código HTTP equivalente.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Wizard(e) => e.status_code(),
            Self::NoRoute { .. } => 404,
            Self::Definition(_) | Self::Persistence(_) | Self::Config(_) => 500,
        }
    }
}
