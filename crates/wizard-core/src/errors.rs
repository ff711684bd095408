//! Errores del core.
//!
//! `WizardError` es lo que ve la frontera (HTTP, CLI). `StepResult::Failure`
//! NO es un error: es un rechazo de negocio esperado que se resuelve con una
//! redirección.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wizard::WizardId;

/// Errores de validación por campo, en orden de declaración.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cantidad de campos con al menos un error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0
                                     .iter()
                                     .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                                     .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errores reportados por un `WizardRepository`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositoryError {
    #[error("wizard `{wizard_type}` #{id} not found")]
    NotFound { wizard_type: String, id: WizardId },
    #[error("stored wizard data is corrupt: {0}")]
    Corrupt(String),
    #[error("repository backend error: {0}")]
    Backend(String),
}

/// Errores de construcción de una `WizardDefinition` (fail-fast).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("wizard `{0}` declares no steps")]
    NoSteps(String),
    #[error("duplicate step slug `{0}`")]
    DuplicateSlug(String),
    #[error("wizard `{0}` is already registered")]
    DuplicateWizard(String),
    #[error("field `{0}` depends on itself")]
    SelfDependency(String),
    #[error("dependency cycle between fields: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WizardError {
    #[error("wizard `{0}` is not registered")]
    UnknownWizard(String),
    #[error("step `{slug}` does not exist in wizard `{wizard}`")]
    UnknownStep { wizard: String, slug: String },
    #[error("wizard `{wizard}` #{id} not found")]
    WizardNotFound { wizard: String, id: WizardId },
    #[error("invalid input: {0}")]
    InvalidInput(FieldErrors),
    #[error(transparent)]
    Repository(RepositoryError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<RepositoryError> for WizardError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { wizard_type, id } => Self::WizardNotFound { wizard: wizard_type, id },
            other => Self::Repository(other),
        }
    }
}

impl WizardError {
    /// Código de estado HTTP equivalente, para la traducción en la frontera.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownWizard(_) | Self::UnknownStep { .. } | Self::WizardNotFound { .. } => 404,
            Self::InvalidInput(_) => 422,
            Self::Repository(_) | Self::Definition(_) | Self::Internal(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::InvalidInput(errors) => Some(errors),
            _ => None,
        }
    }
}
