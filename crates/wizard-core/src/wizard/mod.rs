//! Wizards: definición compartida, estado por request y catálogo.
//!
//! - `WizardDefinition`: lista fija de steps + índice por slug + hooks.
//! - `Wizard`: id, datos persistidos, datos adicionales y step actual.
//! - `WizardHooks`: personalización por tipo (redirecciones, borrado, vistas).
//! - `WizardRegistry`: resuelve tipos de wizard por slug.

mod definition;
mod hooks;
mod instance;
mod registry;
mod summary;

pub use definition::{WizardBuilder, WizardDefinition};
pub use hooks::{AfterComplete, DefaultHooks, WizardHooks};
pub use instance::Wizard;
pub use registry::WizardRegistry;
pub use summary::{StepSummary, WizardSummary};

/// Identificador numérico asignado por el repositorio.
pub type WizardId = i64;
