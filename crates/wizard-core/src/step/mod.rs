//! Definiciones relacionadas a Steps.
//!
//! Un step valida y transforma su porción del input, decide si está completo
//! a partir de los datos almacenados y puede preparar datos adicionales antes
//! del guardado. Este módulo define:
//! - `WizardStep`: interfaz usada por el engine.
//! - `StepRef`: step + índice fijo dentro del wizard.
//! - `StepResult`: éxito con payload o rechazo con mensaje.
//! - la invalidación de campos dependientes.

mod definition;
mod invalidation;
mod result;

pub use definition::{field_values, StepRef, WizardStep};
pub use invalidation::{changed_fields, invalidate_dependent_fields};
pub use result::StepResult;
