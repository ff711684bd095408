//! wizardflow
//!
//! Librería de aplicación sobre los crates del workspace:
//! - `config`: configuración global desde variables de entorno (.env).
//! - `errors`: error de aplicación que agrupa core y persistencia.
//! - `app`: catálogo de wizards + engine, con despacho por método/ruta.
//!
//! Re-exporta `wizard_core` y `wizard_persistence` para clientes que sólo
//! dependen de este crate.

pub mod app;
pub mod config;
pub mod errors;

pub use app::WizardApp;
pub use config::{AppConfig, CONFIG};
pub use errors::app_error::AppError;
pub use wizard_core;
pub use wizard_persistence;
