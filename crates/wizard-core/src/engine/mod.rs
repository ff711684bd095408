//! Engine de wizards.
//!
//! `WizardEngine` orquesta las cinco acciones públicas (create, show, store,
//! update, destroy) sobre una `WizardDefinition`: carga datos del
//! repositorio, resuelve el step por slug, delega el procesamiento al step,
//! guarda (con invalidación de dependientes) y decide la respuesta.

pub mod action;
pub mod builder;
pub mod core;

pub use self::core::WizardEngine;
pub use action::{parse_route, WizardAction};
pub use builder::EngineBuilder;
