//! wizard-core: máquina de estados de wizards multi-paso.
//!
//! Un wizard secuencia una lista fija de steps, persiste la entrada parcial
//! entre requests, valida/transforma cada envío y emite eventos de ciclo de
//! vida. Cada request construye un `Wizard` nuevo a partir de una
//! `WizardDefinition` inmutable; el `WizardEngine` orquesta las cinco
//! acciones (create/show/store/update/destroy).
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod field;
pub mod render;
pub mod repo;
pub mod request;
pub mod step;
pub mod validation;
pub mod wizard;

pub use config::WizardConfig;
pub use engine::{parse_route, EngineBuilder, WizardAction, WizardEngine};
pub use errors::{DefinitionError, FieldErrors, RepositoryError, WizardError};
pub use event::{EventSink, InMemoryEventSink, LoggingEventSink, ObserverSink, WizardEvent, WizardEventKind};
pub use field::Field;
pub use render::{JsonResponseRenderer, ResponseRenderer, WizardResponse};
pub use repo::{InMemoryWizardRepository, StoredWizard, WizardRepository};
pub use request::WizardRequest;
pub use step::{field_values, StepRef, StepResult, WizardStep};
pub use validation::{Rule, RuleSet, RuleValidator, Validator};
pub use wizard::{AfterComplete, DefaultHooks, StepSummary, Wizard, WizardBuilder, WizardDefinition, WizardHooks, WizardId,
                 WizardRegistry, WizardSummary};

/// Alias del mapa de datos de un wizard (clave -> valor JSON arbitrario).
pub type DataMap = serde_json::Map<String, serde_json::Value>;
