//! Capa de aplicación: catálogo de wizards + engine.
//!
//! `dispatch` resuelve método y ruta a una acción (`parse_route`), busca el
//! tipo de wizard en el registro y la ejecuta. Todos los tipos comparten el
//! mismo engine, y por lo tanto el mismo repositorio y sink de eventos.

use std::sync::Arc;

use log::{debug, info};
use wizard_core::{parse_route, EventSink, JsonResponseRenderer, LoggingEventSink, WizardDefinition, WizardEngine,
                  WizardRegistry, WizardRepository, WizardRequest, WizardResponse};
use wizard_persistence::{build_pool, PgWizardRepository, PoolProvider};

use crate::config::AppConfig;
use crate::errors::app_error::AppError;

pub struct WizardApp<R, E = LoggingEventSink>
    where R: WizardRepository,
          E: EventSink
{
    engine: WizardEngine<R, E, JsonResponseRenderer>,
    registry: WizardRegistry,
    route_prefix: String,
}

impl<R> WizardApp<R> where R: WizardRepository
{
    /// App con eventos volcados al log.
    pub fn new(repository: R, config: &AppConfig) -> Self {
        Self::with_events(repository, LoggingEventSink::new(), config)
    }
}

impl WizardApp<PgWizardRepository<PoolProvider>> {
    /// App sobre Postgres según `config.database` (pool ya migrado).
    pub fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = config.database
                       .as_ref()
                       .ok_or_else(|| AppError::Config("DATABASE_URL no definido".into()))?;
        let pool = build_pool(&db.url, db.min_connections, db.max_connections)?;
        Ok(Self::new(PgWizardRepository::new(PoolProvider { pool }), config))
    }
}

impl<R, E> WizardApp<R, E>
    where R: WizardRepository,
          E: EventSink
{
    pub fn with_events(repository: R, events: E, config: &AppConfig) -> Self {
        let engine = WizardEngine::builder(repository).events(events)
                                                      .config(config.wizard_config())
                                                      .build();
        Self { engine,
               registry: WizardRegistry::new(),
               route_prefix: config.route_prefix.clone() }
    }

    pub fn register(&mut self, definition: WizardDefinition) -> Result<Arc<WizardDefinition>, AppError> {
        let definition = self.registry.register(definition)?;
        info!("registered wizard {} ({} steps)", definition.slug(), definition.len());
        Ok(definition)
    }

    pub fn registry(&self) -> &WizardRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &WizardEngine<R, E, JsonResponseRenderer> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut WizardEngine<R, E, JsonResponseRenderer> {
        &mut self.engine
    }

    /// Ejecuta el request `method path` sobre el wizard que indique la ruta.
    pub fn dispatch(&mut self, method: &str, path: &str, request: &WizardRequest) -> Result<WizardResponse, AppError> {
        let (slug, action) =
            parse_route(method, path, &self.route_prefix).ok_or_else(|| AppError::NoRoute { method: method.to_string(),
                                                                                            path: path.to_string() })?;
        let definition = self.registry.resolve(&slug)?;
        debug!("dispatch {} {} -> {} {}", method, path, slug, action.name());
        Ok(self.engine.handle(&definition, &action, request)?)
    }
}
