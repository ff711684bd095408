//! Core WizardEngine implementation

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::WizardConfig;
use crate::errors::WizardError;
use crate::event::{EventSink, InMemoryEventSink, WizardEventKind};
use crate::render::{JsonResponseRenderer, ResponseRenderer};
use crate::repo::{InMemoryWizardRepository, WizardRepository};
use crate::request::WizardRequest;
use crate::step::{invalidate_dependent_fields, StepRef, StepResult};
use crate::validation::Validator;
use crate::wizard::{AfterComplete, Wizard, WizardDefinition, WizardId};
use crate::DataMap;

use super::action::WizardAction;
use super::builder::EngineBuilder;

/// Orquestador de requests de wizards.
///
/// No guarda estado de wizards entre llamadas: cada acción reconstruye un
/// `Wizard` desde el repositorio. Las definiciones se pasan por referencia,
/// por lo que un mismo engine sirve a varios tipos de wizard.
pub struct WizardEngine<R, E, V>
    where R: WizardRepository,
          E: EventSink,
          V: ResponseRenderer
{
    repository: R,
    events: E,
    renderer: V,
    validator: Box<dyn Validator>,
    config: Arc<WizardConfig>,
}

impl WizardEngine<InMemoryWizardRepository, InMemoryEventSink, JsonResponseRenderer> {
    /// Engine con repositorio y eventos en memoria.
    pub fn in_memory() -> Self {
        EngineBuilder::new(InMemoryWizardRepository::new()).build()
    }
}

impl<R> WizardEngine<R, InMemoryEventSink, JsonResponseRenderer> where R: WizardRepository
{
    #[inline]
    pub fn builder(repository: R) -> EngineBuilder<R> {
        EngineBuilder::new(repository)
    }
}

impl<R, E, V> WizardEngine<R, E, V>
    where R: WizardRepository,
          E: EventSink,
          V: ResponseRenderer
{
    pub fn new(repository: R, events: E, renderer: V) -> Self {
        Self::from_parts(repository,
                         events,
                         renderer,
                         Box::new(crate::validation::RuleValidator),
                         Arc::new(WizardConfig::default()))
    }

    pub(crate) fn from_parts(repository: R,
                             events: E,
                             renderer: V,
                             validator: Box<dyn Validator>,
                             config: Arc<WizardConfig>)
                             -> Self {
        Self { repository,
               events,
               renderer,
               validator,
               config }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Wizard vacío (sin id) ligado a la configuración del engine.
    pub fn fresh<'d>(&self, definition: &'d WizardDefinition) -> Wizard<'d> {
        Wizard::with_config(definition, Arc::clone(&self.config))
    }

    /// Carga un wizard persistido y emite `WizardLoaded`.
    pub fn load<'d>(&mut self, definition: &'d WizardDefinition, id: WizardId) -> Result<Wizard<'d>, WizardError> {
        debug!("loading wizard {} #{}", definition.slug(), id);
        let data = self.repository.load_data(definition.slug(), id)?;
        let wizard = Wizard::restore(definition, Arc::clone(&self.config), id, data);
        self.emit(&wizard, WizardEventKind::WizardLoaded);
        Ok(wizard)
    }

    /// Muestra el primer step de un wizard nuevo.
    pub fn create(&mut self, definition: &WizardDefinition, request: &WizardRequest) -> Result<V::Response, WizardError> {
        let wizard = self.fresh(definition);
        debug!("create {}", definition.slug());
        Ok(self.render(&wizard, definition.first_step(), request))
    }

    /// Sin slug: redirige al step siguiente al último completo. Con slug:
    /// renderiza ese step.
    pub fn show(&mut self,
                definition: &WizardDefinition,
                request: &WizardRequest,
                id: WizardId,
                slug: Option<&str>)
                -> Result<V::Response, WizardError> {
        let mut wizard = self.load(definition, id)?;

        let Some(slug) = slug else {
            let target = next_step_index(&wizard);
            wizard.set_current_step(target);
            let step = wizard.current_step();
            debug!("show {} #{} -> redirect to {}", definition.slug(), id, step.slug());
            return Ok(self.renderer.redirect(step, &wizard));
        };

        let step = definition.resolve(slug)?;
        wizard.set_current_step(step.index());
        Ok(self.render(&wizard, step, request))
    }

    /// Procesa el primer step de un wizard nuevo.
    pub fn store(&mut self, definition: &WizardDefinition, request: &WizardRequest) -> Result<V::Response, WizardError> {
        let mut wizard = self.fresh(definition);
        info!("store {}", definition.slug());
        self.process_step(&mut wizard, definition.first_step(), request)
    }

    /// Procesa el step `slug` de un wizard existente.
    pub fn update(&mut self,
                  definition: &WizardDefinition,
                  request: &WizardRequest,
                  id: WizardId,
                  slug: &str)
                  -> Result<V::Response, WizardError> {
        let mut wizard = self.load(definition, id)?;
        let step = definition.resolve(slug)?;
        info!("update {} #{} step {}", definition.slug(), id, step.slug());
        self.process_step(&mut wizard, step, request)
    }

    /// Elimina el wizard. La ausencia del registro se tolera.
    pub fn destroy(&mut self,
                   definition: &WizardDefinition,
                   _request: &WizardRequest,
                   id: WizardId)
                   -> Result<V::Response, WizardError> {
        let wizard = match self.load(definition, id) {
            Ok(wizard) => wizard,
            Err(WizardError::WizardNotFound { .. }) => {
                warn!("destroy {} #{}: record not found, deleting anyway", definition.slug(), id);
                self.fresh(definition)
            }
            Err(e) => return Err(e),
        };

        definition.hooks().before_delete(&wizard)?;
        self.repository.delete_wizard(definition.slug(), id)?;
        info!("destroyed {} #{}", definition.slug(), id);
        Ok(self.renderer.redirect_to(&wizard.redirect_to()))
    }

    /// Despacha una acción de la capa de rutas.
    pub fn handle(&mut self,
                  definition: &WizardDefinition,
                  action: &WizardAction,
                  request: &WizardRequest)
                  -> Result<V::Response, WizardError> {
        match action {
            WizardAction::Create => self.create(definition, request),
            WizardAction::Show { id, step } => self.show(definition, request, *id, step.as_deref()),
            WizardAction::Store => self.store(definition, request),
            WizardAction::Update { id, step } => self.update(definition, request, *id, step),
            WizardAction::Destroy { id } => self.destroy(definition, request, *id),
        }
    }

    /// process -> save -> advance (o compleción en el último step).
    fn process_step<'d>(&mut self,
                        wizard: &mut Wizard<'d>,
                        step: StepRef<'d>,
                        request: &WizardRequest)
                        -> Result<V::Response, WizardError> {
        let definition = wizard.definition();
        wizard.set_current_step(step.index());

        let validated = step.step()
                            .validate(request, self.validator.as_ref())
                            .inspect_err(|e| debug!("step {} rejected input: {}", step.slug(), e))?;

        let payload = match step.step().process(request, validated, wizard) {
            StepResult::Success(payload) => payload,
            StepResult::Failure(message) => {
                warn!("step {} of {} failed: {}", step.slug(), definition.slug(), message);
                return Ok(self.renderer.redirect_with_error(definition.first_step(), wizard, &message));
            }
        };

        self.save(wizard, step, request, payload)?;

        if definition.is_last(step.index()) {
            return Ok(self.complete(wizard, step));
        }

        let next = definition.step(step.index() + 1)
                             .ok_or_else(|| WizardError::Internal(format!("no step after {}", step.slug())))?;
        Ok(self.renderer.redirect(next, wizard))
    }

    /// saving -> before_saving -> invalidación -> merge -> persistencia.
    fn save(&mut self,
            wizard: &mut Wizard<'_>,
            step: StepRef<'_>,
            request: &WizardRequest,
            payload: DataMap)
            -> Result<(), WizardError> {
        let definition = wizard.definition();
        self.emit(wizard,
                  WizardEventKind::WizardSaving { step_index: step.index(),
                                                  step_slug: step.slug().to_string() });

        step.step().before_saving(request, &payload, wizard);

        let removed = invalidate_dependent_fields(definition.fields(), &payload, wizard.stored_data_mut());
        if !removed.is_empty() {
            info!("invalidated dependent fields of {}: {:?}", definition.slug(), removed);
        }

        let mut merged = wizard.stored_data().clone();
        merged.extend(payload);
        merged.extend(wizard.additional_data().clone());

        let id = self.repository.save_data(definition.slug(), wizard.id(), &merged)?;
        debug!("saved {} #{} ({} keys)", definition.slug(), id, merged.len());
        wizard.commit(id, merged);
        Ok(())
    }

    /// finishing -> on_after_complete -> finished.
    fn complete(&mut self, wizard: &Wizard<'_>, step: StepRef<'_>) -> V::Response {
        self.emit(wizard,
                  WizardEventKind::WizardFinishing { step_slug: step.slug().to_string() });
        let outcome = wizard.definition().hooks().on_after_complete(wizard);
        self.emit(wizard,
                  WizardEventKind::WizardFinished { step_slug: step.slug().to_string() });
        info!("completed {} #{:?}", wizard.slug(), wizard.id());

        match outcome {
            AfterComplete::RedirectTo(url) => self.renderer.redirect_to(&url),
            AfterComplete::Render { view, data } => self.renderer.render_view(&view, data),
        }
    }

    /// Renderiza un step con `shared_data` de los hooks y `view_data` del step
    /// encima.
    fn render(&self, wizard: &Wizard<'_>, step: StepRef<'_>, request: &WizardRequest) -> V::Response {
        let mut data = wizard.definition().hooks().shared_data(wizard);
        data.extend(step.step().view_data(request, wizard));
        self.renderer.render_step(step, wizard, data)
    }

    fn emit(&mut self, wizard: &Wizard<'_>, kind: WizardEventKind) {
        self.events.emit(wizard.slug(), wizard.id(), kind);
    }
}

/// Índice al que redirige `show` sin slug: el siguiente al último step
/// completo, 0 si ninguno lo está, el último si el último está completo.
fn next_step_index(wizard: &Wizard<'_>) -> usize {
    let definition = wizard.definition();
    definition.steps()
              .filter(|s| s.step().is_complete(wizard))
              .map(|s| s.index())
              .last()
              .map_or(0, |i| (i + 1).min(definition.last_index()))
}
