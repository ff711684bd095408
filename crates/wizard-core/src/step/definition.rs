use std::fmt;

use crate::errors::WizardError;
use crate::field::Field;
use crate::request::WizardRequest;
use crate::validation::{RuleSet, Validator};
use crate::wizard::Wizard;
use crate::DataMap;

use super::result::StepResult;

/// Trait que define un step de un wizard.
///
/// Un step no guarda referencia a su wizard: el estado del request llega como
/// `&Wizard` (o `&mut Wizard` en `before_saving`).
pub trait WizardStep: Send + Sync {
    /// Identificador estable y único dentro del wizard (usado en rutas).
    fn slug(&self) -> &str;

    /// Nombre visible.
    fn name(&self) -> &str {
        self.slug()
    }

    fn fields(&self) -> Vec<Field> {
        Vec::new()
    }

    /// Reglas de validación derivadas de los campos declarados.
    fn rules(&self) -> RuleSet {
        self.fields()
            .into_iter()
            .map(|f| (f.name().to_string(), f.validation_rules().to_vec()))
            .collect()
    }

    /// Valida el request contra `rules()`. Un fallo se propaga como
    /// `WizardError::InvalidInput` y corta el flujo antes de `process`.
    fn validate(&self, request: &WizardRequest, validator: &dyn Validator) -> Result<DataMap, WizardError> {
        validator.validate(request.input(), &self.rules())
                 .map_err(WizardError::InvalidInput)
    }

    /// Procesa el input ya validado. Por defecto devuelve `Success` con los
    /// valores de los campos declarados (transformados). Sobreescribir para
    /// rechazos de negocio (`StepResult::Failure`).
    fn process(&self, _request: &WizardRequest, validated: DataMap, _wizard: &Wizard<'_>) -> StepResult {
        StepResult::success(field_values(&self.fields(), validated))
    }

    /// Función pura de los datos almacenados del wizard.
    fn is_complete(&self, _wizard: &Wizard<'_>) -> bool {
        true
    }

    fn view_data(&self, _request: &WizardRequest, _wizard: &Wizard<'_>) -> DataMap {
        DataMap::new()
    }

    /// Hook previo a persistir; puede preparar datos extra con
    /// `wizard.set_data`.
    fn before_saving(&self, _request: &WizardRequest, _payload: &DataMap, _wizard: &mut Wizard<'_>) {}
}

/// Restringe `validated` a los campos declarados, aplicando el transformador
/// de cada uno. Los campos no enviados se omiten.
pub fn field_values(fields: &[Field], mut validated: DataMap) -> DataMap {
    let mut out = DataMap::new();
    for field in fields {
        if let Some(v) = validated.remove(field.name()) {
            out.insert(field.name().to_string(), field.value(v));
        }
    }
    out
}

/// Referencia a un step junto con su posición fija en el wizard.
#[derive(Clone, Copy)]
pub struct StepRef<'d> {
    index: usize,
    step: &'d dyn WizardStep,
}

impl<'d> StepRef<'d> {
    pub(crate) fn new(index: usize, step: &'d dyn WizardStep) -> Self {
        Self { index, step }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slug(&self) -> &'d str {
        self.step.slug()
    }

    pub fn name(&self) -> &'d str {
        self.step.name()
    }

    pub fn step(&self) -> &'d dyn WizardStep {
        self.step
    }
}

impl fmt::Debug for StepRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRef")
         .field("index", &self.index)
         .field("slug", &self.slug())
         .finish()
    }
}
