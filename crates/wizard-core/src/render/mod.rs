//! Frontera de presentación: convierte steps y wizards en respuestas.
//!
//! El core no conoce plantillas ni HTTP. `ResponseRenderer` recibe el step
//! resuelto y el estado del wizard y produce el tipo de respuesta del
//! adaptador. `JsonResponseRenderer` produce `WizardResponse`, serializable.

use serde::{Deserialize, Serialize};

use crate::step::StepRef;
use crate::wizard::{Wizard, WizardSummary};
use crate::DataMap;

pub trait ResponseRenderer {
    type Response;

    fn render_step(&self, step: StepRef<'_>, wizard: &Wizard<'_>, data: DataMap) -> Self::Response;

    /// Redirección a `step` del wizard.
    fn redirect(&self, step: StepRef<'_>, wizard: &Wizard<'_>) -> Self::Response;

    fn redirect_with_error(&self, step: StepRef<'_>, wizard: &Wizard<'_>, message: &str) -> Self::Response;

    /// Redirección a una URL arbitraria (post-borrado, post-compleción).
    fn redirect_to(&self, url: &str) -> Self::Response;

    /// Vista arbitraria devuelta por `on_after_complete`.
    fn render_view(&self, view: &str, data: DataMap) -> Self::Response;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardResponse {
    Render {
        step: String,
        index: usize,
        wizard: WizardSummary,
        data: DataMap,
    },
    Redirect {
        url: String,
    },
    RedirectWithError {
        url: String,
        error: String,
    },
    View {
        view: String,
        data: DataMap,
    },
}

impl WizardResponse {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. } | Self::RedirectWithError { .. })
    }

    /// URL destino si es una redirección.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect { url } | Self::RedirectWithError { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Slug del step si es un render de step.
    pub fn rendered_step(&self) -> Option<&str> {
        match self {
            Self::Render { step, .. } => Some(step),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::RedirectWithError { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponseRenderer;

impl ResponseRenderer for JsonResponseRenderer {
    type Response = WizardResponse;

    fn render_step(&self, step: StepRef<'_>, wizard: &Wizard<'_>, data: DataMap) -> WizardResponse {
        WizardResponse::Render { step: step.slug().to_string(),
                                 index: step.index(),
                                 wizard: wizard.summary(),
                                 data }
    }

    fn redirect(&self, step: StepRef<'_>, wizard: &Wizard<'_>) -> WizardResponse {
        WizardResponse::Redirect { url: wizard.url_for(step) }
    }

    fn redirect_with_error(&self, step: StepRef<'_>, wizard: &Wizard<'_>, message: &str) -> WizardResponse {
        WizardResponse::RedirectWithError { url: wizard.url_for(step),
                                            error: message.to_string() }
    }

    fn redirect_to(&self, url: &str) -> WizardResponse {
        WizardResponse::Redirect { url: url.to_string() }
    }

    fn render_view(&self, view: &str, data: DataMap) -> WizardResponse {
        WizardResponse::View { view: view.to_string(),
                               data }
    }
}
