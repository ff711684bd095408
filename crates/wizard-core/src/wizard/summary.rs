use serde::{Deserialize, Serialize};

use super::WizardId;

/// Resumen serializable del wizard para la navegación de la vista.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSummary {
    pub id: Option<WizardId>,
    pub slug: String,
    pub title: String,
    pub cancel_text: String,
    pub steps: Vec<StepSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub slug: String,
    pub is_complete: bool,
    pub name: String,
    pub active: bool,
    /// `None` mientras el wizard no está persistido.
    pub url: Option<String>,
}

impl WizardSummary {
    pub fn active_step(&self) -> Option<&StepSummary> {
        self.steps.iter().find(|s| s.active)
    }
}
