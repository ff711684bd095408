//! Tipos de evento del wizard y estructura `WizardEvent`.
//!
//! Puntos de emisión (contrato observable del engine):
//! - `WizardLoaded`: una vez por carga exitosa, inmediatamente después de leer.
//! - `WizardSaving`: una vez por guardado, antes de `before_saving` y de
//!   persistir.
//! - `WizardFinishing` / `WizardFinished`: rodean al hook `on_after_complete`,
//!   exactamente una vez por compleción.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wizard::WizardId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEventKind {
    WizardLoaded,
    WizardSaving { step_index: usize, step_slug: String },
    WizardFinishing { step_slug: String },
    WizardFinished { step_slug: String },
}

impl WizardEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WizardLoaded => "loaded",
            Self::WizardSaving { .. } => "saving",
            Self::WizardFinishing { .. } => "finishing",
            Self::WizardFinished { .. } => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardEvent {
    pub seq: u64, // asignado por el sink (orden de emisión)
    pub wizard: String,
    /// `None` si el wizard aún no fue persistido (p.ej. `saving` en `store`).
    pub wizard_id: Option<WizardId>,
    pub kind: WizardEventKind,
    pub ts: DateTime<Utc>,
}
