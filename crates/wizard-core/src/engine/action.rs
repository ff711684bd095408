//! Superficie de rutas: acción + parámetros, independiente del framework.
//!
//! | método | ruta                           | acción  |
//! |--------|--------------------------------|---------|
//! | GET    | `{prefix}/{wizard}`            | create  |
//! | POST   | `{prefix}/{wizard}`            | store   |
//! | GET    | `{prefix}/{wizard}/{id}`       | show    |
//! | GET    | `{prefix}/{wizard}/{id}/{step}`| show    |
//! | POST   | `{prefix}/{wizard}/{id}/{step}`| update  |
//! | DELETE | `{prefix}/{wizard}/{id}`       | destroy |

use serde::{Deserialize, Serialize};

use crate::wizard::WizardId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    Create,
    Show { id: WizardId, step: Option<String> },
    Store,
    Update { id: WizardId, step: String },
    Destroy { id: WizardId },
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Show { .. } => "show",
            Self::Store => "store",
            Self::Update { .. } => "update",
            Self::Destroy { .. } => "destroy",
        }
    }

    /// Acciones que pueden modificar datos persistidos.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Store | Self::Update { .. } | Self::Destroy { .. })
    }
}

/// Traduce método + path a `(slug del wizard, acción)`. `None` si no matchea
/// ninguna ruta. `PUT`/`PATCH` se aceptan como `POST`.
pub fn parse_route(method: &str, path: &str, prefix: &str) -> Option<(String, WizardAction)> {
    let prefix = prefix.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.strip_prefix('/')?;
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let method = method.to_ascii_uppercase();
    let wizard = segments[0].to_string();
    let id = |raw: &str| raw.parse::<WizardId>().ok();

    let action = match (method.as_str(), segments.as_slice()) {
        ("GET", [_]) => WizardAction::Create,
        ("POST", [_]) => WizardAction::Store,
        ("GET", [_, raw]) => WizardAction::Show { id: id(*raw)?, step: None },
        ("GET", [_, raw, step]) => WizardAction::Show { id: id(*raw)?,
                                                        step: Some(step.to_string()) },
        ("POST" | "PUT" | "PATCH", [_, raw, step]) => WizardAction::Update { id: id(*raw)?,
                                                                            step: step.to_string() },
        ("DELETE", [_, raw]) => WizardAction::Destroy { id: id(*raw)? },
        _ => return None,
    };
    Some((wizard, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_route() {
        let p = "/wizard";
        assert_eq!(parse_route("GET", "/wizard/signup", p), Some(("signup".into(), WizardAction::Create)));
        assert_eq!(parse_route("post", "/wizard/signup/", p), Some(("signup".into(), WizardAction::Store)));
        assert_eq!(parse_route("GET", "/wizard/signup/3", p),
                   Some(("signup".into(), WizardAction::Show { id: 3, step: None })));
        assert_eq!(parse_route("GET", "/wizard/signup/3/profile", p),
                   Some(("signup".into(), WizardAction::Show { id: 3, step: Some("profile".into()) })));
        assert_eq!(parse_route("PUT", "/wizard/signup/3/profile", p),
                   Some(("signup".into(), WizardAction::Update { id: 3, step: "profile".into() })));
        assert_eq!(parse_route("DELETE", "/wizard/signup/3", p),
                   Some(("signup".into(), WizardAction::Destroy { id: 3 })));
    }

    #[test]
    fn rejects_unknown_shapes() {
        let p = "/wizard/";
        assert_eq!(parse_route("GET", "/other/signup", p), None);
        assert_eq!(parse_route("GET", "/wizard/signup/abc", p), None);
        assert_eq!(parse_route("DELETE", "/wizard/signup", p), None);
        assert_eq!(parse_route("GET", "/wizard//3", p), None);
        assert_eq!(parse_route("GET", "/wizardsignup", p), None);
    }

    #[test]
    fn mutation_flag() {
        assert!(WizardAction::Store.is_mutation());
        assert!(!WizardAction::Show { id: 1, step: None }.is_mutation());
        assert_eq!(WizardAction::Destroy { id: 1 }.name(), "destroy");
    }
}
