//! Constantes del core.
//!
//! Valores por defecto de rutas y textos. La plantilla de URL de un step es
//! fija: `{prefix}/{wizard_slug}/{id}/{step_slug}`.

/// Prefijo de rutas de wizards.
pub const DEFAULT_ROUTE_PREFIX: &str = "/wizard";

/// URL a la que se redirige tras completar o eliminar un wizard cuando el
/// tipo de wizard no define otra.
pub const DEFAULT_REDIRECT_URL: &str = "/";

/// Texto del botón de cancelación expuesto en el resumen.
pub const DEFAULT_CANCEL_TEXT: &str = "Cancel wizard";
