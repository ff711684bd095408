//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`). Los valores mal formados caen a su default con un warning.
use std::env;

use log::warn;
use once_cell::sync::Lazy;
use wizard_core::constants::{DEFAULT_REDIRECT_URL, DEFAULT_ROUTE_PREFIX};
use wizard_core::WizardConfig;
use wizard_persistence::DbConfig;

/// Horas sin actualizar tras las cuales un wizard se considera abandonado.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Destino por defecto tras completar o eliminar un wizard.
    pub redirect_url: String,
    /// Prefijo de las rutas de wizards.
    pub route_prefix: String,
    /// TTL de wizards abandonados, en horas.
    pub ttl_hours: i64,
    /// Base de datos; `None` si `DATABASE_URL` no está definido.
    pub database: Option<DbConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { redirect_url: DEFAULT_REDIRECT_URL.to_string(),
               route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
               ttl_hours: DEFAULT_TTL_HOURS,
               database: None }
    }
}

impl AppConfig {
    /// Lee `WIZARD_REDIRECT_URL`, `WIZARD_ROUTE_PREFIX`, `WIZARD_TTL_HOURS` y
    /// la configuración de base de datos.
    pub fn from_env() -> Self {
        wizard_persistence::init_dotenv();
        let mut cfg = Self::from_lookup(|key| env::var(key).ok());
        cfg.database = DbConfig::from_env().ok();
        cfg
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria y sin
    /// base de datos.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let ttl_hours = match lookup("WIZARD_TTL_HOURS") {
            None => defaults.ttl_hours,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(h) if h > 0 => h,
                _ => {
                    warn!("WIZARD_TTL_HOURS inválido ({raw}), usando {}", defaults.ttl_hours);
                    defaults.ttl_hours
                }
            },
        };
        Self { redirect_url: lookup("WIZARD_REDIRECT_URL").unwrap_or(defaults.redirect_url),
               route_prefix: lookup("WIZARD_ROUTE_PREFIX").unwrap_or(defaults.route_prefix),
               ttl_hours,
               database: None }
    }

    /// Configuración del core derivada de esta.
    pub fn wizard_config(&self) -> WizardConfig {
        WizardConfig::new(self.redirect_url.clone()).with_route_prefix(self.route_prefix.clone())
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
