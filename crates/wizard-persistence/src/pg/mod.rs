//! Implementación Postgres (Diesel) de `WizardRepository`.
//!
//! - Un registro por wizard en `wizards`: `data` guarda el mapa completo como
//!   JSONB y se sobreescribe entero en cada guardado (una transacción).
//! - `id` es BIGSERIAL: `save_data(.., None, ..)` inserta y devuelve el id
//!   asignado; con `Some(id)` actualiza o, si no existe, inserta con ese id
//!   y adelanta la secuencia para que los ids generados no choquen.
//! - Errores transitorios (pool, serialización, desconexión) se reintentan con
//!   backoff corto.
//! - `purge_expired` elimina wizards abandonados (sin actualizar desde un
//!   instante dado).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sql_types::BigInt;
use log::{debug, warn};
use serde_json::Value;

use wizard_core::{DataMap, RepositoryError, WizardId, WizardRepository};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::wizards;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Al construirlo (`build_pool`) se corren las migraciones pendientes una
/// sola vez.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Contrato: devuelve una conexión válida o `PersistenceError::TransientIo`.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila mapeada de la tabla `wizards`.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = wizards)]
pub struct WizardRow {
    pub id: i64,
    pub wizard_type: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = wizards)]
struct NewWizardRow<'a> {
    wizard_type: &'a str,
    data: &'a Value,
}

/// Lleva la secuencia de `wizards.id` al menos hasta `$1`, sin retroceder.
const ADVANCE_ID_SEQUENCE: &str =
    "SELECT setval('wizards_id_seq', GREATEST($1, (SELECT last_value FROM wizards_id_seq)))";

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff lineal (hasta 3 reintentos: 15ms, 30ms, 45ms).
/// Sólo repite la unidad de trabajo provista por `f`.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Repositorio Postgres de wizards.
pub struct PgWizardRepository<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgWizardRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fila completa (con timestamps) de un wizard, si existe.
    pub fn find(&self, wizard_type: &str, id: WizardId) -> Result<Option<WizardRow>, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            wizards::table.filter(wizards::id.eq(id))
                          .filter(wizards::wizard_type.eq(wizard_type))
                          .select(WizardRow::as_select())
                          .first(&mut conn)
                          .optional()
                          .map_err(PersistenceError::from)
        })
    }

    /// Wizards más recientemente actualizados (opcionalmente de un tipo).
    pub fn recent(&self, wizard_type: Option<&str>, limit: i64) -> Result<Vec<WizardRow>, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            let mut query = wizards::table.select(WizardRow::as_select()).into_boxed();
            if let Some(t) = wizard_type {
                query = query.filter(wizards::wizard_type.eq(t));
            }
            query.order(wizards::updated_at.desc())
                 .limit(limit)
                 .load(&mut conn)
                 .map_err(PersistenceError::from)
        })
    }

    /// Elimina los wizards (opcionalmente de un tipo) sin actualizar desde
    /// `older_than`; devuelve cuántos.
    pub fn purge_expired(&self, wizard_type: Option<&str>, older_than: DateTime<Utc>) -> Result<usize, PersistenceError> {
        debug!("purge_expired:start type={wizard_type:?} older_than={older_than}");
        let deleted = with_retry(|| {
            let mut conn = self.provider.connection()?;
            let expired = wizards::table.filter(wizards::updated_at.lt(older_than));
            match wizard_type {
                Some(t) => diesel::delete(expired.filter(wizards::wizard_type.eq(t))).execute(&mut conn),
                None => diesel::delete(expired).execute(&mut conn),
            }.map_err(PersistenceError::from)
        })?;
        debug!("purge_expired:done deleted={deleted}");
        Ok(deleted)
    }

    fn save(&self, wizard_type: &str, id: Option<WizardId>, payload: &Value) -> Result<WizardId, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| match id {
                    Some(id) => {
                        let updated = diesel::update(wizards::table.filter(wizards::id.eq(id))
                                                                   .filter(wizards::wizard_type.eq(wizard_type)))
                                      .set((wizards::data.eq(payload), wizards::updated_at.eq(Utc::now())))
                                      .execute(tx_conn)?;
                        if updated == 0 {
                            // id fijado externamente: se crea con ese id y la
                            // secuencia avanza hasta él
                            diesel::insert_into(wizards::table).values((wizards::id.eq(id),
                                                                        wizards::wizard_type.eq(wizard_type),
                                                                        wizards::data.eq(payload)))
                                                               .execute(tx_conn)?;
                            diesel::sql_query(ADVANCE_ID_SEQUENCE).bind::<BigInt, _>(id)
                                                                  .execute(tx_conn)?;
                        }
                        Ok::<WizardId, diesel::result::Error>(id)
                    }
                    None => diesel::insert_into(wizards::table).values(NewWizardRow { wizard_type,
                                                                                      data: payload })
                                                               .returning(wizards::id)
                                                               .get_result(tx_conn),
                })
                .map_err(PersistenceError::from)
        })
    }
}

impl<P: ConnectionProvider> WizardRepository for PgWizardRepository<P> {
    fn load_data(&self, wizard_type: &str, id: WizardId) -> Result<DataMap, RepositoryError> {
        debug!("load_data:start type={wizard_type} id={id}");
        let data: Option<Value> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            wizards::table.filter(wizards::id.eq(id))
                          .filter(wizards::wizard_type.eq(wizard_type))
                          .select(wizards::data)
                          .first(&mut conn)
                          .optional()
                          .map_err(PersistenceError::from)
        })?;
        match data {
            Some(Value::Object(map)) => Ok(map),
            Some(other) => Err(RepositoryError::Corrupt(format!("wizard #{id} data is not an object: {other}"))),
            None => Err(RepositoryError::NotFound { wizard_type: wizard_type.to_string(),
                                                    id }),
        }
    }

    fn save_data(&self, wizard_type: &str, id: Option<WizardId>, data: &DataMap) -> Result<WizardId, RepositoryError> {
        let payload = Value::Object(data.clone());
        let saved = self.save(wizard_type, id, &payload)?;
        debug!("save_data:done type={wizard_type} id={saved} keys={}", data.len());
        Ok(saved)
    }

    fn delete_wizard(&self, wizard_type: &str, id: WizardId) -> Result<(), RepositoryError> {
        let deleted = with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::delete(wizards::table.filter(wizards::id.eq(id))
                                         .filter(wizards::wizard_type.eq(wizard_type))).execute(&mut conn)
                                                                                       .map_err(PersistenceError::from)
        })?;
        debug!("delete_wizard:done type={wizard_type} id={id} deleted={deleted}");
        Ok(())
    }
}

/// Construye un pool r2d2 y corre las migraciones pendientes.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        warn!("min_size > max_size ({} > {}), ajustando min=max",
              validated_min, validated_max);
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
