//! Persistencia de datos de wizards.
//!
//! El repositorio guarda un mapa de datos por `(wizard_type, id)`. El core no
//! conoce el formato de almacenamiento: sólo carga, guarda el mapa completo
//! (una única llamada por guardado) y elimina. Las llamadas son síncronas y
//! pueden bloquear.
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::errors::RepositoryError;
use crate::wizard::WizardId;
use crate::DataMap;

pub trait WizardRepository {
    /// Datos persistidos de un wizard. `NotFound` si no existe (o pertenece a
    /// otro tipo).
    fn load_data(&self, wizard_type: &str, id: WizardId) -> Result<DataMap, RepositoryError>;

    /// Crea (`id == None`) o sobreescribe el registro con `data` completo y
    /// devuelve el id resultante.
    fn save_data(&self, wizard_type: &str, id: Option<WizardId>, data: &DataMap) -> Result<WizardId, RepositoryError>;

    /// Elimina el registro. Eliminar un registro inexistente no es error.
    fn delete_wizard(&self, wizard_type: &str, id: WizardId) -> Result<(), RepositoryError>;
}

impl<R> WizardRepository for Arc<R> where R: WizardRepository + ?Sized
{
    fn load_data(&self, wizard_type: &str, id: WizardId) -> Result<DataMap, RepositoryError> {
        (**self).load_data(wizard_type, id)
    }

    fn save_data(&self, wizard_type: &str, id: Option<WizardId>, data: &DataMap) -> Result<WizardId, RepositoryError> {
        (**self).save_data(wizard_type, id, data)
    }

    fn delete_wizard(&self, wizard_type: &str, id: WizardId) -> Result<(), RepositoryError> {
        (**self).delete_wizard(wizard_type, id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredWizard {
    pub wizard_type: String,
    pub data: DataMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repositorio en memoria. Los ids se asignan en forma creciente desde 1.
#[derive(Debug)]
pub struct InMemoryWizardRepository {
    records: DashMap<WizardId, StoredWizard>,
    next_id: AtomicI64,
}

impl Default for InMemoryWizardRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWizardRepository {
    pub fn new() -> Self {
        Self { records: DashMap::new(),
               next_id: AtomicI64::new(1) }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: WizardId) -> bool {
        self.records.contains_key(&id)
    }

    /// Copia del registro (para inspección en tests/CLI).
    pub fn record(&self, id: WizardId) -> Option<StoredWizard> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    /// Elimina los registros no actualizados desde `cutoff`; devuelve cuántos.
    pub fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.updated_at >= cutoff);
        before - self.records.len()
    }
}

impl WizardRepository for InMemoryWizardRepository {
    fn load_data(&self, wizard_type: &str, id: WizardId) -> Result<DataMap, RepositoryError> {
        match self.records.get(&id) {
            Some(r) if r.wizard_type == wizard_type => Ok(r.data.clone()),
            _ => Err(RepositoryError::NotFound { wizard_type: wizard_type.to_string(),
                                                 id }),
        }
    }

    fn save_data(&self, wizard_type: &str, id: Option<WizardId>, data: &DataMap) -> Result<WizardId, RepositoryError> {
        let now = Utc::now();
        let id = match id {
            Some(id) => {
                // mantener el contador por encima de ids fijados externamente
                self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
                id
            }
            None => self.next_id
                        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
                        .map_err(|_| RepositoryError::Backend("wizard id space exhausted".into()))?,
        };
        match self.records.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.wizard_type != wizard_type {
                    return Err(RepositoryError::Backend(format!("wizard #{id} belongs to `{}`, not `{wizard_type}`",
                                                                record.wizard_type)));
                }
                record.data = data.clone();
                record.updated_at = now;
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(StoredWizard { wizard_type: wizard_type.to_string(),
                                           data: data.clone(),
                                           created_at: now,
                                           updated_at: now });
            }
        }
        Ok(id)
    }

    fn delete_wizard(&self, wizard_type: &str, id: WizardId) -> Result<(), RepositoryError> {
        self.records.remove_if(&id, |_, r| r.wizard_type == wizard_type);
        Ok(())
    }
}
