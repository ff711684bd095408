//! Invalidación de campos dependientes.
//!
//! Para cada campo `f` con `depends_on = {d1..dn}`: si el payload enviado
//! contiene algún `di` cuyo valor nuevo difiere del valor almacenado, se
//! elimina `f` de los datos almacenados. Se compara contra los valores previos
//! a la actualización y se aplica un único nivel (sin cascada transitiva).

use crate::field::Field;
use crate::DataMap;

/// Nombres del payload cuyo valor difiere del almacenado (incluye claves que
/// no existían).
pub fn changed_fields<'p>(payload: &'p DataMap, stored: &DataMap) -> Vec<&'p str> {
    payload.iter()
           .filter(|(k, v)| stored.get(k.as_str()) != Some(*v))
           .map(|(k, _)| k.as_str())
           .collect()
}

/// Elimina de `stored` los campos invalidados por `payload` y devuelve sus
/// nombres en orden de declaración.
pub fn invalidate_dependent_fields<'f, I>(fields: I, payload: &DataMap, stored: &mut DataMap) -> Vec<String>
    where I: IntoIterator<Item = &'f Field>
{
    // Se calcula antes de tocar `stored`: la línea base es el estado previo.
    let changed: Vec<String> = changed_fields(payload, stored).into_iter().map(str::to_string).collect();
    if changed.is_empty() {
        return Vec::new();
    }

    let mut removed = Vec::new();
    for field in fields {
        if field.should_invalidate(changed.iter().map(String::as_str)) && stored.remove(field.name()).is_some() {
            removed.push(field.name().to_string());
        }
    }
    removed
}
