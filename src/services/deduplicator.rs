//! Deduplicación de solicitudes por contacto
//!
//! Un contacto solo puede ocupar un asiento por evento: si tiene varias
//! solicitudes pendientes, gana la primera y el resto se marca para borrar.

use crate::models::TransportRequest;
use std::collections::HashSet;
use uuid::Uuid;

/// Resultado de deduplicar un lote de solicitudes
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    pub unique: Vec<TransportRequest>,
    pub duplicate_ids: Vec<Uuid>,
}

/// Clave de identidad del contacto (nombre, apellido, id del contacto)
type ContactKey = (Option<String>, Option<String>, Option<Uuid>);

fn contact_key(request: &TransportRequest) -> ContactKey {
    (
        request.contact_first_name.clone(),
        request.contact_last_name.clone(),
        request.contact_id,
    )
}

/// Quedarse con la primera solicitud de cada contacto
pub fn deduplicate(requests: Vec<TransportRequest>) -> Deduplicated {
    let mut seen: HashSet<ContactKey> = HashSet::with_capacity(requests.len());
    let mut result = Deduplicated::default();

    for request in requests {
        if seen.insert(contact_key(&request)) {
            result.unique.push(request);
        } else {
            tracing::warn!(
                "⚠️ Contacto duplicado: {} (se elimina la solicitud {})",
                request.passenger_name().unwrap_or_else(|| "sin nombre".to_string()),
                request.id
            );
            result.duplicate_ids.push(request.id);
        }
    }

    result
}
