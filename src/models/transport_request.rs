//! Modelo de TransportRequest
//! 
//! Solicitud de recogida de un contacto para un evento. Mapea a la tabla
//! transport_requests junto con los datos del contacto y del conductor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la solicitud - mapea al ENUM transport_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "transport_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    Pending,
    Assigned,
    InTransit,
    Completed,
    Cancelled,
}

impl Default for TransportStatus {
    fn default() -> Self {
        TransportStatus::Pending
    }
}

/// Filtros de lectura masiva por estado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFilter {
    /// status = pending, sin conductor ni vehículo
    PendingUnassigned,
    /// status = assigned, con conductor y vehículo
    Assigned,
}

impl RequestFilter {
    pub fn matches(&self, request: &TransportRequest) -> bool {
        match self {
            RequestFilter::PendingUnassigned => {
                request.status == TransportStatus::Pending
                    && request.assigned_driver.is_none()
                    && request.assigned_vehicle.is_none()
            }
            RequestFilter::Assigned => {
                request.status == TransportStatus::Assigned
                    && request.assigned_driver.is_some()
                    && request.assigned_vehicle.is_some()
            }
        }
    }
}

/// Solicitud de transporte con los datos del contacto ya unidos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransportRequest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub contact_id: Option<Uuid>,
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub status: TransportStatus,
    #[serde(default)]
    pub assigned_driver: Option<Uuid>,
    #[serde(default)]
    pub assigned_vehicle: Option<Uuid>,
    /// Posición de la parada dentro de la carga del vehículo (1-based)
    #[serde(default)]
    pub assignment_order: Option<i32>,
    #[serde(default)]
    pub contact_first_name: Option<String>,
    #[serde(default)]
    pub contact_last_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TransportRequest {
    /// Nombre visible del pasajero
    pub fn passenger_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.contact_first_name, &self.contact_last_name]
            .iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// status = assigned ⇔ conductor y vehículo presentes
    pub fn assignment_is_consistent(&self) -> bool {
        (self.status == TransportStatus::Assigned)
            == (self.assigned_driver.is_some() && self.assigned_vehicle.is_some())
    }
}

/// Actualización de asignación para una solicitud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAssignment {
    pub request_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub sequence: i32,
}
