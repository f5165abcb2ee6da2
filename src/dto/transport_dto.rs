use crate::models::TransportRoute;
use crate::services::assignment_engine::{Assignment, VehicleLoad};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_uuid;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Body común de las operaciones por evento
#[derive(Debug, Deserialize, Validate)]
pub struct EventTransportRequest {
    #[serde(rename = "eventId")]
    #[validate(required(message = "eventId is required"), custom = "validate_uuid")]
    pub event_id: Option<String>,
}

impl EventTransportRequest {
    pub fn new(event_id: Uuid) -> Self {
        Self {
            event_id: Some(event_id.to_string()),
        }
    }

    /// Validar el body y devolver el id del evento
    pub fn event_id(&self) -> AppResult<Uuid> {
        self.validate()?;
        let raw = self.event_id.as_deref().unwrap_or_default();
        Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::BadRequest(format!("Invalid eventId: {}", raw)))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignSummary {
    pub total_requests: usize,
    pub unique_contacts: usize,
    pub duplicates_removed: u64,
    pub assigned_requests: usize,
    pub vehicles_used: usize,
    pub total_capacity: u32,
    pub remaining_capacity: u32,
    /// Solicitudes que no cupieron (quedan pendientes)
    pub unassigned_requests: usize,
    /// Escrituras de asignación que fallaron
    pub failed_updates: usize,
    pub failed_request_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignResponse {
    pub success: bool,
    pub message: String,
    pub assignments: Vec<Assignment>,
    /// Carga final por vehículo
    pub vehicles: Vec<VehicleLoad>,
    pub summary: AutoAssignSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoutesSummary {
    pub routes_generated: usize,
    pub drivers_assigned: usize,
    pub total_stops: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoutesResponse {
    pub success: bool,
    pub message: String,
    pub routes: Vec<TransportRoute>,
    pub summary: GenerateRoutesSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub reset_requests: u64,
    pub routes_cleared: bool,
}

// Resultado del envío de una ruta
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDispatchResult {
    pub driver_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRoutesResponse {
    pub success: bool,
    pub message: String,
    pub total_routes: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub results: Vec<RouteDispatchResult>,
}
