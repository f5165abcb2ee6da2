//! Interfaz del almacén de transporte
//!
//! Lectura, actualización, inserción y borrado masivos por evento sobre
//! solicitudes, conductores de evento y rutas.

use crate::models::{
    DriverVehiclePair, EventInfo, NewTransportRoute, RequestAssignment, RequestFilter,
    RouteWithDriver, TransportRequest, TransportRoute,
};
use crate::utils::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait TransportStore: Send + Sync {
    /// Pares conductor/vehículo con estado assigned o confirmed
    async fn find_event_drivers(&self, event_id: Uuid) -> AppResult<Vec<DriverVehiclePair>>;

    /// Solicitudes del evento que cumplen el filtro, por orden de creación
    async fn find_requests(
        &self,
        event_id: Uuid,
        filter: RequestFilter,
    ) -> AppResult<Vec<TransportRequest>>;

    /// Asignar conductor, vehículo y orden en una sola escritura.
    /// Solo toca solicitudes aún pendientes; si no toca nada devuelve Conflict.
    async fn assign_request(&self, assignment: &RequestAssignment) -> AppResult<()>;

    /// Borrar solicitudes por id, devuelve cuántas se borraron
    async fn delete_requests(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// Devolver todas las solicitudes del evento a pending sin conductor ni vehículo.
    /// Cuenta solo las filas que cambiaron.
    async fn reset_requests(&self, event_id: Uuid) -> AppResult<u64>;

    async fn delete_routes(&self, event_id: Uuid) -> AppResult<u64>;

    /// Insertar rutas, todo o nada
    async fn insert_routes(&self, routes: Vec<NewTransportRoute>) -> AppResult<Vec<TransportRoute>>;

    async fn find_routes(&self, event_id: Uuid) -> AppResult<Vec<RouteWithDriver>>;

    async fn find_event(&self, event_id: Uuid) -> AppResult<Option<EventInfo>>;
}
