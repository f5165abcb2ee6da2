//! Almacén de transporte en memoria
//!
//! Backend para desarrollo (con semilla JSON opcional) y doble de pruebas.
//! Permite inyectar fallos de escritura para ejercitar los lotes parciales.

use crate::models::{
    DriverVehiclePair, EventInfo, NewTransportRoute, RequestAssignment, RequestFilter,
    RouteWithDriver, TransportRequest, TransportRoute, TransportStatus,
};
use crate::repositories::transport_store::TransportStore;
use crate::utils::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Conductor confirmado para un evento
#[derive(Debug, Clone, Deserialize)]
pub struct EventDriverRecord {
    pub event_id: Uuid,
    #[serde(default = "default_event_driver_status")]
    pub status: String,
    #[serde(flatten)]
    pub pair: DriverVehiclePair,
}

fn default_event_driver_status() -> String {
    "confirmed".to_string()
}

/// Contenido de un archivo de semilla
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub events: Vec<EventInfo>,
    #[serde(default)]
    pub event_drivers: Vec<EventDriverRecord>,
    #[serde(default)]
    pub requests: Vec<TransportRequest>,
}

#[derive(Default)]
struct Tables {
    events: HashMap<Uuid, EventInfo>,
    event_drivers: Vec<EventDriverRecord>,
    requests: Vec<TransportRequest>,
    routes: Vec<TransportRoute>,
    failing_assignments: HashSet<Uuid>,
    fail_route_deletes: bool,
}

impl Tables {
    /// Pares del evento
    fn pairs_for(&self, event_id: Uuid) -> impl Iterator<Item = &DriverVehiclePair> {
        self.event_drivers
            .iter()
            .filter(move |record| record.event_id == event_id)
            .map(|record| &record.pair)
    }

    fn driver(&self, event_id: Uuid, driver_id: Uuid) -> Option<&DriverVehiclePair> {
        self.pairs_for(event_id).find(|pair| pair.driver_id == driver_id)
    }

    fn vehicle(&self, event_id: Uuid, vehicle_id: Uuid) -> Option<&DriverVehiclePair> {
        self.pairs_for(event_id).find(|pair| pair.vehicle_id == vehicle_id)
    }
}

#[derive(Default)]
pub struct InMemoryTransportStore {
    tables: RwLock<Tables>,
}

impl InMemoryTransportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let tables = Tables {
            events: seed.events.into_iter().map(|event| (event.id, event)).collect(),
            event_drivers: seed.event_drivers,
            requests: seed.requests,
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Cargar la semilla desde un archivo JSON
    pub fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        log::info!(
            "🌱 Semilla cargada: {} eventos, {} conductores, {} solicitudes",
            seed.events.len(),
            seed.event_drivers.len(),
            seed.requests.len()
        );
        Ok(Self::from_seed(seed))
    }

    pub async fn insert_event(&self, event: EventInfo) {
        self.tables.write().await.events.insert(event.id, event);
    }

    pub async fn insert_event_driver(&self, event_id: Uuid, status: &str, pair: DriverVehiclePair) {
        self.tables.write().await.event_drivers.push(EventDriverRecord {
            event_id,
            status: status.to_string(),
            pair,
        });
    }

    pub async fn insert_request(&self, request: TransportRequest) {
        self.tables.write().await.requests.push(request);
    }

    /// Hacer fallar la asignación de una solicitud concreta
    pub async fn fail_assignment_for(&self, request_id: Uuid) {
        self.tables.write().await.failing_assignments.insert(request_id);
    }

    /// Hacer fallar el borrado de rutas
    pub async fn fail_route_deletes(&self, fail: bool) {
        self.tables.write().await.fail_route_deletes = fail;
    }

    /// Copia de todas las solicitudes del evento (sin filtrar)
    pub async fn requests_for(&self, event_id: Uuid) -> Vec<TransportRequest> {
        self.tables
            .read()
            .await
            .requests
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect()
    }

    pub async fn route_count(&self, event_id: Uuid) -> usize {
        self.tables
            .read()
            .await
            .routes
            .iter()
            .filter(|r| r.event_id == event_id)
            .count()
    }
}

#[async_trait]
impl TransportStore for InMemoryTransportStore {
    async fn find_event_drivers(&self, event_id: Uuid) -> AppResult<Vec<DriverVehiclePair>> {
        let tables = self.tables.read().await;
        Ok(tables
            .event_drivers
            .iter()
            .filter(|record| {
                record.event_id == event_id
                    && matches!(record.status.as_str(), "assigned" | "confirmed")
            })
            .map(|record| record.pair.clone())
            .collect())
    }

    async fn find_requests(
        &self,
        event_id: Uuid,
        filter: RequestFilter,
    ) -> AppResult<Vec<TransportRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<TransportRequest> = tables
            .requests
            .iter()
            .filter(|r| r.event_id == event_id && filter.matches(r))
            .cloned()
            .collect();
        requests.sort_by_key(|r| (r.created_at, r.id));
        Ok(requests)
    }

    async fn assign_request(&self, assignment: &RequestAssignment) -> AppResult<()> {
        let mut tables = self.tables.write().await;

        if tables.failing_assignments.contains(&assignment.request_id) {
            return Err(AppError::Internal(format!(
                "simulated write failure for request {}",
                assignment.request_id
            )));
        }

        let driver_name = tables
            .requests
            .iter()
            .find(|r| r.id == assignment.request_id)
            .and_then(|r| tables.driver(r.event_id, assignment.driver_id))
            .and_then(|pair| pair.driver_name.clone());

        let request = tables
            .requests
            .iter_mut()
            .find(|r| r.id == assignment.request_id && r.status == TransportStatus::Pending)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Transport request {} is no longer pending",
                    assignment.request_id
                ))
            })?;

        request.status = TransportStatus::Assigned;
        request.assigned_driver = Some(assignment.driver_id);
        request.assigned_vehicle = Some(assignment.vehicle_id);
        request.assignment_order = Some(assignment.sequence);
        request.driver_name = driver_name;
        Ok(())
    }

    async fn delete_requests(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.requests.len();
        tables.requests.retain(|r| !ids.contains(&r.id));
        Ok((before - tables.requests.len()) as u64)
    }

    async fn reset_requests(&self, event_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;

        for request in tables.requests.iter_mut().filter(|r| r.event_id == event_id) {
            let clean = request.status == TransportStatus::Pending
                && request.assigned_driver.is_none()
                && request.assigned_vehicle.is_none()
                && request.assignment_order.is_none();
            if clean {
                continue;
            }

            request.status = TransportStatus::Pending;
            request.assigned_driver = None;
            request.assigned_vehicle = None;
            request.assignment_order = None;
            request.driver_name = None;
            changed += 1;
        }

        Ok(changed)
    }

    async fn delete_routes(&self, event_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;

        if tables.fail_route_deletes {
            return Err(AppError::Internal(
                "simulated failure deleting routes".to_string(),
            ));
        }

        let before = tables.routes.len();
        tables.routes.retain(|r| r.event_id != event_id);
        Ok((before - tables.routes.len()) as u64)
    }

    async fn insert_routes(&self, routes: Vec<NewTransportRoute>) -> AppResult<Vec<TransportRoute>> {
        let saved: Vec<TransportRoute> = routes.into_iter().map(TransportRoute::from_new).collect();
        self.tables.write().await.routes.extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn find_routes(&self, event_id: Uuid) -> AppResult<Vec<RouteWithDriver>> {
        let tables = self.tables.read().await;
        Ok(tables
            .routes
            .iter()
            .filter(|route| route.event_id == event_id)
            .map(|route| {
                let driver = tables.driver(event_id, route.driver_id);
                let vehicle = route
                    .vehicle_id
                    .and_then(|vehicle_id| tables.vehicle(event_id, vehicle_id));
                RouteWithDriver {
                    route: route.clone(),
                    driver_name: driver.and_then(|d| d.driver_name.clone()),
                    driver_email: driver.and_then(|d| d.driver_email.clone()),
                    vehicle_label: vehicle.map(|v| v.vehicle_label()),
                }
            })
            .collect())
    }

    async fn find_event(&self, event_id: Uuid) -> AppResult<Option<EventInfo>> {
        Ok(self.tables.read().await.events.get(&event_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_seed_loads_and_filters_driver_status() {
        let event_id = Uuid::new_v4();
        let seed: SeedData = serde_json::from_value(json!({
            "events": [{ "id": event_id, "title": "Retreat", "start_datetime": null, "location": null }],
            "event_drivers": [
                { "event_id": event_id, "driver_id": Uuid::new_v4(), "vehicle_id": Uuid::new_v4(),
                  "driver_name": "Sam", "capacity": 4 },
                { "event_id": event_id, "status": "declined", "driver_id": Uuid::new_v4(),
                  "vehicle_id": Uuid::new_v4(), "driver_name": "Lee", "capacity": 6 }
            ],
            "requests": [
                { "id": Uuid::new_v4(), "event_id": event_id, "contact_id": null,
                  "pickup_address": "1 Elm St 80210" }
            ]
        }))
        .unwrap();

        let store = InMemoryTransportStore::from_seed(seed);

        let drivers = store.find_event_drivers(event_id).await.unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].driver_name.as_deref(), Some("Sam"));

        let pending = store
            .find_requests(event_id, RequestFilter::PendingUnassigned)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert!(store.find_event(event_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_routes_use_their_own_event_pairing() {
        let (event_a, event_b) = (Uuid::new_v4(), Uuid::new_v4());
        let driver_id = Uuid::new_v4();
        let pair = |vehicle_id: Uuid, email: &str, make: &str| DriverVehiclePair {
            driver_id,
            vehicle_id,
            driver_name: Some("Sam".to_string()),
            driver_email: Some(email.to_string()),
            vehicle_make: Some(make.to_string()),
            vehicle_model: None,
            capacity: 4,
        };
        let (van, sedan) = (Uuid::new_v4(), Uuid::new_v4());
        let store = InMemoryTransportStore::new();
        store
            .insert_event_driver(event_a, "confirmed", pair(van, "old@example.org", "Ford"))
            .await;
        store
            .insert_event_driver(event_b, "confirmed", pair(sedan, "sam@example.org", "Honda"))
            .await;
        store
            .insert_routes(vec![NewTransportRoute {
                event_id: event_b,
                driver_id,
                vehicle_id: sedan,
                route_name: "Route 1 - Sam".to_string(),
                stops: Vec::new(),
                map_url: "https://www.google.com/maps".to_string(),
            }])
            .await
            .unwrap();

        let routes = store.find_routes(event_b).await.unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].driver_email.as_deref(), Some("sam@example.org"));
        assert_eq!(routes[0].vehicle_label.as_deref(), Some("Honda"));
    }

    #[tokio::test]
    async fn test_assignment_only_touches_pending_rows() {
        let event_id = Uuid::new_v4();
        let store = InMemoryTransportStore::new();
        let request: TransportRequest = serde_json::from_value(json!({
            "id": Uuid::new_v4(), "event_id": event_id, "contact_id": null, "pickup_address": null
        }))
        .unwrap();
        let assignment = RequestAssignment {
            request_id: request.id,
            driver_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            sequence: 1,
        };
        store.insert_request(request).await;

        assert!(store.assign_request(&assignment).await.is_ok());
        assert!(matches!(
            store.assign_request(&assignment).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(store.reset_requests(event_id).await.unwrap(), 1);
        assert_eq!(store.reset_requests(event_id).await.unwrap(), 0);
    }
}
