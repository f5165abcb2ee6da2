//! Controlador de transporte de eventos
//!
//! Orquesta las operaciones por evento sobre el almacén: asignación
//! automática, generación de rutas, reinicio y envío de rutas.

use crate::dto::transport_dto::{
    AutoAssignResponse, AutoAssignSummary, GenerateRoutesResponse, GenerateRoutesSummary,
    ResetResponse, RouteDispatchResult, SendRoutesResponse,
};
use crate::dto::ApiResponse;
use crate::models::{RequestAssignment, RequestFilter, RouteWithDriver};
use crate::repositories::TransportStore;
use crate::services::assignment_engine::{assign, RegionalRequest, VehicleLoad};
use crate::services::capacity_pool::CapacityPool;
use crate::services::deduplicator::deduplicate;
use crate::services::notification_service::{compose_route_email, RouteNotifier};
use crate::services::region_classifier::classify;
use crate::services::route_builder::{build_routes, MapLinkBuilder};
use crate::utils::errors::{not_found_error, AppError, AppResult};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct TransportController {
    store: Arc<dyn TransportStore>,
    notifier: Arc<dyn RouteNotifier>,
    links: MapLinkBuilder,
}

impl TransportController {
    pub fn new(
        store: Arc<dyn TransportStore>,
        notifier: Arc<dyn RouteNotifier>,
        links: MapLinkBuilder,
    ) -> Self {
        Self {
            store,
            notifier,
            links,
        }
    }

    /// Asignar automáticamente las solicitudes pendientes del evento
    pub async fn auto_assign(&self, event_id: Uuid) -> AppResult<AutoAssignResponse> {
        info!("🚐 Auto-asignación para el evento {}", event_id);

        // Sin capacidad no se toca nada, ni siquiera los duplicados
        let pairs = self.store.find_event_drivers(event_id).await?;
        let pool = CapacityPool::from_pairs(&pairs)?;

        let requests = self
            .store
            .find_requests(event_id, RequestFilter::PendingUnassigned)
            .await?;
        let total_requests = requests.len();

        if total_requests == 0 {
            return Ok(AutoAssignResponse {
                success: true,
                message: "No pending transport requests to assign".to_string(),
                assignments: Vec::new(),
                vehicles: Vec::new(),
                summary: AutoAssignSummary {
                    total_capacity: pool.total_capacity(),
                    remaining_capacity: pool.total_capacity(),
                    ..Default::default()
                },
            });
        }

        let deduplicated = deduplicate(requests);
        let duplicates_removed = if deduplicated.duplicate_ids.is_empty() {
            0
        } else {
            match self.store.delete_requests(&deduplicated.duplicate_ids).await {
                Ok(deleted) => {
                    info!("🧹 {} solicitudes duplicadas eliminadas", deleted);
                    deleted
                }
                Err(e) => {
                    warn!("⚠️ No se pudieron eliminar los duplicados: {}", e);
                    0
                }
            }
        };

        let regional: Vec<RegionalRequest> = deduplicated
            .unique
            .iter()
            .map(|request| {
                let classified = classify(request.pickup_address.as_deref().unwrap_or_default());
                RegionalRequest {
                    request_id: request.id,
                    zip_code: classified.zip_code,
                    region: classified.region,
                }
            })
            .collect();

        let plan = assign(regional, pool);

        let writes = plan.assignments.iter().map(|assignment| {
            let update = RequestAssignment {
                request_id: assignment.request_id,
                driver_id: assignment.driver_id,
                vehicle_id: assignment.vehicle_id,
                sequence: assignment.sequence,
            };
            async move { self.store.assign_request(&update).await }
        });
        let outcomes = join_all(writes).await;

        let mut assignments = Vec::with_capacity(plan.assignments.len());
        let mut failed_request_ids = Vec::new();
        for (assignment, outcome) in plan.assignments.iter().zip(outcomes) {
            match outcome {
                Ok(()) => assignments.push(assignment.clone()),
                Err(e) => {
                    error!(
                        "❌ Error asignando la solicitud {}: {}",
                        assignment.request_id, e
                    );
                    failed_request_ids.push(assignment.request_id);
                }
            }
        }

        // Cargas finales sin las escrituras fallidas
        let vehicles: Vec<VehicleLoad> = plan
            .loads
            .into_iter()
            .map(|mut load| {
                load.request_ids.retain(|id| !failed_request_ids.contains(id));
                load.assigned = load.request_ids.len() as u32;
                load.available = load.capacity - load.assigned;
                load
            })
            .collect();
        let vehicles_used = vehicles.iter().filter(|load| load.assigned > 0).count();
        let assigned_requests = assignments.len();
        let remaining_capacity = plan
            .total_capacity
            .saturating_sub(assigned_requests as u32);

        let mut message = format!(
            "Assigned {} of {} requests using {} vehicles",
            assigned_requests,
            deduplicated.unique.len(),
            vehicles_used
        );
        if !plan.unassigned.is_empty() {
            message.push_str(&format!(
                "; {} requests need more capacity",
                plan.unassigned.len()
            ));
        }
        if !failed_request_ids.is_empty() {
            message.push_str(&format!(
                "; {} updates failed and can be retried",
                failed_request_ids.len()
            ));
        }
        info!("✅ {}", message);

        Ok(AutoAssignResponse {
            success: failed_request_ids.is_empty(),
            message,
            assignments,
            vehicles,
            summary: AutoAssignSummary {
                total_requests,
                unique_contacts: deduplicated.unique.len(),
                duplicates_removed,
                assigned_requests,
                vehicles_used,
                total_capacity: plan.total_capacity,
                remaining_capacity,
                unassigned_requests: plan.unassigned.len(),
                failed_updates: failed_request_ids.len(),
                failed_request_ids,
            },
        })
    }

    /// Generar una ruta por conductor, reemplazando las anteriores
    pub async fn generate_routes(&self, event_id: Uuid) -> AppResult<GenerateRoutesResponse> {
        let requests = self
            .store
            .find_requests(event_id, RequestFilter::Assigned)
            .await?;

        if requests.is_empty() {
            return Err(AppError::InputState(
                "No assigned transport requests found for this event. Run auto-assign first."
                    .to_string(),
            ));
        }

        let routes = build_routes(event_id, &requests, &self.links);

        // Reemplazo completo: sin borrar las anteriores no se inserta nada
        let replaced = self.store.delete_routes(event_id).await.map_err(|e| {
            error!("❌ Error borrando rutas anteriores del evento {}: {}", event_id, e);
            e
        })?;
        if replaced > 0 {
            info!("♻️ {} rutas anteriores reemplazadas", replaced);
        }

        let saved = self.store.insert_routes(routes).await.map_err(|e| {
            error!("❌ Error guardando rutas del evento {}: {}", event_id, e);
            e
        })?;

        let drivers_assigned = saved
            .iter()
            .map(|route| route.driver_id)
            .collect::<HashSet<_>>()
            .len();
        let total_stops: usize = saved.iter().map(|route| route.stops.0.len()).sum();

        info!(
            "🗺️ {} rutas generadas ({} paradas) para el evento {}",
            saved.len(),
            total_stops,
            event_id
        );

        Ok(GenerateRoutesResponse {
            success: true,
            message: format!("Generated {} routes", saved.len()),
            summary: GenerateRoutesSummary {
                routes_generated: saved.len(),
                drivers_assigned,
                total_stops,
            },
            routes: saved,
        })
    }

    /// Devolver todas las solicitudes a pendiente y borrar las rutas
    pub async fn reset(&self, event_id: Uuid) -> AppResult<ResetResponse> {
        let reset_requests = self.store.reset_requests(event_id).await?;

        let routes_cleared = match self.store.delete_routes(event_id).await {
            Ok(deleted) => {
                info!("🗑️ {} rutas eliminadas", deleted);
                true
            }
            Err(e) => {
                error!("❌ Error borrando rutas del evento {}: {}", event_id, e);
                false
            }
        };

        info!(
            "🔄 Evento {}: {} solicitudes reiniciadas",
            event_id, reset_requests
        );

        Ok(ResetResponse {
            success: true,
            message: format!("Reset {} transport requests", reset_requests),
            reset_requests,
            routes_cleared,
        })
    }

    /// Enviar a cada conductor su ruta por correo
    pub async fn send_routes(&self, event_id: Uuid) -> AppResult<SendRoutesResponse> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found_error("Event", &event_id.to_string()))?;

        let routes = self.store.find_routes(event_id).await?;
        if routes.is_empty() {
            return Err(AppError::InputState(
                "No routes found for this event. Generate routes first.".to_string(),
            ));
        }

        let sends = routes.iter().map(|route| {
            let email = compose_route_email(route, &event);
            async move {
                let driver_id = route.route.driver_id;
                let Some(email) = email else {
                    warn!("⚠️ El conductor {} no tiene email", driver_id);
                    return RouteDispatchResult {
                        driver_id,
                        success: false,
                        email: None,
                        error: Some("No email address".to_string()),
                    };
                };

                match self.notifier.send_route(&email).await {
                    Ok(()) => RouteDispatchResult {
                        driver_id,
                        success: true,
                        email: Some(email.to),
                        error: None,
                    },
                    Err(e) => {
                        error!("❌ Error enviando ruta a {}: {}", email.to, e);
                        RouteDispatchResult {
                            driver_id,
                            success: false,
                            email: Some(email.to),
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
        });
        let results = join_all(sends).await;

        let emails_sent = results.iter().filter(|r| r.success).count();
        let emails_failed = results.len() - emails_sent;
        info!("✉️ {} rutas enviadas, {} fallidas", emails_sent, emails_failed);

        Ok(SendRoutesResponse {
            success: true,
            message: format!("Sent {} of {} route emails", emails_sent, routes.len()),
            total_routes: routes.len(),
            emails_sent,
            emails_failed,
            results,
        })
    }

    pub async fn list_routes(&self, event_id: Uuid) -> AppResult<ApiResponse<Vec<RouteWithDriver>>> {
        let routes = self.store.find_routes(event_id).await?;
        let message = format!("{} routes found", routes.len());
        Ok(ApiResponse::success_with_message(routes, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverVehiclePair, TransportRequest, TransportStatus};
    use crate::repositories::InMemoryTransportStore;
    use crate::services::notification_service::LogNotifier;
    use chrono::Utc;

    fn pending(event_id: Uuid, first: &str, address: &str) -> TransportRequest {
        TransportRequest {
            id: Uuid::new_v4(),
            event_id,
            contact_id: Some(Uuid::new_v4()),
            pickup_address: Some(address.to_string()),
            status: TransportStatus::Pending,
            assigned_driver: None,
            assigned_vehicle: None,
            assignment_order: None,
            contact_first_name: Some(first.to_string()),
            contact_last_name: Some("Doe".to_string()),
            contact_phone: None,
            driver_name: None,
            created_at: Utc::now(),
        }
    }

    fn pair(name: &str, capacity: i32) -> DriverVehiclePair {
        DriverVehiclePair {
            driver_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            driver_name: Some(name.to_string()),
            driver_email: None,
            vehicle_make: None,
            vehicle_model: None,
            capacity,
        }
    }

    fn controller(store: Arc<InMemoryTransportStore>) -> TransportController {
        TransportController::new(store, Arc::new(LogNotifier), MapLinkBuilder::default())
    }

    #[tokio::test]
    async fn test_no_capacity_is_configuration_error_without_mutation() {
        let event_id = Uuid::new_v4();
        let store = Arc::new(InMemoryTransportStore::new());
        let request = pending(event_id, "Ana", "1 Main St 80210");
        let mut duplicate = request.clone();
        duplicate.id = Uuid::new_v4();
        store.insert_request(request).await;
        store.insert_request(duplicate).await;
        store.insert_event_driver(event_id, "confirmed", pair("Zero", 0)).await;

        let result = controller(store.clone()).auto_assign(event_id).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        let after = store.requests_for(event_id).await;
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|r| r.status == TransportStatus::Pending));
    }

    #[tokio::test]
    async fn test_no_pending_requests_is_empty_success() {
        let event_id = Uuid::new_v4();
        let store = Arc::new(InMemoryTransportStore::new());
        store.insert_event_driver(event_id, "assigned", pair("Sam", 4)).await;

        let response = controller(store).auto_assign(event_id).await.unwrap();

        assert!(response.assignments.is_empty());
        assert_eq!(response.summary.total_capacity, 4);
        assert_eq!(response.summary.remaining_capacity, 4);
    }

    #[tokio::test]
    async fn test_generate_routes_requires_assignment() {
        let event_id = Uuid::new_v4();
        let store = Arc::new(InMemoryTransportStore::new());
        store.insert_request(pending(event_id, "Ana", "1 Main St 80210")).await;

        let result = controller(store).generate_routes(event_id).await;

        assert!(matches!(result, Err(AppError::InputState(_))));
    }

    #[tokio::test]
    async fn test_send_routes_unknown_event_is_not_found() {
        let store = Arc::new(InMemoryTransportStore::new());
        let result = controller(store).send_routes(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_declined_drivers_are_ignored() {
        let event_id = Uuid::new_v4();
        let store = Arc::new(InMemoryTransportStore::new());
        store.insert_request(pending(event_id, "Ana", "1 Main St 80210")).await;
        store.insert_event_driver(event_id, "declined", pair("Sam", 4)).await;

        let result = controller(store).auto_assign(event_id).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
