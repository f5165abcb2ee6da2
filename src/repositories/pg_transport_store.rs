use crate::models::{
    DriverVehiclePair, EventInfo, NewTransportRoute, RequestAssignment, RequestFilter,
    RouteWithDriver, TransportRequest, TransportRoute,
};
use crate::repositories::transport_store::TransportStore;
use crate::utils::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const REQUEST_COLUMNS: &str = r#"
    tr.id, tr.event_id, tr.contact_id, tr.pickup_address, tr.status,
    tr.assigned_driver, tr.assigned_vehicle, tr.assignment_order, tr.created_at,
    c.first_name AS contact_first_name,
    c.last_name AS contact_last_name,
    c.phone AS contact_phone,
    d.name AS driver_name
"#;

/// Almacén de transporte sobre PostgreSQL
#[derive(Clone)]
pub struct PgTransportStore {
    pool: PgPool,
}

impl PgTransportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransportStore for PgTransportStore {
    async fn find_event_drivers(&self, event_id: Uuid) -> AppResult<Vec<DriverVehiclePair>> {
        let pairs = sqlx::query_as::<_, DriverVehiclePair>(
            r#"
            SELECT ed.driver_id, ed.vehicle_id,
                   d.name AS driver_name, d.email AS driver_email,
                   v.make AS vehicle_make, v.model AS vehicle_model, v.capacity
            FROM event_drivers ed
            JOIN drivers d ON d.id = ed.driver_id
            JOIN vehicles v ON v.id = ed.vehicle_id
            WHERE ed.event_id = $1
              AND ed.status IN ('assigned', 'confirmed')
              AND ed.vehicle_id IS NOT NULL
            ORDER BY ed.created_at, ed.driver_id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        log::debug!("🚙 {} conductores con vehículo para el evento {}", pairs.len(), event_id);
        Ok(pairs)
    }

    async fn find_requests(
        &self,
        event_id: Uuid,
        filter: RequestFilter,
    ) -> AppResult<Vec<TransportRequest>> {
        let condition = match filter {
            RequestFilter::PendingUnassigned => {
                "tr.status = 'pending' AND tr.assigned_driver IS NULL AND tr.assigned_vehicle IS NULL"
            }
            RequestFilter::Assigned => {
                "tr.status = 'assigned' AND tr.assigned_driver IS NOT NULL AND tr.assigned_vehicle IS NOT NULL"
            }
        };

        let query = format!(
            r#"
            SELECT {}
            FROM transport_requests tr
            LEFT JOIN contacts c ON c.id = tr.contact_id
            LEFT JOIN drivers d ON d.id = tr.assigned_driver
            WHERE tr.event_id = $1 AND {}
            ORDER BY tr.created_at, tr.id
            "#,
            REQUEST_COLUMNS, condition
        );

        let requests = sqlx::query_as::<_, TransportRequest>(&query)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    async fn assign_request(&self, assignment: &RequestAssignment) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE transport_requests
            SET assigned_driver = $2, assigned_vehicle = $3, assignment_order = $4,
                status = 'assigned', updated_at = $5
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(assignment.request_id)
        .bind(assignment.driver_id)
        .bind(assignment.vehicle_id)
        .bind(assignment.sequence)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Transport request {} is no longer pending",
                assignment.request_id
            )));
        }
        Ok(())
    }

    async fn delete_requests(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM transport_requests WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn reset_requests(&self, event_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE transport_requests
            SET status = 'pending', assigned_driver = NULL, assigned_vehicle = NULL,
                assignment_order = NULL, updated_at = $2
            WHERE event_id = $1
              AND (status <> 'pending'
                   OR assigned_driver IS NOT NULL
                   OR assigned_vehicle IS NOT NULL
                   OR assignment_order IS NOT NULL)
            "#,
        )
        .bind(event_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_routes(&self, event_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM transport_routes WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_routes(&self, routes: Vec<NewTransportRoute>) -> AppResult<Vec<TransportRoute>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(routes.len());

        for route in routes {
            let total_stops = route.stops.len() as i32;
            let row = sqlx::query_as::<_, TransportRoute>(
                r#"
                INSERT INTO transport_routes
                    (id, event_id, driver_id, vehicle_id, route_name, stops, total_stops, map_url, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                RETURNING id, event_id, driver_id, vehicle_id, route_name, stops, total_stops, map_url, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(route.event_id)
            .bind(route.driver_id)
            .bind(route.vehicle_id)
            .bind(route.route_name)
            .bind(Json(route.stops))
            .bind(total_stops)
            .bind(route.map_url)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn find_routes(&self, event_id: Uuid) -> AppResult<Vec<RouteWithDriver>> {
        let routes = sqlx::query_as::<_, RouteWithDriver>(
            r#"
            SELECT r.id, r.event_id, r.driver_id, r.vehicle_id, r.route_name, r.stops,
                   r.total_stops, r.map_url, r.created_at,
                   d.name AS driver_name, d.email AS driver_email,
                   NULLIF(TRIM(CONCAT_WS(' ', v.make, v.model, '(' || v.license_plate || ')')), '') AS vehicle_label
            FROM transport_routes r
            JOIN drivers d ON d.id = r.driver_id
            LEFT JOIN vehicles v ON v.id = r.vehicle_id
            WHERE r.event_id = $1
            ORDER BY r.created_at, r.id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    async fn find_event(&self, event_id: Uuid) -> AppResult<Option<EventInfo>> {
        let event = sqlx::query_as::<_, EventInfo>(
            "SELECT id, title, start_datetime, location FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}
