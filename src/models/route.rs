//! Modelo de TransportRoute
//! 
//! Ruta generada para un conductor de un evento. Las paradas se guardan como
//! JSONB en la columna stops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Parada dentro de una ruta
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub order: i32,
    pub passenger: String,
    pub address: String,
    pub phone: Option<String>,
    pub contact_id: Option<Uuid>,
    pub request_id: Uuid,
}

/// Ruta lista para insertar
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransportRoute {
    pub event_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub route_name: String,
    pub stops: Vec<RouteStop>,
    pub map_url: String,
}

/// Ruta persistida - mapea a la tabla transport_routes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransportRoute {
    pub id: Uuid,
    pub event_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub route_name: String,
    pub stops: Json<Vec<RouteStop>>,
    pub total_stops: i32,
    pub map_url: String,
    pub created_at: DateTime<Utc>,
}

impl TransportRoute {
    /// Materializar una ruta nueva con id y marca de tiempo
    pub fn from_new(route: NewTransportRoute) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: route.event_id,
            driver_id: route.driver_id,
            vehicle_id: Some(route.vehicle_id),
            route_name: route.route_name,
            total_stops: route.stops.len() as i32,
            stops: Json(route.stops),
            map_url: route.map_url,
            created_at: Utc::now(),
        }
    }
}

/// Ruta junto con los datos de contacto de su conductor
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RouteWithDriver {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub route: TransportRoute,
    pub driver_name: Option<String>,
    pub driver_email: Option<String>,
    pub vehicle_label: Option<String>,
}
