//! Construcción de rutas por conductor
//!
//! Agrupa las solicitudes asignadas por conductor, ordena las paradas según
//! el orden de asignación y genera el enlace de navegación multiparada.
//! No hay optimización de recorrido: el orden es el de carga del vehículo.

use crate::models::{NewTransportRoute, RouteStop, TransportRequest};
use std::collections::HashMap;
use uuid::Uuid;

pub const UNKNOWN_ADDRESS: &str = "Unknown Address";
pub const UNKNOWN_PASSENGER: &str = "Unknown Passenger";
pub const UNKNOWN_DRIVER: &str = "Unknown Driver";

/// Generador de enlaces de navegación (plantillas de URL, sin llamadas a API)
#[derive(Debug, Clone)]
pub struct MapLinkBuilder {
    base_url: String,
}

impl Default for MapLinkBuilder {
    fn default() -> Self {
        Self::new("https://www.google.com/maps")
    }
}

impl MapLinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Direcciones multiparada con 2+ direcciones, búsqueda con 1, mapa genérico con 0
    pub fn link<'a, I>(&self, addresses: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let encoded: Vec<String> = addresses
            .into_iter()
            .map(str::trim)
            .filter(|address| is_valid_address(address))
            .map(|address| urlencoding::encode(address).into_owned())
            .collect();

        match encoded.len() {
            0 => self.base_url.clone(),
            1 => format!("{}/search/{}", self.base_url, encoded[0]),
            _ => format!("{}/dir/{}", self.base_url, encoded.join("/")),
        }
    }
}

fn is_valid_address(address: &str) -> bool {
    !address.is_empty() && address != UNKNOWN_ADDRESS
}

/// Solicitudes de un conductor
struct DriverGroup<'a> {
    driver_id: Uuid,
    vehicle_id: Uuid,
    driver_name: Option<String>,
    requests: Vec<&'a TransportRequest>,
}

/// Construir una ruta por conductor con al menos una parada.
/// Las solicitudes sin conductor o vehículo se ignoran.
pub fn build_routes(
    event_id: Uuid,
    requests: &[TransportRequest],
    links: &MapLinkBuilder,
) -> Vec<NewTransportRoute> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut groups: Vec<DriverGroup> = Vec::new();

    for request in requests {
        let (Some(driver_id), Some(vehicle_id)) = (request.assigned_driver, request.assigned_vehicle)
        else {
            continue;
        };

        match index.get(&driver_id).copied() {
            Some(i) => groups[i].requests.push(request),
            None => {
                index.insert(driver_id, groups.len());
                groups.push(DriverGroup {
                    driver_id,
                    vehicle_id,
                    driver_name: request.driver_name.clone(),
                    requests: vec![request],
                });
            }
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(i, mut group)| {
            // sort_by_key es estable: sin orden de asignación, manda la creación
            group.requests.sort_by_key(|r| {
                (r.assignment_order.is_none(), r.assignment_order, r.created_at)
            });

            let stops: Vec<RouteStop> = group
                .requests
                .iter()
                .enumerate()
                .map(|(position, request)| RouteStop {
                    order: position as i32 + 1,
                    passenger: request
                        .passenger_name()
                        .unwrap_or_else(|| UNKNOWN_PASSENGER.to_string()),
                    address: request
                        .pickup_address
                        .as_deref()
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .unwrap_or(UNKNOWN_ADDRESS)
                        .to_string(),
                    phone: request.contact_phone.clone(),
                    contact_id: request.contact_id,
                    request_id: request.id,
                })
                .collect();

            let map_url = links.link(stops.iter().map(|stop| stop.address.as_str()));
            let route_name = format!(
                "Route {} - {}",
                i + 1,
                group.driver_name.as_deref().unwrap_or(UNKNOWN_DRIVER)
            );

            tracing::debug!("📍 {}: {} paradas", route_name, stops.len());

            NewTransportRoute {
                event_id,
                driver_id: group.driver_id,
                vehicle_id: group.vehicle_id,
                route_name,
                stops,
                map_url,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransportStatus;
    use chrono::{Duration, Utc};

    fn assigned(
        driver: Uuid,
        vehicle: Uuid,
        order: Option<i32>,
        first: &str,
        address: Option<&str>,
    ) -> TransportRequest {
        TransportRequest {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            contact_id: Some(Uuid::new_v4()),
            pickup_address: address.map(str::to_string),
            status: TransportStatus::Assigned,
            assigned_driver: Some(driver),
            assigned_vehicle: Some(vehicle),
            assignment_order: order,
            contact_first_name: Some(first.to_string()),
            contact_last_name: Some("Doe".to_string()),
            contact_phone: Some("555-0100".to_string()),
            driver_name: Some("Pat".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_link_variants() {
        let links = MapLinkBuilder::default();
        assert_eq!(
            links.link(["1 Main St, Denver 80210", "2 Oak Ave 80221"]),
            "https://www.google.com/maps/dir/1%20Main%20St%2C%20Denver%2080210/2%20Oak%20Ave%2080221"
        );
        assert_eq!(
            links.link(["1 Main St", UNKNOWN_ADDRESS, "  "]),
            "https://www.google.com/maps/search/1%20Main%20St"
        );
        assert_eq!(links.link([UNKNOWN_ADDRESS]), "https://www.google.com/maps");
        assert_eq!(links.link(Vec::<&str>::new()), "https://www.google.com/maps");
    }

    #[test]
    fn test_custom_base_url() {
        let links = MapLinkBuilder::new("https://maps.example.org/");
        assert_eq!(links.link(["A"]), "https://maps.example.org/search/A");
    }

    #[test]
    fn test_one_route_per_driver_ordered_by_assignment() {
        let (d1, v1, d2, v2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let requests = vec![
            assigned(d1, v1, Some(2), "Bea", Some("2 B St 80210")),
            assigned(d2, v2, Some(1), "Cal", Some("9 C St 10001")),
            assigned(d1, v1, Some(1), "Ana", Some("1 A St 80210")),
        ];

        let routes = build_routes(Uuid::nil(), &requests, &MapLinkBuilder::default());

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].driver_id, d1);
        assert_eq!(routes[0].route_name, "Route 1 - Pat");
        let passengers: Vec<&str> = routes[0].stops.iter().map(|s| s.passenger.as_str()).collect();
        assert_eq!(passengers, vec!["Ana Doe", "Bea Doe"]);
        assert_eq!(routes[0].stops[0].order, 1);
        assert!(routes[0].map_url.contains("/dir/"));
        assert_eq!(routes[1].stops.len(), 1);
        assert!(routes[1].map_url.contains("/search/"));
    }

    #[test]
    fn test_missing_order_falls_back_to_creation_time() {
        let (d, v) = (Uuid::new_v4(), Uuid::new_v4());
        let mut late = assigned(d, v, None, "Late", Some("1 St"));
        late.created_at = Utc::now() + Duration::minutes(5);
        let early = assigned(d, v, None, "Early", Some("2 St"));
        let ordered = assigned(d, v, Some(1), "Ordered", Some("3 St"));

        let routes = build_routes(Uuid::nil(), &[late, early, ordered], &MapLinkBuilder::default());

        let passengers: Vec<&str> = routes[0].stops.iter().map(|s| s.passenger.as_str()).collect();
        assert_eq!(passengers, vec!["Ordered Doe", "Early Doe", "Late Doe"]);
    }

    #[test]
    fn test_missing_data_uses_placeholders() {
        let (d, v) = (Uuid::new_v4(), Uuid::new_v4());
        let mut request = assigned(d, v, Some(1), "x", None);
        request.contact_first_name = None;
        request.contact_last_name = None;
        request.driver_name = None;

        let routes = build_routes(Uuid::nil(), &[request], &MapLinkBuilder::default());

        assert_eq!(routes[0].route_name, "Route 1 - Unknown Driver");
        assert_eq!(routes[0].stops[0].passenger, UNKNOWN_PASSENGER);
        assert_eq!(routes[0].stops[0].address, UNKNOWN_ADDRESS);
        assert_eq!(routes[0].map_url, "https://www.google.com/maps");
    }

    #[test]
    fn test_unassigned_requests_are_skipped() {
        let mut request = assigned(Uuid::new_v4(), Uuid::new_v4(), Some(1), "x", Some("1 St"));
        request.assigned_vehicle = None;
        assert!(build_routes(Uuid::nil(), &[request], &MapLinkBuilder::default()).is_empty());
    }
}
