#![allow(dead_code)]

use chrono::{Duration, Utc};
use event_transport::models::{DriverVehiclePair, EventInfo, TransportRequest, TransportStatus};
use event_transport::repositories::InMemoryTransportStore;
use std::sync::Arc;
use uuid::Uuid;

pub struct Fixture {
    pub event_id: Uuid,
    pub store: Arc<InMemoryTransportStore>,
    created: i64,
}

impl Fixture {
    pub async fn new() -> Self {
        let event_id = Uuid::new_v4();
        let store = Arc::new(InMemoryTransportStore::new());
        store
            .insert_event(EventInfo {
                id: event_id,
                title: "Spring Retreat".to_string(),
                start_datetime: Some(Utc::now() + Duration::days(7)),
                location: Some("Camp Redwood".to_string()),
            })
            .await;

        Self {
            event_id,
            store,
            created: 0,
        }
    }

    pub async fn driver(&self, name: &str, email: Option<&str>, capacity: i32) -> DriverVehiclePair {
        let pair = DriverVehiclePair {
            driver_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            driver_name: Some(name.to_string()),
            driver_email: email.map(str::to_string),
            vehicle_make: Some("Toyota".to_string()),
            vehicle_model: Some("Sienna".to_string()),
            capacity,
        };
        self.store
            .insert_event_driver(self.event_id, "confirmed", pair.clone())
            .await;
        pair
    }

    /// Solicitud pendiente para un contacto nuevo
    pub async fn request(&mut self, first: &str, address: &str) -> TransportRequest {
        self.request_for(Uuid::new_v4(), first, address).await
    }

    pub async fn request_for(
        &mut self,
        contact_id: Uuid,
        first: &str,
        address: &str,
    ) -> TransportRequest {
        // marcas de tiempo crecientes para un orden de lectura estable
        self.created += 1;
        let request = TransportRequest {
            id: Uuid::new_v4(),
            event_id: self.event_id,
            contact_id: Some(contact_id),
            pickup_address: Some(address.to_string()),
            status: TransportStatus::Pending,
            assigned_driver: None,
            assigned_vehicle: None,
            assignment_order: None,
            contact_first_name: Some(first.to_string()),
            contact_last_name: Some("Rider".to_string()),
            contact_phone: Some("555-0100".to_string()),
            driver_name: None,
            created_at: Utc::now() - Duration::hours(1) + Duration::seconds(self.created),
        };
        self.store.insert_request(request.clone()).await;
        request
    }

    /// Siete solicitudes en Denver (4 en 80210, 3 en 80221)
    pub async fn seed_denver(&mut self) {
        for i in 0..4 {
            self.request(&format!("North{}", i), &format!("{} Elm St, Denver CO 80210", i + 1))
                .await;
        }
        for i in 0..3 {
            self.request(&format!("West{}", i), &format!("{} Pine Ave, Denver CO 80221", i + 1))
                .await;
        }
    }
}
