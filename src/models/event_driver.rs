//! Modelo de conductor/vehículo confirmado para un evento

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Par conductor/vehículo de un evento - entrada inmutable de una asignación
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DriverVehiclePair {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_email: Option<String>,
    #[serde(default)]
    pub vehicle_make: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    pub capacity: i32,
}

impl DriverVehiclePair {
    /// Descripción corta del vehículo para logs ("Toyota Sienna")
    pub fn vehicle_label(&self) -> String {
        let label = [self.vehicle_make.as_deref(), self.vehicle_model.as_deref()]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        if label.is_empty() {
            self.vehicle_id.to_string()
        } else {
            label
        }
    }
}
