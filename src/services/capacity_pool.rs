//! Pool de capacidad de vehículos para una corrida de asignación
//!
//! Modelo en memoria de los pares conductor/vehículo con asientos libres,
//! ordenados por capacidad descendente. Vive lo que dura una corrida.

use crate::models::DriverVehiclePair;
use crate::utils::errors::{AppError, AppResult};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

/// Estado de carga de un vehículo durante la asignación
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityEntry {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_name: Option<String>,
    pub vehicle_label: String,
    pub capacity: u32,
    pub assigned: u32,
    pub request_ids: Vec<Uuid>,
    /// Regiones ya cargadas, en orden de llegada
    pub regions: Vec<String>,
}

impl CapacityEntry {
    fn from_pair(pair: &DriverVehiclePair, capacity: u32) -> Self {
        Self {
            driver_id: pair.driver_id,
            vehicle_id: pair.vehicle_id,
            driver_name: pair.driver_name.clone(),
            vehicle_label: pair.vehicle_label(),
            capacity,
            assigned: 0,
            request_ids: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Asientos libres; nunca negativo
    pub fn available(&self) -> u32 {
        self.capacity - self.assigned
    }

    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    pub fn carries_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    /// Cargar desde el frente de la cola hasta `min(cola, libres)` solicitudes.
    /// Devuelve los ids cargados en orden.
    pub fn load_from(&mut self, queue: &mut VecDeque<Uuid>, region: &str) -> Vec<Uuid> {
        let take = queue.len().min(self.available() as usize);
        let loaded: Vec<Uuid> = queue.drain(..take).collect();

        if !loaded.is_empty() && !self.carries_region(region) {
            self.regions.push(region.to_string());
        }

        self.assigned += loaded.len() as u32;
        self.request_ids.extend(loaded.iter().copied());
        loaded
    }

    /// Nombre para logs
    pub fn display_name(&self) -> &str {
        self.driver_name.as_deref().unwrap_or("Unknown Driver")
    }
}

/// Pool de vehículos ordenado por capacidad descendente
#[derive(Debug, Clone)]
pub struct CapacityPool {
    entries: Vec<CapacityEntry>,
}

impl CapacityPool {
    /// Construir el pool desde los pares del evento. Sin pares o sin
    /// capacidad positiva es un error de configuración.
    pub fn from_pairs(pairs: &[DriverVehiclePair]) -> AppResult<Self> {
        if pairs.is_empty() {
            return Err(AppError::Configuration(
                "No drivers with vehicles assigned to this event".to_string(),
            ));
        }

        let mut entries: Vec<CapacityEntry> = pairs
            .iter()
            .filter_map(|pair| {
                u32::try_from(pair.capacity)
                    .ok()
                    .filter(|capacity| *capacity > 0)
                    .map(|capacity| CapacityEntry::from_pair(pair, capacity))
            })
            .collect();

        if entries.is_empty() {
            return Err(AppError::Configuration(
                "No drivers with available vehicles found: all vehicles have zero capacity".to_string(),
            ));
        }

        // sort_by es estable: empates conservan el orden de entrada
        entries.sort_by(|a, b| b.capacity.cmp(&a.capacity));

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CapacityEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [CapacityEntry] {
        &mut self.entries
    }

    pub fn vehicle_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_capacity(&self) -> u32 {
        self.entries.iter().map(|e| e.capacity).sum()
    }

    pub fn into_entries(self) -> Vec<CapacityEntry> {
        self.entries
    }
}
