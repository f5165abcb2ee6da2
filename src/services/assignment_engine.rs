//! Motor de asignación por regiones
//!
//! Reparte solicitudes entre vehículos en dos fases:
//! 1. Distribución forzada: la región más grande va al vehículo más grande,
//!    la segunda al segundo, etc. Una región por vehículo.
//! 2. Relleno: cada vehículo con asientos libres toma primero lo que quede de
//!    regiones que ya lleva y después cualquier otra región pendiente.
//!
//! Lo que no cabe queda pendiente y se informa como déficit de capacidad.

use crate::services::capacity_pool::{CapacityEntry, CapacityPool};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Solicitud ya clasificada, entrada del motor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalRequest {
    pub request_id: Uuid,
    pub zip_code: String,
    pub region: String,
}

/// Asignación producida por el motor
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub request_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub region: String,
    /// Posición dentro de la carga del vehículo (1-based)
    pub sequence: i32,
}

/// Resumen de carga final por vehículo
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLoad {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_name: Option<String>,
    pub vehicle_label: String,
    pub capacity: u32,
    pub assigned: u32,
    pub available: u32,
    pub regions: Vec<String>,
    pub request_ids: Vec<Uuid>,
}

impl From<CapacityEntry> for VehicleLoad {
    fn from(entry: CapacityEntry) -> Self {
        Self {
            available: entry.available(),
            driver_id: entry.driver_id,
            vehicle_id: entry.vehicle_id,
            driver_name: entry.driver_name,
            vehicle_label: entry.vehicle_label,
            capacity: entry.capacity,
            assigned: entry.assigned,
            regions: entry.regions,
            request_ids: entry.request_ids,
        }
    }
}

/// Resultado de una corrida del motor
#[derive(Debug, Clone)]
pub struct AssignmentPlan {
    pub assignments: Vec<Assignment>,
    pub loads: Vec<VehicleLoad>,
    pub unassigned: Vec<Uuid>,
    pub total_capacity: u32,
}

impl AssignmentPlan {
    pub fn vehicles_used(&self) -> usize {
        self.loads.iter().filter(|load| load.assigned > 0).count()
    }
}

/// Grupo de solicitudes de una misma región
#[derive(Debug, Clone)]
struct RegionGroup {
    region: String,
    pending: VecDeque<Uuid>,
}

/// Agrupar por región. Las solicitudes se ordenan antes por código postal
/// (orden estable) para que los códigos cercanos queden juntos; los grupos
/// quedan por tamaño descendente y, en empate, por orden de descubrimiento.
fn group_by_region(mut requests: Vec<RegionalRequest>) -> Vec<RegionGroup> {
    requests.sort_by(|a, b| a.zip_code.cmp(&b.zip_code));

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RegionGroup> = Vec::new();

    for request in requests {
        match index.get(&request.region).copied() {
            Some(i) => groups[i].pending.push_back(request.request_id),
            None => {
                index.insert(request.region.clone(), groups.len());
                groups.push(RegionGroup {
                    region: request.region,
                    pending: VecDeque::from([request.request_id]),
                });
            }
        }
    }

    groups.sort_by(|a, b| b.pending.len().cmp(&a.pending.len()));
    groups
}

fn record(
    assignments: &mut Vec<Assignment>,
    entry: &CapacityEntry,
    loaded: &[Uuid],
    region: &str,
) {
    let first_sequence = entry.assigned as usize - loaded.len() + 1;
    for (offset, request_id) in loaded.iter().enumerate() {
        assignments.push(Assignment {
            request_id: *request_id,
            driver_id: entry.driver_id,
            vehicle_id: entry.vehicle_id,
            region: region.to_string(),
            sequence: (first_sequence + offset) as i32,
        });
    }
}

/// Ejecutar la asignación de dos fases sobre el pool
pub fn assign(requests: Vec<RegionalRequest>, mut pool: CapacityPool) -> AssignmentPlan {
    let mut groups = group_by_region(requests);
    let mut assignments = Vec::new();

    info!("📍 {} regiones encontradas", groups.len());
    for group in &groups {
        debug!("  - {}: {} personas", group.region, group.pending.len());
    }

    // Fase 1: una región por vehículo
    info!("🎯 Distribución forzada entre {} vehículos", pool.vehicle_count());
    for (entry, group) in pool.entries_mut().iter_mut().zip(groups.iter_mut()) {
        let loaded = entry.load_from(&mut group.pending, &group.region);
        record(&mut assignments, entry, &loaded, &group.region);

        info!(
            "🚗 {} ({}): {}/{} con región {}",
            entry.display_name(),
            entry.vehicle_label,
            entry.assigned,
            entry.capacity,
            group.region
        );
        if !group.pending.is_empty() {
            debug!(
                "📦 {} personas de {} quedan para relleno",
                group.pending.len(),
                group.region
            );
        }
    }
    groups.retain(|group| !group.pending.is_empty());

    // Fase 2: rellenar asientos libres, prefiriendo regiones ya cargadas
    if !groups.is_empty() {
        info!(
            "🔄 Distribuyendo {} personas restantes",
            groups.iter().map(|g| g.pending.len()).sum::<usize>()
        );
    }
    for entry in pool.entries_mut().iter_mut() {
        while !entry.is_full() && !groups.is_empty() {
            let position = groups
                .iter()
                .position(|group| entry.carries_region(&group.region))
                .unwrap_or(0);

            let group = &mut groups[position];
            let loaded = entry.load_from(&mut group.pending, &group.region);
            record(&mut assignments, entry, &loaded, &group.region);

            debug!(
                "📦 {} personas de {} a {} ({}/{})",
                loaded.len(),
                group.region,
                entry.display_name(),
                entry.assigned,
                entry.capacity
            );

            if group.pending.is_empty() {
                groups.remove(position);
            }
        }
    }

    let unassigned: Vec<Uuid> = groups
        .iter()
        .flat_map(|group| group.pending.iter().copied())
        .collect();

    if !unassigned.is_empty() {
        warn!(
            "⚠️ {} personas sin asignar: capacidad insuficiente",
            unassigned.len()
        );
        for group in &groups {
            warn!("   {}: {} sin asignar", group.region, group.pending.len());
        }
    }

    let total_capacity = pool.total_capacity();
    AssignmentPlan {
        assignments,
        loads: pool.into_entries().into_iter().map(VehicleLoad::from).collect(),
        unassigned,
        total_capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DriverVehiclePair;
    use crate::services::region_classifier::classify;
    use std::collections::HashSet;

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

    fn requests_at(addresses: &[&str]) -> Vec<RegionalRequest> {
        addresses
            .iter()
            .map(|address| {
                let classified = classify(address);
                RegionalRequest {
                    request_id: Uuid::new_v4(),
                    zip_code: classified.zip_code,
                    region: classified.region,
                }
            })
            .collect()
    }

    fn load_of<'a>(plan: &'a AssignmentPlan, name: &str) -> &'a VehicleLoad {
        plan.loads
            .iter()
            .find(|load| load.driver_name.as_deref() == Some(name))
            .unwrap()
    }

    #[test]
    fn test_same_metro_region_split_across_two_vehicles() {
        let requests = requests_at(&[
            "1 A St 80210",
            "2 B St 80210",
            "3 C St 80210",
            "4 D St 80210",
            "5 E St 80221",
            "6 F St 80221",
            "7 G St 80221",
        ]);
        let pool = CapacityPool::from_pairs(&[pair("four", 4), pair("five", 5)]).unwrap();

        let plan = assign(requests, pool);

        assert_eq!(plan.assignments.len(), 7);
        assert!(plan.unassigned.is_empty());
        assert_eq!(load_of(&plan, "five").assigned, 5);
        assert_eq!(load_of(&plan, "four").assigned, 2);
        assert!(plan.assignments.iter().all(|a| a.region == "Denver, CO"));
        assert_eq!(plan.vehicles_used(), 2);
        assert_eq!(plan.total_capacity, 9);
    }

    #[test]
    fn test_addresses_without_zip_share_sentinel_region() {
        let requests = requests_at(&["123 Main St", "456 Oak Ave", "789 Pine Rd"]);
        let pool = CapacityPool::from_pairs(&[pair("van", 8), pair("car", 4)]).unwrap();

        let plan = assign(requests, pool);

        assert_eq!(load_of(&plan, "van").assigned, 3);
        assert_eq!(load_of(&plan, "car").assigned, 0);
        assert!(plan.assignments.iter().all(|a| a.region == "99999"));
    }

    #[test]
    fn test_each_vehicle_gets_a_region_before_topping_up() {
        // Denver x4, New York x2, Washington x1; vehicles 6, 3, 3
        let requests = requests_at(&[
            "a 80210", "b 80211", "c 80212", "d 80213", "e 10001", "f 10002", "g 20001",
        ]);
        let pool =
            CapacityPool::from_pairs(&[pair("bus", 6), pair("van", 3), pair("car", 3)]).unwrap();

        let plan = assign(requests, pool);

        assert_eq!(load_of(&plan, "bus").regions, vec!["Denver, CO".to_string()]);
        assert_eq!(load_of(&plan, "van").regions, vec!["New York, NY".to_string()]);
        assert_eq!(load_of(&plan, "car").regions, vec!["Washington, DC".to_string()]);
        assert_eq!(plan.vehicles_used(), 3);
    }

    #[test]
    fn test_overflow_moves_to_next_vehicle_with_room() {
        // Denver x5 en un vehículo de 3: el sobrante pasa al siguiente vehículo con asientos
        let requests = requests_at(&[
            "a 80210", "b 80210", "c 80210", "d 80210", "e 80210", "f 10001", "g 73301",
        ]);
        let pool =
            CapacityPool::from_pairs(&[pair("first", 3), pair("second", 3), pair("third", 3)])
                .unwrap();

        let plan = assign(requests, pool);

        let first = load_of(&plan, "first");
        assert_eq!(first.regions, vec!["Denver, CO".to_string()]);
        assert_eq!(first.assigned, 3);

        // second recibió New York en fase 1 y luego el sobrante de Denver en fase 2
        let second = load_of(&plan, "second");
        assert_eq!(second.regions[0], "New York, NY");
        assert!(second.regions.contains(&"Denver, CO".to_string()));
        assert!(plan.unassigned.is_empty());
    }

    #[test]
    fn test_more_regions_than_vehicles_roll_into_overflow() {
        let requests = requests_at(&["a 80210", "b 80210", "c 10001", "d 20001", "e 90001"]);
        let pool = CapacityPool::from_pairs(&[pair("van", 4), pair("car", 2)]).unwrap();

        let plan = assign(requests, pool);

        assert_eq!(plan.assignments.len(), 5);
        assert!(plan.unassigned.is_empty());
        assert_eq!(load_of(&plan, "van").assigned, 4);
        assert_eq!(load_of(&plan, "car").assigned, 1);
    }

    #[test]
    fn test_shortfall_is_reported_not_failed() {
        let requests = requests_at(&["a 80210", "b 80210", "c 80210", "d 10001", "e 10001"]);
        let pool = CapacityPool::from_pairs(&[pair("car", 2), pair("bike", 1)]).unwrap();

        let plan = assign(requests, pool);

        assert_eq!(plan.assignments.len(), 3);
        assert_eq!(plan.unassigned.len(), 2);
        assert!(plan.loads.iter().all(|load| load.available == 0));
    }

    #[test]
    fn test_capacity_and_uniqueness_invariants() {
        let addresses: Vec<String> = (0..40)
            .map(|i| format!("{} Street {}", i, [80210, 10001, 20001, 90001, 73301][i % 5]))
            .collect();
        let refs: Vec<&str> = addresses.iter().map(String::as_str).collect();
        let requests = requests_at(&refs);
        let pool = CapacityPool::from_pairs(&[
            pair("a", 7),
            pair("b", 5),
            pair("c", 5),
            pair("d", 3),
            pair("e", 1),
        ])
        .unwrap();

        let plan = assign(requests, pool);

        for load in &plan.loads {
            assert!(load.assigned <= load.capacity);
            assert_eq!(load.assigned as usize, load.request_ids.len());
        }
        let unique: HashSet<Uuid> = plan.assignments.iter().map(|a| a.request_id).collect();
        assert_eq!(unique.len(), plan.assignments.len());
        assert_eq!(plan.assignments.len() + plan.unassigned.len(), 40);
        assert_eq!(plan.assignments.len(), 21);
    }

    #[test]
    fn test_sequences_follow_load_order_per_vehicle() {
        let requests = requests_at(&["a 80210", "b 80211", "c 10001"]);
        let pool = CapacityPool::from_pairs(&[pair("van", 5)]).unwrap();

        let plan = assign(requests, pool);

        let sequences: Vec<i32> = plan.assignments.iter().map(|a| a.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(
            plan.loads[0].request_ids,
            plan.assignments.iter().map(|a| a.request_id).collect::<Vec<_>>()
        );
    }
}
