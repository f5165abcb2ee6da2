//! Services module
//! 
//! Lógica de transporte: deduplicación, clasificación por región, pool de
//! capacidad, motor de asignación, construcción de rutas y envío por correo.

pub mod assignment_engine;
pub mod capacity_pool;
pub mod deduplicator;
pub mod notification_service;
pub mod region_classifier;
pub mod route_builder;

pub use assignment_engine::{assign, Assignment, AssignmentPlan, RegionalRequest, VehicleLoad};
pub use capacity_pool::{CapacityEntry, CapacityPool};
pub use notification_service::{HttpEmailNotifier, LogNotifier, RouteNotifier};
pub use route_builder::MapLinkBuilder;
