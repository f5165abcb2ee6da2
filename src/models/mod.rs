//! Modelos del sistema
//! 
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! de transporte de eventos.

pub mod event;
pub mod event_driver;
pub mod route;
pub mod transport_request;

pub use event::EventInfo;
pub use event_driver::DriverVehiclePair;
pub use route::{NewTransportRoute, RouteStop, RouteWithDriver, TransportRoute};
pub use transport_request::{RequestAssignment, RequestFilter, TransportRequest, TransportStatus};
