pub mod memory_store;
pub mod pg_transport_store;
pub mod transport_store;

pub use memory_store::{InMemoryTransportStore, SeedData};
pub use pg_transport_store::PgTransportStore;
pub use transport_store::TransportStore;
