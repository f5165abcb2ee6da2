pub mod api_response;
pub mod transport_dto;

pub use api_response::ApiResponse;
pub use transport_dto::*;
