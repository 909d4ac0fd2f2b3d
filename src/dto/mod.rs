pub mod addon_dto;
pub mod api_response;
pub mod auth_dto;
pub mod booking_dto;
pub mod fleetop_dto;
pub mod generator_dto;
pub mod pricing_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
