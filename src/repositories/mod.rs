pub mod addon_repository;
pub mod booking_repository;
pub mod generator_repository;
pub mod user_repository;
pub mod vehicle_repository;
